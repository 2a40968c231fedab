// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while spatially co-locating a model subspace onto
observational locations.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpatialError {
    #[error("model field has no latitude/longitude dimension coordinates to regrid from")]
    MissingHorizontalCoordinates,

    #[error("model and observational fields both carry a distinct vertical coordinate ('{model_z}' vs '{obs_z}') and no vertical-colocation-coord was configured to disambiguate")]
    AmbiguousVerticalCoordinate { model_z: String, obs_z: String },

    #[error(
        "the one-shot 3-D/4-D regrid failed ({reason}); the per-model-timestep fallback also \
failed: {fallback_reason}"
    )]
    RegridFailed {
        reason: String,
        fallback_reason: String,
    },

    #[error("observational locations and model subspace have incompatible sample counts: {obs_samples} observational samples vs {model_points} model points")]
    SampleCountMismatch {
        obs_samples: usize,
        model_points: usize,
    },

    #[error("{0}")]
    Field(#[from] crate::field::error::FieldError),
}
