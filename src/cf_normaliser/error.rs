// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while normalising a field's CF metadata.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfComplianceError {
    #[error("could not identify a unique time coordinate on the {0} field")]
    TimeCoordinateNotFound(&'static str),

    #[error(
        "model calendar '{model:?}' and observational calendar '{obs:?}' cannot be reconciled: \
the standard/proleptic_gregorian cutoff rule only applies when the model's earliest time is \
on or after 1582-10-15"
    )]
    IncompatibleCalendars {
        model: crate::field::coordinate::Calendar,
        obs: crate::field::coordinate::Calendar,
    },

    #[error("field has a vertical coordinate with standard_name '{0}', which is not a recognised parametric vertical formula")]
    UnrecognisedParametricVertical(String),

    #[error("parametric vertical formula '{formula}' requires domain ancillary '{ancillary}', which is not attached to the field")]
    MissingParametricInput { formula: String, ancillary: String },

    #[error("{0}")]
    Field(#[from] crate::field::error::FieldError),
}
