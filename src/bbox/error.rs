// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while reducing the model field to a bounding-box subspace.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BboxError {
    #[error("could not find a time subspace enclosing the observational time range: {0}")]
    TimeSubspaceFailed(#[source] crate::field::error::FieldError),

    #[error(
        "neither the primary (joint 4-axis) nor the fallback (per-axis) bounding-box strategy \
could find a horizontal subspace enclosing the observational locations"
    )]
    HorizontalSubspaceFailed,

    #[error("{0}")]
    Field(#[from] crate::field::error::FieldError),
}
