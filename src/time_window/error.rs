// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while validating that an observational time range is
enclosed by the model's.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncompatibleInputsError {
    #[error(
        "observational time range [{obs_start}, {obs_end}] is not enclosed by the model's time \
range [{model_start}, {model_end}] (all values in the observational field's time units)"
    )]
    TimeRangeNotEnclosed {
        model_start: f64,
        model_end: f64,
        obs_start: f64,
        obs_end: f64,
    },

    #[error("observational field has no time samples")]
    EmptyObservationalTime,
}
