// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while temporally co-locating spatially interpolated model
values onto observational timestamps.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemporalError {
    #[error("observational timestamp {obs_time} falls outside the model time range [{model_start}, {model_end}] by more than the halo tolerance")]
    NoBracketingSegment {
        obs_time: f64,
        model_start: f64,
        model_end: f64,
    },

    #[error("model field has fewer than two time steps; temporal interpolation requires a bracketing pair")]
    InsufficientModelTimeSteps,

    #[error("model time steps {0} and {1} are identical; cannot form a non-degenerate segment")]
    ZeroWidthSegment(f64, f64),
}
