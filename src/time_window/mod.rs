// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Checks that an observational time range falls entirely within the model's.

Endpoints are taken from the first and last elements of each (already
reconciled, common-unit) time array, not a full scan: both arrays are
assumed monotonically increasing, a documented assumption this crate
inherits rather than re-verifies on every call.
*/

pub mod error;

use error::IncompatibleInputsError;

/// Validates that `obs_time` (already expressed in the model's reconciled
/// time basis) lies entirely within `model_time`.
pub fn validate(model_time: &[f64], obs_time: &[f64]) -> Result<(), IncompatibleInputsError> {
    let (obs_start, obs_end) = match (obs_time.first(), obs_time.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => return Err(IncompatibleInputsError::EmptyObservationalTime),
    };
    let (model_start, model_end) = match (model_time.first(), model_time.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => {
            return Err(IncompatibleInputsError::TimeRangeNotEnclosed {
                model_start: f64::NAN,
                model_end: f64::NAN,
                obs_start,
                obs_end,
            })
        }
    };
    let (lo, hi) = (model_start.min(model_end), model_start.max(model_end));
    let (obs_lo, obs_hi) = (obs_start.min(obs_end), obs_start.max(obs_end));

    if obs_lo < lo || obs_hi > hi {
        return Err(IncompatibleInputsError::TimeRangeNotEnclosed {
            model_start,
            model_end,
            obs_start,
            obs_end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosed_range_passes() {
        assert!(validate(&[0.0, 1.0, 2.0, 3.0], &[0.5, 1.5, 2.5]).is_ok());
    }

    #[test]
    fn range_extending_past_model_end_fails() {
        assert!(validate(&[0.0, 1.0, 2.0], &[0.5, 3.5]).is_err());
    }

    #[test]
    fn range_starting_before_model_start_fails() {
        assert!(validate(&[1.0, 2.0, 3.0], &[0.0, 1.5]).is_err());
    }

    #[test]
    fn empty_observational_time_fails() {
        assert!(validate(&[0.0, 1.0], &[]).is_err());
    }
}
