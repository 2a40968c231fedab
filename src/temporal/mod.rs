// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Linearly interpolates, along time, the per-model-time-step spatial
co-location results onto each observation's own timestamp.

For an observational timestamp falling between model time steps `t0` and
`t1`, with `d0 = obs_time - t0` and `delta = t1 - t0`, the bracketing
segment's weights are

```text
w0 = (delta - d0) / delta
w1 = d0 / delta
```

so that the result is `w0 * value[t0] + w1 * value[t1]`, which sums to 1
and degenerates correctly to `value[t0]` as `obs_time -> t0`. A timestamp
that falls just outside `[model_times[0], model_times[-1]]` — within the
bounding-box reducer's halo margin rather than genuinely unenclosed, which
[`crate::time_window`] has already ruled out for the observation as a
whole — is tolerated by clamping to the nearest real segment rather than
erroring.
*/

pub mod error;

use error::TemporalError;

/// The bracketing model-time segment and interpolation weights for one
/// observational timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub t0_index: usize,
    pub t1_index: usize,
    pub w0: f64,
    pub w1: f64,
}

fn find_segment(model_times: &[f64], obs_time: f64) -> Result<Segment, TemporalError> {
    let n = model_times.len();
    if n < 2 {
        return Err(TemporalError::InsufficientModelTimeSteps);
    }
    let model_start = model_times[0];
    let model_end = model_times[n - 1];

    // Halo-segment tolerance: an observational timestamp outside the
    // model's own range (but inside the bounding-box halo) clamps to the
    // nearest endpoint segment instead of failing.
    if obs_time <= model_start {
        return segment_between(model_times, 0, 1);
    }
    if obs_time >= model_end {
        return segment_between(model_times, n - 2, n - 1);
    }

    let mut hi = 1;
    while model_times[hi] < obs_time {
        hi += 1;
    }
    let lo = hi - 1;

    let t0 = model_times[lo];
    let t1 = model_times[hi];
    let delta = t1 - t0;
    if delta.abs() < f64::EPSILON {
        return Err(TemporalError::ZeroWidthSegment(t0, t1));
    }
    let d0 = obs_time - t0;
    let w0 = (delta - d0) / delta;
    let w1 = d0 / delta;
    Ok(Segment {
        t0_index: lo,
        t1_index: hi,
        w0,
        w1,
    })
}

fn segment_between(model_times: &[f64], lo: usize, hi: usize) -> Result<Segment, TemporalError> {
    let t0 = model_times[lo];
    let t1 = model_times[hi];
    let delta = t1 - t0;
    if delta.abs() < f64::EPSILON {
        return Err(TemporalError::ZeroWidthSegment(t0, t1));
    }
    // Clamp weights to the endpoint rather than extrapolating.
    Ok(Segment {
        t0_index: lo,
        t1_index: hi,
        w0: 1.0,
        w1: 0.0,
    })
}

/// Interpolates `spatial_values[time_step][sample]` along time onto each
/// entry of `obs_times`, returning one value per observational sample.
pub fn colocate_temporal(
    model_times: &[f64],
    spatial_values: &[Vec<f64>],
    obs_times: &[f64],
) -> Result<Vec<f64>, TemporalError> {
    let mut out = Vec::with_capacity(obs_times.len());
    for (i, &obs_time) in obs_times.iter().enumerate() {
        let segment = find_segment(model_times, obs_time)?;
        let v0 = spatial_values[segment.t0_index][i];
        let v1 = spatial_values[segment.t1_index][i];
        out.push(segment.w0 * v0 + segment.w1 * v1);
    }
    Ok(out)
}

/// Collapses a satellite observational result's pressure-level axis down
/// to a single configured level index.
///
/// This mirrors a hard-coded special case in the system this crate is
/// modelled on, which always took the eleventh pressure level
/// (zero-indexed 10) of a satellite retrieval's concatenated, time-weighted
/// result. `level_index` defaults to that same value but is configurable
/// rather than fixed, since whether this is a genuine physical convention
/// or an implementation shortcut could not be established from the
/// available source.
pub fn collapse_satellite_level(values_by_level: &[Vec<f64>], level_index: usize) -> Vec<f64> {
    values_by_level
        .get(level_index)
        .cloned()
        .unwrap_or_else(|| values_by_level.last().cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn weights_sum_to_one() {
        let segment = find_segment(&[0.0, 1.0, 2.0], 0.3).unwrap();
        assert!(approx_eq!(f64, segment.w0 + segment.w1, 1.0, epsilon = 1e-10));
    }

    #[test]
    fn weights_degenerate_to_first_endpoint() {
        let segment = find_segment(&[0.0, 1.0], 0.0).unwrap();
        assert!(approx_eq!(f64, segment.w0, 1.0, epsilon = 1e-10));
        assert!(approx_eq!(f64, segment.w1, 0.0, epsilon = 1e-10));
    }

    #[test]
    fn halo_timestamp_before_model_start_clamps() {
        let segment = find_segment(&[1.0, 2.0, 3.0], 0.5).unwrap();
        assert_eq!((segment.t0_index, segment.t1_index), (0, 1));
        assert!(approx_eq!(f64, segment.w0, 1.0, epsilon = 1e-10));
    }

    #[test]
    fn halo_timestamp_after_model_end_clamps() {
        let segment = find_segment(&[1.0, 2.0, 3.0], 3.5).unwrap();
        assert_eq!((segment.t0_index, segment.t1_index), (1, 2));
        assert!(approx_eq!(f64, segment.w1, 0.0, epsilon = 1e-10));
    }

    #[test]
    fn colocate_temporal_interpolates_linearly() {
        let model_times = [0.0, 1.0];
        let spatial = vec![vec![0.0, 100.0], vec![10.0, 200.0]];
        let obs = [0.25, 0.75];
        let out = colocate_temporal(&model_times, &spatial, &obs).unwrap();
        assert!(approx_eq!(f64, out[0], 2.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, out[1], 175.0, epsilon = 1e-9));
    }

    #[test]
    fn collapse_satellite_level_takes_configured_index() {
        let levels: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64]).collect();
        assert_eq!(collapse_satellite_level(&levels, 10), vec![10.0]);
    }
}
