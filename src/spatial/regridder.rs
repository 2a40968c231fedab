// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The [`LocstreamRegridder`] capability: structured-source-to-unstructured-
destination spatial interpolation.

A regridder takes a model subspace on a regular (lat, lon) grid, optionally
with an independent vertical coordinate, and produces one interpolated
value per destination location. Source and destination vertical coordinates
are identified independently (`src_z`/`dst_z`), since nothing requires the
model and the observational data to share a vertical coordinate identity —
only that both can be expressed on a common physical axis (pressure or
altitude) the caller has already resolved.
*/

use rayon::prelude::*;

use super::error::SpatialError;

/// How the horizontal interpolation kernel combines the four grid cells
/// surrounding a destination point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMethod {
    Linear,
    Nearest,
}

/// One destination location to interpolate the model field onto.
#[derive(Debug, Clone, Copy)]
pub struct Destination {
    pub latitude: f64,
    pub longitude: f64,
    /// The destination vertical coordinate value, in the same physical
    /// quantity (pressure or altitude) as the model's vertical coordinate,
    /// if the model has one.
    pub vertical: Option<f64>,
}

/// A regular horizontal grid plus an optional vertical coordinate, single
/// model time slice.
pub struct GridSlice<'a> {
    pub latitude: &'a [f64],
    pub longitude: &'a [f64],
    /// `values[iz][iy * nx + ix]`, one 2-D horizontal slab per vertical
    /// level. A field with no vertical coordinate has exactly one slab.
    pub values: &'a [Vec<f64>],
    /// The vertical coordinate value for each slab in `values`, or `None`
    /// for a field with no vertical axis.
    pub vertical: Option<&'a [f64]>,
}

/// Structured-source-to-unstructured-destination spatial interpolation.
pub trait LocstreamRegridder {
    /// Interpolates one model time slice onto `destinations`, returning one
    /// value per destination in the same order.
    fn regrid_slice(
        &self,
        slice: &GridSlice<'_>,
        destinations: &[Destination],
        ln_z: bool,
    ) -> Result<Vec<f64>, SpatialError>;
}

fn horizontal_bracket(axis: &[f64], value: f64) -> (usize, usize, f64) {
    let n = axis.len();
    if n == 1 {
        return (0, 0, 0.0);
    }
    let ascending = axis[0] <= axis[n - 1];
    let mut lo = 0usize;
    let mut hi = n - 1;
    if ascending {
        if value <= axis[0] {
            return (0, 0, 0.0);
        }
        if value >= axis[n - 1] {
            return (n - 1, n - 1, 0.0);
        }
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if axis[mid] <= value {
                lo = mid;
            } else {
                hi = mid;
            }
        }
    } else {
        if value >= axis[0] {
            return (0, 0, 0.0);
        }
        if value <= axis[n - 1] {
            return (n - 1, n - 1, 0.0);
        }
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if axis[mid] >= value {
                lo = mid;
            } else {
                hi = mid;
            }
        }
    }
    let span = axis[hi] - axis[lo];
    let frac = if span.abs() < f64::EPSILON {
        0.0
    } else {
        (value - axis[lo]) / span
    };
    (lo, hi, frac)
}

fn vertical_value_at(slab_index: usize, values: &[Vec<f64>], iy: usize, ix: usize, nx: usize) -> f64 {
    values[slab_index][iy * nx + ix]
}

/// A default regridder doing bilinear (or nearest-neighbour) horizontal
/// interpolation and linear (or log-pressure) vertical interpolation.
pub struct DefaultRegridder {
    pub method: InterpolationMethod,
}

impl DefaultRegridder {
    fn horizontal_value(&self, slice: &GridSlice<'_>, slab: usize, lat: f64, lon: f64) -> f64 {
        let nx = slice.longitude.len();
        let (iy0, iy1, fy) = horizontal_bracket(slice.latitude, lat);
        let (ix0, ix1, fx) = horizontal_bracket(slice.longitude, lon);

        match self.method {
            InterpolationMethod::Nearest => {
                let iy = if fy < 0.5 { iy0 } else { iy1 };
                let ix = if fx < 0.5 { ix0 } else { ix1 };
                vertical_value_at(slab, slice.values, iy, ix, nx)
            }
            InterpolationMethod::Linear => {
                let v00 = vertical_value_at(slab, slice.values, iy0, ix0, nx);
                let v01 = vertical_value_at(slab, slice.values, iy0, ix1, nx);
                let v10 = vertical_value_at(slab, slice.values, iy1, ix0, nx);
                let v11 = vertical_value_at(slab, slice.values, iy1, ix1, nx);
                let top = v00 * (1.0 - fx) + v01 * fx;
                let bottom = v10 * (1.0 - fx) + v11 * fx;
                top * (1.0 - fy) + bottom * fy
            }
        }
    }

    fn interpolate_one(&self, slice: &GridSlice<'_>, dest: &Destination, ln_z: bool) -> f64 {
        match (slice.vertical, dest.vertical) {
            (Some(z_axis), Some(dst_z)) if z_axis.len() > 1 => {
                let transformed: Vec<f64> = if ln_z {
                    z_axis.iter().map(|z| z.ln()).collect()
                } else {
                    z_axis.to_vec()
                };
                let dst_z_t = if ln_z { dst_z.ln() } else { dst_z };
                let (iz0, iz1, fz) = horizontal_bracket(&transformed, dst_z_t);
                let lo = self.horizontal_value(slice, iz0, dest.latitude, dest.longitude);
                let hi = self.horizontal_value(slice, iz1, dest.latitude, dest.longitude);
                lo * (1.0 - fz) + hi * fz
            }
            _ => self.horizontal_value(slice, 0, dest.latitude, dest.longitude),
        }
    }
}

impl LocstreamRegridder for DefaultRegridder {
    fn regrid_slice(
        &self,
        slice: &GridSlice<'_>,
        destinations: &[Destination],
        ln_z: bool,
    ) -> Result<Vec<f64>, SpatialError> {
        if slice.latitude.is_empty() || slice.longitude.is_empty() {
            return Err(SpatialError::MissingHorizontalCoordinates);
        }
        Ok(destinations
            .par_iter()
            .map(|dest| self.interpolate_one(slice, dest, ln_z))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid() -> (Vec<f64>, Vec<f64>, Vec<Vec<f64>>) {
        let lat = vec![0.0, 10.0];
        let lon = vec![0.0, 10.0];
        // values[0] is a single 2x2 slab, row-major (iy, ix).
        let values = vec![vec![0.0, 10.0, 20.0, 30.0]];
        (lat, lon, values)
    }

    #[test]
    fn linear_interpolation_at_grid_centre() {
        let (lat, lon, values) = flat_grid();
        let slice = GridSlice {
            latitude: &lat,
            longitude: &lon,
            values: &values,
            vertical: None,
        };
        let regridder = DefaultRegridder {
            method: InterpolationMethod::Linear,
        };
        let dest = [Destination {
            latitude: 5.0,
            longitude: 5.0,
            vertical: None,
        }];
        let out = regridder.regrid_slice(&slice, &dest, false).unwrap();
        assert!((out[0] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_interpolation_picks_closest_corner() {
        let (lat, lon, values) = flat_grid();
        let slice = GridSlice {
            latitude: &lat,
            longitude: &lon,
            values: &values,
            vertical: None,
        };
        let regridder = DefaultRegridder {
            method: InterpolationMethod::Nearest,
        };
        let dest = [Destination {
            latitude: 9.0,
            longitude: 9.0,
            vertical: None,
        }];
        let out = regridder.regrid_slice(&slice, &dest, false).unwrap();
        assert!((out[0] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn vertical_interpolation_is_linear_between_bracketing_levels() {
        let lat = vec![0.0];
        let lon = vec![0.0];
        let values = vec![vec![0.0], vec![100.0]];
        let vertical = vec![1000.0, 500.0];
        let slice = GridSlice {
            latitude: &lat,
            longitude: &lon,
            values: &values,
            vertical: Some(&vertical),
        };
        let regridder = DefaultRegridder {
            method: InterpolationMethod::Linear,
        };
        let dest = [Destination {
            latitude: 0.0,
            longitude: 0.0,
            vertical: Some(750.0),
        }];
        let out = regridder.regrid_slice(&slice, &dest, false).unwrap();
        assert!((out[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_grid_is_an_error() {
        let values: Vec<Vec<f64>> = vec![];
        let slice = GridSlice {
            latitude: &[],
            longitude: &[],
            values: &values,
            vertical: None,
        };
        let regridder = DefaultRegridder {
            method: InterpolationMethod::Linear,
        };
        assert!(regridder.regrid_slice(&slice, &[], false).is_err());
    }
}
