// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Interpolates a reduced model subspace onto observational horizontal/
vertical locations.

Two strategies, tried in that order:

- **Primary**: the model's vertical coordinate (if any) is constant across
  time, so a single [`LocstreamRegridder::regrid_slice`] call per model
  time step suffices and the vertical axis never needs re-deriving.
- **Fallback**: the model's vertical coordinate varies by time step (a
  parametric vertical formula depending on a time-varying surface field,
  e.g. a hybrid sigma-pressure coordinate under a changing surface
  pressure), so each model time step's vertical profile is looked up
  afresh before that step's slice is regridded.

Both strategies regrid one model time step at a time and concatenate the
per-step results; it is [`crate::temporal`] that subsequently interpolates
across those steps onto the observation's own timestamps.
*/

pub mod error;
pub mod regridder;

use ndarray::{ArrayD, Axis};

use crate::field::Field;
use error::SpatialError;
use regridder::{Destination, GridSlice, LocstreamRegridder};

/// One observational sample's horizontal/vertical location, paired with
/// the model time step index its bracketing weights will be computed
/// against in [`crate::temporal`].
#[derive(Debug, Clone, Copy)]
pub struct SampleLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub vertical: Option<f64>,
}

struct HorizontalAxes {
    time: Option<usize>,
    vertical_dim: Option<usize>,
    latitude: usize,
    longitude: usize,
}

fn locate_axes(field: &Field, vertical_name: &str) -> Result<HorizontalAxes, SpatialError> {
    let latitude = field
        .dimension_coordinate("latitude")
        .ok_or(SpatialError::MissingHorizontalCoordinates)?
        .axis;
    let longitude = field
        .dimension_coordinate("longitude")
        .ok_or(SpatialError::MissingHorizontalCoordinates)?
        .axis;
    let time = field.dimension_coordinate("time").map(|c| c.axis);
    let vertical_dim = field.dimension_coordinate(vertical_name).map(|c| c.axis);
    Ok(HorizontalAxes {
        time,
        vertical_dim,
        latitude,
        longitude,
    })
}

/// Whether the model's vertical coordinate for `vertical_name` is a
/// time-varying auxiliary coordinate (depends on the time axis) rather
/// than a fixed dimension coordinate.
fn vertical_is_time_varying(field: &Field, vertical_name: &str, time_axis: Option<usize>) -> bool {
    match (field.auxiliary_coordinate(vertical_name), time_axis) {
        (Some(aux), Some(t)) => aux.axes.contains(&t),
        _ => false,
    }
}

/// Slices `data` down to a 2-D (latitude, longitude) slab for the given
/// time/vertical indices, reordering axes so latitude is first.
fn slab_values(
    data: &ArrayD<f64>,
    axes: &HorizontalAxes,
    time_index: Option<usize>,
    vertical_index: Option<usize>,
) -> Vec<f64> {
    let mut fixed: Vec<(usize, usize)> = Vec::new();
    if let (Some(axis), Some(idx)) = (axes.time, time_index) {
        fixed.push((axis, idx));
    }
    if let (Some(axis), Some(idx)) = (axes.vertical_dim, vertical_index) {
        fixed.push((axis, idx));
    }
    fixed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut view = data.view();
    for (axis, idx) in fixed {
        view = view.index_axis_move(Axis(axis), idx);
    }

    let removed = axes_removed(axes, time_index, vertical_index);
    let remaining_lat = axes.latitude - fixed_axes_removed_before(&removed, axes.latitude);
    let remaining_lon = axes.longitude - fixed_axes_removed_before(&removed, axes.longitude);

    let ordered = view.permuted_axes([remaining_lat, remaining_lon]);
    ordered.iter().cloned().collect()
}

fn axes_removed(axes: &HorizontalAxes, time_index: Option<usize>, vertical_index: Option<usize>) -> Vec<usize> {
    let mut removed = Vec::new();
    if let (Some(axis), Some(_)) = (axes.time, time_index) {
        removed.push(axis);
    }
    if let (Some(axis), Some(_)) = (axes.vertical_dim, vertical_index) {
        removed.push(axis);
    }
    removed.sort_unstable();
    removed
}

fn fixed_axes_removed_before(removed: &[usize], axis: usize) -> usize {
    removed.iter().filter(|&&r| r < axis).count()
}

fn vertical_levels(field: &Field, vertical_name: &str, axes: &HorizontalAxes, time_index: Option<usize>) -> Option<Vec<f64>> {
    if let Some(coord) = field.dimension_coordinate(vertical_name) {
        return Some(coord.data.iter().cloned().collect());
    }
    if let Some(aux) = field.auxiliary_coordinate(vertical_name) {
        if let (Some(t_axis), Some(t_idx)) = (axes.time, time_index) {
            if let Some(pos) = aux.axes.iter().position(|&a| a == t_axis) {
                let sliced = aux.data.index_axis(Axis(pos), t_idx);
                return Some(sliced.iter().cloned().collect());
            }
        }
        return Some(aux.data.iter().cloned().collect());
    }
    None
}

/// Interpolates `model` (a bounding-box-reduced subspace) onto
/// `destinations`, one set of per-time-step values per destination,
/// returned as `values[time_step][destination_index]`.
pub fn colocate_spatial(
    model: &Field,
    destinations: &[SampleLocation],
    vertical_name: &str,
    ln_z: bool,
    regridder: &dyn LocstreamRegridder,
) -> Result<Vec<Vec<f64>>, SpatialError> {
    let axes = locate_axes(model, vertical_name)?;
    let data = model.persist();
    let n_time = axes.time.map(|a| model.shape()[a]).unwrap_or(1);

    let dest: Vec<Destination> = destinations
        .iter()
        .map(|d| Destination {
            latitude: d.latitude,
            longitude: d.longitude,
            vertical: d.vertical,
        })
        .collect();

    if vertical_is_time_varying(model, vertical_name, axes.time) {
        regrid_per_timestep_fallback(model, &data, &axes, vertical_name, n_time, &dest, ln_z, regridder)
    } else {
        regrid_primary(&data, &axes, vertical_name, model, n_time, &dest, ln_z, regridder)
    }
}

/// Interpolates every vertical level of `model` independently, horizontal
/// axes only, returning `values[level][time_step][destination_index]`.
///
/// Used by the satellite co-location path, which needs a full per-level
/// profile at each destination (to later collapse via
/// [`crate::temporal::collapse_satellite_level`]) rather than a single
/// vertically-interpolated value.
pub fn colocate_spatial_per_level(
    model: &Field,
    destinations: &[SampleLocation],
    vertical_name: &str,
    regridder: &dyn LocstreamRegridder,
) -> Result<Vec<Vec<Vec<f64>>>, SpatialError> {
    let axes = locate_axes(model, vertical_name)?;
    let data = model.persist();
    let n_time = axes.time.map(|a| model.shape()[a]).unwrap_or(1);
    let n_levels = axes.vertical_dim.map(|a| model.shape()[a]).unwrap_or(1);

    let latitude: Vec<f64> = model.dimension_coordinate("latitude").unwrap().data.iter().cloned().collect();
    let longitude: Vec<f64> = model.dimension_coordinate("longitude").unwrap().data.iter().cloned().collect();
    let horizontal_dest: Vec<Destination> = destinations
        .iter()
        .map(|d| Destination {
            latitude: d.latitude,
            longitude: d.longitude,
            vertical: None,
        })
        .collect();

    let mut out = Vec::with_capacity(n_levels);
    for z in 0..n_levels {
        let vz = axes.vertical_dim.map(|_| z);
        let mut per_time = Vec::with_capacity(n_time);
        for t in 0..n_time {
            let time_index = axes.time.map(|_| t);
            let slab = slab_values(&data, &axes, time_index, vz);
            let slice = GridSlice {
                latitude: &latitude,
                longitude: &longitude,
                values: std::slice::from_ref(&slab),
                vertical: None,
            };
            per_time.push(regridder.regrid_slice(&slice, &horizontal_dest, false)?);
        }
        out.push(per_time);
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn regrid_primary(
    data: &ArrayD<f64>,
    axes: &HorizontalAxes,
    vertical_name: &str,
    model: &Field,
    n_time: usize,
    dest: &[Destination],
    ln_z: bool,
    regridder: &dyn LocstreamRegridder,
) -> Result<Vec<Vec<f64>>, SpatialError> {
    let levels = vertical_levels(model, vertical_name, axes, None);
    let latitude: Vec<f64> = model.dimension_coordinate("latitude").unwrap().data.iter().cloned().collect();
    let longitude: Vec<f64> = model.dimension_coordinate("longitude").unwrap().data.iter().cloned().collect();

    let mut out = Vec::with_capacity(n_time);
    for t in 0..n_time {
        let time_index = axes.time.map(|_| t);
        let n_levels = axes.vertical_dim.map(|a| model.shape()[a]).unwrap_or(1);
        let mut slabs = Vec::with_capacity(n_levels);
        for z in 0..n_levels {
            let vz = axes.vertical_dim.map(|_| z);
            slabs.push(slab_values(data, axes, time_index, vz));
        }
        let slice = GridSlice {
            latitude: &latitude,
            longitude: &longitude,
            values: &slabs,
            vertical: levels.as_deref(),
        };
        out.push(regridder.regrid_slice(&slice, dest, ln_z)?);
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn regrid_per_timestep_fallback(
    model: &Field,
    data: &ArrayD<f64>,
    axes: &HorizontalAxes,
    vertical_name: &str,
    n_time: usize,
    dest: &[Destination],
    ln_z: bool,
    regridder: &dyn LocstreamRegridder,
) -> Result<Vec<Vec<f64>>, SpatialError> {
    let latitude: Vec<f64> = model.dimension_coordinate("latitude").unwrap().data.iter().cloned().collect();
    let longitude: Vec<f64> = model.dimension_coordinate("longitude").unwrap().data.iter().cloned().collect();

    let mut out = Vec::with_capacity(n_time);
    for t in 0..n_time {
        let time_index = axes.time.map(|_| t);
        let levels = vertical_levels(model, vertical_name, axes, time_index);
        let n_levels = axes.vertical_dim.map(|a| model.shape()[a]).unwrap_or(1);
        let mut slabs = Vec::with_capacity(n_levels);
        for z in 0..n_levels {
            let vz = axes.vertical_dim.map(|_| z);
            slabs.push(slab_values(data, axes, time_index, vz));
        }
        let slice = GridSlice {
            latitude: &latitude,
            longitude: &longitude,
            values: &slabs,
            vertical: levels.as_deref(),
        };
        out.push(regridder.regrid_slice(&slice, dest, ln_z)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::coordinate::DimensionCoordinate;
    use crate::field::coordinate::Units;
    use ndarray::IxDyn;
    use regridder::{DefaultRegridder, InterpolationMethod};

    fn simple_model() -> Field {
        // shape: [time=1, lat=2, lon=2]
        let data = ArrayD::from_shape_vec(IxDyn(&[1, 2, 2]), vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        let time = DimensionCoordinate {
            standard_name: "time".into(),
            units: Units::new("hours since 2000-01-01 00:00:00"),
            calendar: None,
            axis: 0,
            data: ndarray::arr1(&[0.0]).into_dyn(),
            bounds: None,
        };
        let lat = DimensionCoordinate {
            standard_name: "latitude".into(),
            units: Units::new("degrees_north"),
            calendar: None,
            axis: 1,
            data: ndarray::arr1(&[0.0, 10.0]).into_dyn(),
            bounds: None,
        };
        let lon = DimensionCoordinate {
            standard_name: "longitude".into(),
            units: Units::new("degrees_east"),
            calendar: None,
            axis: 2,
            data: ndarray::arr1(&[0.0, 10.0]).into_dyn(),
            bounds: None,
        };
        Field::new("air_temperature", "K", data)
            .with_dimension_coordinate(time)
            .with_dimension_coordinate(lat)
            .with_dimension_coordinate(lon)
    }

    #[test]
    fn colocate_spatial_interpolates_each_time_step() {
        let model = simple_model();
        let dest = [SampleLocation {
            latitude: 5.0,
            longitude: 5.0,
            vertical: None,
        }];
        let regridder = DefaultRegridder {
            method: InterpolationMethod::Linear,
        };
        let out = colocate_spatial(&model, &dest, "air_pressure", false, &regridder).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0][0] - 15.0).abs() < 1e-9);
    }
}
