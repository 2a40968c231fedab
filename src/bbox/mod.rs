// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reduces the model field to the smallest 4-D bounding-box subspace enclosing
an observational dataset's spatio-temporal extent, plus a halo margin.

Two strategies are tried in order:

- **Primary**: narrow every axis (time, then horizontal X/Y, then vertical
  if present) in one pass. If any axis yields an empty subspace the whole
  attempt is abandoned rather than partially applied.
- **Fallback**: narrow axes independently, tolerating a horizontal axis
  that cannot be usefully narrowed (near-full grid coverage, e.g. a cyclic
  longitude wraparound) by leaving that axis at full extent instead of
  failing outright. The fallback still requires the time axis to narrow
  successfully — a model with no overlapping time range is never a useful
  subspace no matter how the horizontal axes resolve.

The distinguishing signal for "near-full coverage" on a horizontal axis is
the count of grid cells strictly outside the observational bounds: fewer
than three such cells means the observational extent covers almost the
entire axis, so narrowing would save negligible work and risks clipping a
wraparound edge.
*/

pub mod error;

use error::BboxError;

use crate::field::query::Query;
use crate::field::Field;

const MIN_OUTSIDE_CELLS_TO_NARROW: usize = 3;

/// The observational spatio-temporal extent to enclose, all in the
/// model's own coordinate units (the caller is responsible for having run
/// [`crate::cf_normaliser::reconcile_time`] first).
#[derive(Debug, Clone, Copy)]
pub struct ObsBounds {
    pub time: (f64, f64),
    pub latitude: (f64, f64),
    pub longitude: (f64, f64),
    pub vertical: Option<(f64, f64)>,
}

fn axis_of(field: &Field, standard_name: &str) -> Option<usize> {
    field.dimension_coordinate(standard_name).map(|c| c.axis)
}

/// Narrows a single axis to enclose `(lo, hi)` plus `halo`, erroring if
/// nothing on the axis matches.
fn narrow_axis(field: &Field, axis: usize, lo: f64, hi: f64, halo: usize) -> Result<Field, BboxError> {
    let (start, end) = field.index_range_for_query(axis, Query::Within { lo, hi }, halo)?;
    Ok(field.subspace_axis_range(axis, start, end)?)
}

/// Narrows a horizontal axis, falling back to the full axis extent when
/// the observational bounds cover nearly all of it.
fn narrow_horizontal_axis(
    field: &Field,
    axis: usize,
    lo: f64,
    hi: f64,
    halo: usize,
) -> Result<Field, BboxError> {
    let outside = Query::Outside { lo, hi }.count_matches(
        &field
            .dimension_coordinates()
            .find(|c| c.axis == axis)
            .map(|c| c.data.clone())
            .unwrap_or_default(),
    );
    if outside < MIN_OUTSIDE_CELLS_TO_NARROW {
        return Ok(field.clone());
    }
    narrow_axis(field, axis, lo, hi, halo)
}

/// Reduces `model` to the smallest subspace enclosing `obs`, with `halo`
/// extra cells of margin on each narrowed axis. `vertical_name` is the
/// configured vertical co-location identity (e.g. `air_pressure` or
/// `altitude`) used to find the vertical axis, if any.
pub fn reduce(
    model: &Field,
    obs: &ObsBounds,
    halo: usize,
    vertical_name: &str,
) -> Result<Field, BboxError> {
    match reduce_primary(model, obs, halo, vertical_name) {
        Ok(field) => Ok(field),
        Err(_) => reduce_fallback(model, obs, halo, vertical_name),
    }
}

fn reduce_primary(
    model: &Field,
    obs: &ObsBounds,
    halo: usize,
    vertical_name: &str,
) -> Result<Field, BboxError> {
    let mut field = narrow_time(model, obs, halo)?;

    let lat_axis = axis_of(&field, "latitude");
    let lon_axis = axis_of(&field, "longitude");
    if let (Some(lat_axis), Some(lon_axis)) = (lat_axis, lon_axis) {
        field = narrow_axis(&field, lat_axis, obs.latitude.0, obs.latitude.1, halo)?;
        let lon_axis = axis_of(&field, "longitude").unwrap_or(lon_axis);
        field = narrow_axis(&field, lon_axis, obs.longitude.0, obs.longitude.1, halo)?;
    } else {
        return Err(BboxError::HorizontalSubspaceFailed);
    }

    if let (Some((lo, hi)), Some(axis)) = (obs.vertical, axis_of(&field, vertical_name)) {
        field = narrow_axis(&field, axis, lo, hi, halo)?;
    }

    Ok(field)
}

fn reduce_fallback(
    model: &Field,
    obs: &ObsBounds,
    halo: usize,
    vertical_name: &str,
) -> Result<Field, BboxError> {
    let mut field = narrow_time(model, obs, halo)?;

    let lat_axis = axis_of(&field, "latitude");
    let lon_axis = axis_of(&field, "longitude");
    match (lat_axis, lon_axis) {
        (Some(lat_axis), Some(lon_axis)) => {
            field = narrow_horizontal_axis(&field, lat_axis, obs.latitude.0, obs.latitude.1, halo)?;
            let lon_axis = axis_of(&field, "longitude").unwrap_or(lon_axis);
            field =
                narrow_horizontal_axis(&field, lon_axis, obs.longitude.0, obs.longitude.1, halo)?;
        }
        _ => return Err(BboxError::HorizontalSubspaceFailed),
    }

    if let (Some((lo, hi)), Some(axis)) = (obs.vertical, axis_of(&field, vertical_name)) {
        if let Ok(narrowed) = narrow_axis(&field, axis, lo, hi, halo) {
            field = narrowed;
        }
    }

    Ok(field)
}

fn narrow_time(model: &Field, obs: &ObsBounds, halo: usize) -> Result<Field, BboxError> {
    let axis = axis_of(model, "time").ok_or_else(|| {
        BboxError::TimeSubspaceFailed(crate::field::error::FieldError::CoordinateNotFound(
            "time".into(),
        ))
    })?;
    narrow_axis(model, axis, obs.time.0, obs.time.1, halo)
        .map_err(|e| match e {
            BboxError::Field(inner) => BboxError::TimeSubspaceFailed(inner),
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::coordinate::{Calendar, DimensionCoordinate};
    use crate::field::coordinate::Units;
    use ndarray::{arr1, IxDyn};

    fn grid_field() -> Field {
        let data = ArrayD::zeros(IxDyn(&[4, 3, 5]));
        let time = DimensionCoordinate {
            standard_name: "time".into(),
            units: Units::new("hours since 2000-01-01 00:00:00"),
            calendar: Some(Calendar::Standard),
            axis: 0,
            data: arr1(&[0.0, 1.0, 2.0, 3.0]).into_dyn(),
            bounds: None,
        };
        let lat = DimensionCoordinate {
            standard_name: "latitude".into(),
            units: Units::new("degrees_north"),
            calendar: None,
            axis: 1,
            data: arr1(&[-10.0, 0.0, 10.0]).into_dyn(),
            bounds: None,
        };
        let lon = DimensionCoordinate {
            standard_name: "longitude".into(),
            units: Units::new("degrees_east"),
            calendar: None,
            axis: 2,
            data: arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]).into_dyn(),
            bounds: None,
        };
        Field::new("air_temperature", "K", data)
            .with_dimension_coordinate(time)
            .with_dimension_coordinate(lat)
            .with_dimension_coordinate(lon)
    }

    use ndarray::ArrayD;

    #[test]
    fn primary_strategy_narrows_every_axis() {
        let model = grid_field();
        let obs = ObsBounds {
            time: (1.0, 2.0),
            latitude: (-1.0, 1.0),
            longitude: (1.0, 2.0),
            vertical: None,
        };
        let result = reduce(&model, &obs, 0, "air_pressure").unwrap();
        assert_eq!(result.shape(), &[2, 1, 2]);
    }

    #[test]
    fn fallback_keeps_full_axis_when_coverage_is_near_complete() {
        let model = grid_field();
        let obs = ObsBounds {
            time: (0.0, 3.0),
            latitude: (-10.0, 10.0),
            longitude: (0.0, 4.0),
            vertical: None,
        };
        let result = reduce_fallback(&model, &obs, 0, "air_pressure").unwrap();
        assert_eq!(result.shape()[1], 3);
        assert_eq!(result.shape()[2], 5);
    }

    #[test]
    fn missing_time_coordinate_is_fatal() {
        let data = ArrayD::zeros(IxDyn(&[3]));
        let model = Field::new("air_temperature", "K", data);
        let obs = ObsBounds {
            time: (0.0, 1.0),
            latitude: (0.0, 1.0),
            longitude: (0.0, 1.0),
            vertical: None,
        };
        assert!(reduce(&model, &obs, 0, "air_pressure").is_err());
    }
}
