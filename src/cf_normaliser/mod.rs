// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Locates each field's time coordinate, reconciles model/observational
calendars, and materialises parametric vertical coordinates.

Model time is always a dimension coordinate (model data is gridded);
observational time is always an auxiliary coordinate (observational data is
a discrete sampling geometry, one time value per sample). The two therefore
need separate lookups even though they answer the same question, which is
why [`locate_model_time`] and [`locate_obs_time`] are distinct functions
rather than one function branching on a field-kind flag.
*/

pub mod error;

use chrono::{Duration, NaiveDateTime};
use ndarray::ArrayD;

use crate::field::coordinate::{AuxiliaryCoordinate, Calendar, Units};
use crate::field::Field;
use error::CfComplianceError;

const TIME_IDENTIFIERS: &[&str] = &["time", "T"];

/// A time coordinate's values together with enough metadata to convert
/// them to a common basis, independent of whether the source was a
/// dimension or an auxiliary coordinate.
pub struct TimeCoordinate<'a> {
    pub data: &'a ArrayD<f64>,
    pub units: &'a Units,
    pub calendar: Calendar,
}

/// Locates the model field's time coordinate. Always a dimension
/// coordinate; absence or a non-unique match is a [`CfComplianceError`].
pub fn locate_model_time(model: &Field) -> Result<TimeCoordinate<'_>, CfComplianceError> {
    let coord = model
        .find_dimension_coordinate(TIME_IDENTIFIERS)
        .map_err(|_| CfComplianceError::TimeCoordinateNotFound("model"))?;
    Ok(TimeCoordinate {
        data: &coord.data,
        units: &coord.units,
        calendar: coord.calendar.unwrap_or(Calendar::Standard),
    })
}

/// Locates an observational field's time coordinate. Always an auxiliary
/// coordinate, since observational data is a discrete sampling geometry.
pub fn locate_obs_time(obs: &Field) -> Result<TimeCoordinate<'_>, CfComplianceError> {
    let coord = obs
        .find_auxiliary_coordinate(TIME_IDENTIFIERS)
        .map_err(|_| CfComplianceError::TimeCoordinateNotFound("observational"))?;
    Ok(TimeCoordinate {
        data: &coord.data,
        units: &coord.units,
        calendar: coord.calendar.unwrap_or(Calendar::Standard),
    })
}

/// The 1582-10-15 Gregorian cutoff: `standard` and `proleptic_gregorian`
/// calendars agree on or after this date.
fn gregorian_cutoff() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(1582, 10, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn to_datetime(units: &Units, value: f64) -> Option<NaiveDateTime> {
    let since = units.since?;
    let seconds = if units.raw.starts_with("hours") {
        value * 3600.0
    } else if units.raw.starts_with("minutes") {
        value * 60.0
    } else if units.raw.starts_with("days") {
        value * 86400.0
    } else {
        value
    };
    since.checked_add_signed(Duration::milliseconds((seconds * 1000.0) as i64))
}

fn from_datetime(units: &Units, dt: NaiveDateTime) -> Option<f64> {
    let since = units.since?;
    let seconds = (dt - since).num_milliseconds() as f64 / 1000.0;
    Some(if units.raw.starts_with("hours") {
        seconds / 3600.0
    } else if units.raw.starts_with("minutes") {
        seconds / 60.0
    } else if units.raw.starts_with("days") {
        seconds / 86400.0
    } else {
        seconds
    })
}

/// Converts a single time value from `from_units` into `to_units`.
///
/// Used to express an observational time bound in the model's own time
/// units for the bounding-box reducer, which narrows the model's time axis
/// against its own coordinate values (the bulk unit conversion in
/// [`reconcile_time`] goes the other way, onto the model's *values*, for
/// the time-window check and temporal weighting).
pub fn convert_time_value(from_units: &Units, value: f64, to_units: &Units) -> Option<f64> {
    to_datetime(from_units, value).and_then(|dt| from_datetime(to_units, dt))
}

/// Checks the model and observational calendars are reconcilable, and
/// returns the model's time values re-expressed as offsets in the
/// observational field's own units (model has fewer points, so conversion
/// is always applied on the model side).
pub fn reconcile_time(
    model_time: &TimeCoordinate<'_>,
    obs_time: &TimeCoordinate<'_>,
) -> Result<Vec<f64>, CfComplianceError> {
    if model_time.calendar != obs_time.calendar {
        let min_value = model_time.data.iter().cloned().fold(f64::INFINITY, f64::min);
        let on_or_after_cutoff = to_datetime(model_time.units, min_value)
            .map(|min_dt| min_dt >= gregorian_cutoff())
            .unwrap_or(false);
        let equivalent =
            model_time.calendar.reconcilable_with(obs_time.calendar) && on_or_after_cutoff;
        if !equivalent {
            return Err(CfComplianceError::IncompatibleCalendars {
                model: model_time.calendar,
                obs: obs_time.calendar,
            });
        }
    }

    if model_time.units == obs_time.units {
        return Ok(model_time.data.iter().cloned().collect());
    }

    let obs_since = obs_time
        .units
        .since
        .ok_or_else(|| CfComplianceError::TimeCoordinateNotFound("observational"))?;

    Ok(model_time
        .data
        .iter()
        .map(|&v| {
            to_datetime(model_time.units, v)
                .map(|dt| (dt - obs_since).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(f64::NAN)
        })
        .collect())
}

const HYBRID_HEIGHT: &str = "atmosphere_hybrid_height_coordinate";
const HYBRID_SIGMA_PRESSURE: &str = "atmosphere_hybrid_sigma_pressure_coordinate";

/// The constant reference surface pressure this engine applies the
/// hybrid-sigma-pressure formula against, since no separate surface-pressure
/// field (`ps` in the CF formula) is modelled: `p(k) = sigma(k) * p0`.
const STANDARD_SURFACE_PRESSURE_PA: f64 = 101_325.0;

/// Materialises a field's parametric vertical coordinate, if it has one,
/// returning a new field with the computed coordinate attached as an
/// auxiliary coordinate. Fields with no parametric vertical formula are
/// returned unchanged.
///
/// Supports exactly two formulae: `atmosphere_hybrid_height_coordinate` (→
/// altitude, requires an `orog` domain ancillary and `latitude`/`longitude`
/// dimension coordinates) and `atmosphere_hybrid_sigma_pressure_coordinate`
/// (→ air_pressure, scaled against a fixed reference surface pressure
/// since this engine does not model a per-gridpoint surface-pressure
/// field). An attached vertical coordinate under any other formula name is
/// a [`CfComplianceError`].
pub fn compute_parametric_vertical(field: &Field) -> Result<Field, CfComplianceError> {
    let formula = match field.dimension_coordinates().find(|c| {
        c.standard_name == HYBRID_HEIGHT || c.standard_name == HYBRID_SIGMA_PRESSURE
    }) {
        Some(c) => c.standard_name.clone(),
        None => return Ok(field.clone()),
    };

    let vertical = field
        .dimension_coordinate(&formula)
        .expect("just matched by standard_name");
    let axis = vertical.axis;

    let out = match formula.as_str() {
        HYBRID_HEIGHT => {
            let orog = field
                .domain_ancillary("orog")
                .ok_or_else(|| CfComplianceError::MissingParametricInput {
                    formula: formula.clone(),
                    ancillary: "orog".into(),
                })?;
            let lat_axis = field.dimension_coordinate("latitude").map(|c| c.axis);
            let lon_axis = field.dimension_coordinate("longitude").map(|c| c.axis);
            let (lat_axis, lon_axis) = match (lat_axis, lon_axis) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(CfComplianceError::MissingParametricInput {
                        formula: formula.clone(),
                        ancillary: "latitude/longitude".into(),
                    })
                }
            };

            let orog_2d = orog
                .data
                .clone()
                .into_dimensionality::<ndarray::Ix2>()
                .map_err(|_| CfComplianceError::MissingParametricInput {
                    formula: formula.clone(),
                    ancillary: "orog (expected a 2-D lat/lon field)".into(),
                })?;
            let (n_lat, n_lon) = orog_2d.dim();
            let n_levels = vertical.data.len();

            // Simplified hybrid-height formula `altitude(k,j,i) = a(k) +
            // orog(j,i)`, since this engine does not model a separate `b(k)`
            // coefficient array (the full CF formula is `a(k) +
            // b(k)*orog(j,i)`; here `b(k)` is implicitly 1 at every level).
            let mut altitude = ndarray::Array3::<f64>::zeros((n_levels, n_lat, n_lon));
            for k in 0..n_levels {
                let a_k = vertical.data[k];
                for j in 0..n_lat {
                    for i in 0..n_lon {
                        altitude[[k, j, i]] = a_k + orog_2d[[j, i]];
                    }
                }
            }

            AuxiliaryCoordinate {
                standard_name: "altitude".into(),
                units: Units::new("m"),
                calendar: None,
                axes: vec![axis, lat_axis, lon_axis],
                data: altitude.into_dyn(),
            }
        }
        HYBRID_SIGMA_PRESSURE => {
            // Simplified hybrid-sigma-pressure formula `p(k) = sigma(k) *
            // p0`, since this engine does not model a per-gridpoint surface
            // pressure field (the full CF formula is `ap(k) +
            // b(k)*ps(n,j,i)`; here `sigma(k)` plays the role of `b(k)`
            // against the fixed reference pressure `p0`).
            let pressure = vertical.data.mapv(|sigma| sigma * STANDARD_SURFACE_PRESSURE_PA);
            AuxiliaryCoordinate {
                standard_name: "air_pressure".into(),
                units: Units::new("Pa"),
                calendar: None,
                axes: vec![axis],
                data: pressure,
            }
        }
        other => {
            return Err(CfComplianceError::UnrecognisedParametricVertical(
                other.to_string(),
            ))
        }
    };

    Ok(field.clone().with_auxiliary_coordinate(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::coordinate::DimensionCoordinate;
    use ndarray::{arr1, IxDyn};

    fn model_field_with_time(calendar: Calendar) -> Field {
        let data = ArrayD::zeros(IxDyn(&[3]));
        let time = DimensionCoordinate {
            standard_name: "time".into(),
            units: Units::new("hours since 2000-01-01 00:00:00"),
            calendar: Some(calendar),
            axis: 0,
            data: arr1(&[0.0, 1.0, 2.0]).into_dyn(),
            bounds: None,
        };
        Field::new("air_temperature", "K", data).with_dimension_coordinate(time)
    }

    #[test]
    fn locate_model_time_finds_dimension_coordinate() {
        let model = model_field_with_time(Calendar::Standard);
        let t = locate_model_time(&model).unwrap();
        assert_eq!(t.data.len(), 3);
    }

    #[test]
    fn reconcile_time_accepts_identical_calendars() {
        let model = model_field_with_time(Calendar::Standard);
        let model_t = locate_model_time(&model).unwrap();
        let obs_t = TimeCoordinate {
            data: model_t.data,
            units: model_t.units,
            calendar: Calendar::Standard,
        };
        assert!(reconcile_time(&model_t, &obs_t).is_ok());
    }

    #[test]
    fn reconcile_time_accepts_standard_vs_proleptic_after_cutoff() {
        let model = model_field_with_time(Calendar::Standard);
        let model_t = locate_model_time(&model).unwrap();
        let obs_t = TimeCoordinate {
            data: model_t.data,
            units: model_t.units,
            calendar: Calendar::ProlepticGregorian,
        };
        assert!(reconcile_time(&model_t, &obs_t).is_ok());
    }

    #[test]
    fn reconcile_time_rejects_incompatible_calendars() {
        let model = model_field_with_time(Calendar::Day360);
        let model_t = locate_model_time(&model).unwrap();
        let obs_t = TimeCoordinate {
            data: model_t.data,
            units: model_t.units,
            calendar: Calendar::NoLeap,
        };
        assert!(reconcile_time(&model_t, &obs_t).is_err());
    }

    #[test]
    fn compute_parametric_vertical_passes_through_fields_without_one() {
        let field = model_field_with_time(Calendar::Standard);
        let out = compute_parametric_vertical(&field).unwrap();
        assert_eq!(out.auxiliary_coordinate_keys().len(), 0);
    }

    #[test]
    fn compute_parametric_vertical_materialises_hybrid_sigma_pressure() {
        let data = ArrayD::zeros(IxDyn(&[4]));
        let vertical = DimensionCoordinate {
            standard_name: HYBRID_SIGMA_PRESSURE.into(),
            units: Units::new("1"),
            calendar: None,
            axis: 0,
            data: arr1(&[0.1, 0.2, 0.3, 0.4]).into_dyn(),
            bounds: None,
        };
        let field = Field::new("air_temperature", "K", data).with_dimension_coordinate(vertical);
        let out = compute_parametric_vertical(&field).unwrap();
        let pressure = out.auxiliary_coordinate("air_pressure").unwrap();
        let values: Vec<f64> = pressure.data.iter().cloned().collect();
        assert_eq!(values, vec![10132.5, 20265.0, 30397.5, 40530.0]);
    }

    #[test]
    fn compute_parametric_vertical_requires_orog_for_hybrid_height() {
        let data = ArrayD::zeros(IxDyn(&[4]));
        let vertical = DimensionCoordinate {
            standard_name: HYBRID_HEIGHT.into(),
            units: Units::new("1"),
            calendar: None,
            axis: 0,
            data: arr1(&[0.1, 0.2, 0.3, 0.4]).into_dyn(),
            bounds: None,
        };
        let field = Field::new("air_temperature", "K", data).with_dimension_coordinate(vertical);
        assert!(compute_parametric_vertical(&field).is_err());
    }

    #[test]
    fn compute_parametric_vertical_broadcasts_hybrid_height_over_orog() {
        use crate::field::coordinate::DomainAncillary;
        use ndarray::Array2;

        let data = ArrayD::zeros(IxDyn(&[2, 2, 2]));
        let vertical = DimensionCoordinate {
            standard_name: HYBRID_HEIGHT.into(),
            units: Units::new("m"),
            calendar: None,
            axis: 0,
            data: arr1(&[100.0, 200.0]).into_dyn(),
            bounds: None,
        };
        let lat = DimensionCoordinate {
            standard_name: "latitude".into(),
            units: Units::new("degrees_north"),
            calendar: None,
            axis: 1,
            data: arr1(&[0.0, 10.0]).into_dyn(),
            bounds: None,
        };
        let lon = DimensionCoordinate {
            standard_name: "longitude".into(),
            units: Units::new("degrees_east"),
            calendar: None,
            axis: 2,
            data: arr1(&[0.0, 10.0]).into_dyn(),
            bounds: None,
        };
        let orog = DomainAncillary {
            standard_name: "orog".into(),
            units: Units::new("m"),
            axes: vec![1, 2],
            data: Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0])
                .unwrap()
                .into_dyn(),
        };
        let field = Field::new("air_temperature", "K", data)
            .with_dimension_coordinate(vertical)
            .with_dimension_coordinate(lat)
            .with_dimension_coordinate(lon)
            .with_domain_ancillary(orog);

        let out = compute_parametric_vertical(&field).unwrap();
        let altitude = out.auxiliary_coordinate("altitude").unwrap();
        assert_eq!(altitude.data.shape(), &[2, 2, 2]);
        assert_eq!(altitude.data[[0, 0, 0]], 101.0);
        assert_eq!(altitude.data[[0, 1, 1]], 104.0);
        assert_eq!(altitude.data[[1, 0, 1]], 202.0);
    }
}
