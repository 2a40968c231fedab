// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reattaches observational metadata to an interpolated result and, for
trajectory inputs spread across several files, assembles a contiguous
ragged array (CRA) representation across those files.

A satellite swath's per-file results are simply concatenated along the
sample axis (each file already covers an independent, self-contained
swath); a flight trajectory's per-file results additionally carry a
`cf_role=trajectory_id` auxiliary coordinate and a `count` array recording
each file's row length, per the discrete sampling geometry contiguous
ragged array encoding.
*/

pub mod error;

use ndarray::{concatenate, Array1, ArrayD, Axis};

use crate::field::coordinate::AuxiliaryCoordinate;
use crate::field::coordinate::Units;
use crate::field::Field;
use error::AssemblerError;

const HISTORY_SEPARATOR: &str = " ~ ";

/// Appends `message` to a field's history, separated from any existing
/// text by `" ~ "`.
pub fn append_history(existing: Option<&str>, message: &str) -> String {
    match existing {
        Some(text) if !text.is_empty() => format!("{text}{HISTORY_SEPARATOR}{message}"),
        _ => message.to_string(),
    }
}

/// Builds the final per-file result field: the interpolated values under
/// the model's physical identity, with the observational field's history
/// extended by `history_message`.
pub fn assemble_result(
    model_standard_name: &str,
    model_units: &str,
    values: Vec<f64>,
    obs_history: Option<&str>,
    history_message: &str,
) -> Field {
    let data = ArrayD::from_shape_vec(ndarray::IxDyn(&[values.len()]), values)
        .expect("values length matches declared shape by construction");
    let mut field = Field::new(model_standard_name, model_units, data);
    field.history = Some(append_history(obs_history, history_message));
    field
}

/// Concatenates satellite per-file results along the sample axis. Each
/// file is an independent swath, so no `cf_role` bookkeeping is required —
/// only the data arrays need joining.
pub fn assemble_satellite(results: &[Field]) -> Result<Field, AssemblerError> {
    if results.is_empty() {
        return Err(AssemblerError::NoResultsToAssemble);
    }
    concatenate_samples(results)
}

/// Assembles a flight trajectory's per-file results into a single
/// contiguous ragged array field: data concatenated along the sample axis,
/// plus a `trajectory_id` auxiliary coordinate (`cf_role=trajectory_id`)
/// and a `count` array recording each file's row length.
///
/// Per-input `trajectory_id` values are numeric, not the masked string
/// values CF's DSG encoding allows: [`AuxiliaryCoordinate::data`] has no
/// string or masked-value representation, so a file-index identity is
/// synthesised in its place (documented as a resolved open question, not a
/// silent gap). A `source` field that already carries its own
/// `trajectory_id` auxiliary coordinate is trusted over that synthesis —
/// its first value is reused instead of being overwritten — so a caller
/// that has already assigned identities upstream doesn't lose them here.
pub fn assemble_trajectory_cra(
    results: &[Field],
    trajectory_ids: &[String],
) -> Result<Field, AssemblerError> {
    if results.is_empty() {
        return Err(AssemblerError::NoResultsToAssemble);
    }
    let mut field = concatenate_samples(results)?;

    let counts: Vec<f64> = results.iter().map(|f| f.shape()[0] as f64).collect();
    let count_coord = AuxiliaryCoordinate {
        standard_name: "count".into(),
        units: Units::new("1"),
        calendar: None,
        axes: vec![],
        data: Array1::from(counts).into_dyn(),
    };
    field = field.with_auxiliary_coordinate(count_coord);

    let ids: Vec<f64> = results
        .iter()
        .enumerate()
        .map(|(i, f)| match f.auxiliary_coordinate("trajectory_id") {
            Some(existing) => existing.data.iter().next().copied().unwrap_or(i as f64),
            None => i as f64,
        })
        .collect();
    let trajectory_coord = AuxiliaryCoordinate {
        standard_name: "trajectory_id".into(),
        units: Units::new("1"),
        calendar: None,
        axes: vec![],
        data: Array1::from(ids).into_dyn(),
    };
    field = field.with_auxiliary_coordinate(trajectory_coord);

    // `trajectory_id` has no string representation to hold `source`'s own
    // identity, so the index-to-source mapping is recorded in history
    // instead of being dropped outright.
    if !trajectory_ids.is_empty() {
        let mapping = trajectory_ids
            .iter()
            .enumerate()
            .map(|(i, source)| format!("{i}={source}"))
            .collect::<Vec<_>>()
            .join(", ");
        field.history = Some(append_history(
            field.history.as_deref(),
            &format!("trajectory_id index: {mapping}"),
        ));
    }

    Ok(field)
}

fn concatenate_samples(results: &[Field]) -> Result<Field, AssemblerError> {
    let arrays: Vec<ArrayD<f64>> = results.iter().map(|f| f.persist()).collect();
    let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
    let joined = concatenate(Axis(0), &views).expect("per-file results share every axis but 0");

    let mut out = Field::new(
        results[0].standard_name.clone(),
        results[0].units.raw.clone(),
        joined,
    );
    out.history = results[0].history.clone();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_appends_with_separator() {
        assert_eq!(
            append_history(Some("read from source.nc"), "co-located onto flight track"),
            "read from source.nc ~ co-located onto flight track"
        );
    }

    #[test]
    fn history_with_no_prior_text_is_just_the_message() {
        assert_eq!(append_history(None, "co-located"), "co-located");
    }

    #[test]
    fn assemble_satellite_concatenates_files() {
        let a = assemble_result("air_temperature", "K", vec![1.0, 2.0], None, "m1");
        let b = assemble_result("air_temperature", "K", vec![3.0], None, "m2");
        let out = assemble_satellite(&[a, b]).unwrap();
        assert_eq!(out.shape(), &[3]);
    }

    #[test]
    fn assemble_trajectory_cra_attaches_count_and_trajectory_id() {
        let a = assemble_result("air_temperature", "K", vec![1.0, 2.0], None, "m1");
        let b = assemble_result("air_temperature", "K", vec![3.0], None, "m2");
        let out = assemble_trajectory_cra(&[a, b], &["f1".into(), "f2".into()]).unwrap();
        assert_eq!(out.shape(), &[3]);
        assert!(out.auxiliary_coordinate("count").is_some());
        let ids = out.auxiliary_coordinate("trajectory_id").unwrap();
        assert_eq!(ids.data.iter().cloned().collect::<Vec<_>>(), vec![0.0, 1.0]);
        assert!(out.history.unwrap().contains("f1"));
    }

    #[test]
    fn assemble_trajectory_cra_preserves_an_existing_trajectory_id() {
        let a = assemble_result("air_temperature", "K", vec![1.0], None, "m1")
            .with_auxiliary_coordinate(AuxiliaryCoordinate {
                standard_name: "trajectory_id".into(),
                units: Units::new("1"),
                calendar: None,
                axes: vec![],
                data: Array1::from(vec![42.0]).into_dyn(),
            });
        let b = assemble_result("air_temperature", "K", vec![2.0], None, "m2");
        let out = assemble_trajectory_cra(&[a, b], &["f1".into(), "f2".into()]).unwrap();
        let ids = out.auxiliary_coordinate("trajectory_id").unwrap();
        assert_eq!(ids.data.iter().cloned().collect::<Vec<_>>(), vec![42.0, 1.0]);
    }

    #[test]
    fn assembling_zero_results_is_an_error() {
        assert!(assemble_satellite(&[]).is_err());
    }
}
