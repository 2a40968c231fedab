// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
A concrete [`CfDatasetReader`]/[`CfDatasetWriter`] backend reading and
writing fields as JSON documents.

This is the backend the CLI binary wires up by default. A real deployment
reading genuine CF-NetCDF files is expected to supply its own
[`CfDatasetReader`]/[`CfDatasetWriter`] implementation over whatever
NetCDF/HDF5 bindings it already depends on; this crate does not carry a
NetCDF dependency itself, since the reader/writer traits are the engine's
only contract with storage and a plain, already-a-dependency JSON format
is enough to exercise and demonstrate the pipeline end-to-end.
*/

use std::fs;

use serde::{Deserialize, Serialize};

use crate::field::coordinate::{AuxiliaryCoordinate, Calendar, DimensionCoordinate, DomainAncillary, Units};
use crate::field::Field;

use super::error::DataReadingError;
use super::{CfDatasetReader, CfDatasetWriter};

#[derive(Debug, Serialize, Deserialize)]
struct CoordinateDocument {
    standard_name: String,
    units: String,
    calendar: Option<String>,
    axis: Option<usize>,
    axes: Vec<usize>,
    shape: Vec<usize>,
    data: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FieldDocument {
    standard_name: String,
    units: String,
    shape: Vec<usize>,
    data: Vec<f64>,
    history: Option<String>,
    #[serde(default)]
    dimension_coordinates: Vec<CoordinateDocument>,
    #[serde(default)]
    auxiliary_coordinates: Vec<CoordinateDocument>,
    #[serde(default)]
    domain_ancillaries: Vec<CoordinateDocument>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct DatasetDocument {
    fields: Vec<FieldDocument>,
}

fn to_array(shape: &[usize], data: Vec<f64>) -> ndarray::ArrayD<f64> {
    ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(shape), data)
        .expect("JSON document shape must match its data length")
}

impl From<&Field> for FieldDocument {
    fn from(field: &Field) -> Self {
        let data = field.persist();
        FieldDocument {
            standard_name: field.standard_name.clone(),
            units: field.units.raw.clone(),
            shape: field.shape().to_vec(),
            data: data.iter().cloned().collect(),
            history: field.history.clone(),
            dimension_coordinates: field
                .dimension_coordinates()
                .map(|c| CoordinateDocument {
                    standard_name: c.standard_name.clone(),
                    units: c.units.raw.clone(),
                    calendar: None,
                    axis: Some(c.axis),
                    axes: vec![c.axis],
                    shape: c.data.shape().to_vec(),
                    data: c.data.iter().cloned().collect(),
                })
                .collect(),
            auxiliary_coordinates: field
                .auxiliary_coordinates()
                .map(|c| CoordinateDocument {
                    standard_name: c.standard_name.clone(),
                    units: c.units.raw.clone(),
                    calendar: None,
                    axis: c.axes.first().copied(),
                    axes: c.axes.clone(),
                    shape: c.data.shape().to_vec(),
                    data: c.data.iter().cloned().collect(),
                })
                .collect(),
            domain_ancillaries: field
                .domain_ancillaries()
                .map(|a| CoordinateDocument {
                    standard_name: a.standard_name.clone(),
                    units: a.units.raw.clone(),
                    calendar: None,
                    axis: a.axes.first().copied(),
                    axes: a.axes.clone(),
                    shape: a.data.shape().to_vec(),
                    data: a.data.iter().cloned().collect(),
                })
                .collect(),
        }
    }
}

impl From<FieldDocument> for Field {
    fn from(doc: FieldDocument) -> Self {
        let mut field = Field::new(doc.standard_name, doc.units, to_array(&doc.shape, doc.data));
        field.history = doc.history;
        for c in doc.dimension_coordinates {
            field = field.with_dimension_coordinate(DimensionCoordinate {
                standard_name: c.standard_name,
                units: Units::new(c.units),
                calendar: c.calendar.as_deref().map(Calendar::parse),
                axis: c.axis.unwrap_or(0),
                data: to_array(&c.shape, c.data),
                bounds: None,
            });
        }
        for c in doc.auxiliary_coordinates {
            field = field.with_auxiliary_coordinate(AuxiliaryCoordinate {
                standard_name: c.standard_name,
                units: Units::new(c.units),
                calendar: c.calendar.as_deref().map(Calendar::parse),
                axes: c.axes,
                data: to_array(&c.shape, c.data),
            });
        }
        for c in doc.domain_ancillaries {
            field = field.with_domain_ancillary(DomainAncillary {
                standard_name: c.standard_name,
                units: Units::new(c.units),
                axes: c.axes,
                data: to_array(&c.shape, c.data),
            });
        }
        field
    }
}

/// Reads/writes fields as a `{"fields": [...]}` JSON document per source
/// path; `read_fields` filters that document's fields down to those
/// matching the requested `standard_name`.
pub struct JsonDataset;

impl CfDatasetReader for JsonDataset {
    fn read_fields(&self, source: &str, standard_name: &str) -> Result<Vec<Field>, DataReadingError> {
        let text = fs::read_to_string(source).map_err(|e| DataReadingError::IoFailure {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        let document: DatasetDocument =
            serde_json::from_str(&text).map_err(|e| DataReadingError::IoFailure {
                path: source.to_string(),
                reason: e.to_string(),
            })?;
        let fields: Vec<Field> = document
            .fields
            .into_iter()
            .filter(|f| f.standard_name == standard_name)
            .map(Field::from)
            .collect();
        if fields.is_empty() {
            return Err(DataReadingError::FieldNotFound {
                source: source.to_string(),
                standard_name: standard_name.to_string(),
            });
        }
        Ok(fields)
    }
}

impl CfDatasetWriter for JsonDataset {
    fn write_field(&self, field: &Field, destination: &str) -> Result<(), DataReadingError> {
        let document = DatasetDocument {
            fields: vec![FieldDocument::from(field)],
        };
        let text = serde_json::to_string_pretty(&document).map_err(|e| DataReadingError::WriteFailure {
            path: destination.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(destination, text).map_err(|e| DataReadingError::WriteFailure {
            path: destination.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, IxDyn};
    use tempdir::TempDir;

    #[test]
    fn write_then_read_round_trips_a_field() {
        let dir = TempDir::new("vision-colocate-json-test").unwrap();
        let path = dir.path().join("out.json");
        let path_str = path.to_str().unwrap();

        let data = ndarray::ArrayD::zeros(IxDyn(&[3]));
        let time = DimensionCoordinate {
            standard_name: "time".into(),
            units: Units::new("hours since 2000-01-01 00:00:00"),
            calendar: Some(Calendar::Standard),
            axis: 0,
            data: arr1(&[0.0, 1.0, 2.0]).into_dyn(),
            bounds: None,
        };
        let field = Field::new("air_temperature", "K", data).with_dimension_coordinate(time);

        let dataset = JsonDataset;
        dataset.write_field(&field, path_str).unwrap();
        let read_back = dataset.read_fields(path_str, "air_temperature").unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].shape(), &[3]);
    }

    #[test]
    fn reading_a_mismatched_standard_name_is_an_error() {
        let dir = TempDir::new("vision-colocate-json-test").unwrap();
        let path = dir.path().join("out.json");
        let path_str = path.to_str().unwrap();

        let field = Field::new("air_temperature", "K", ndarray::ArrayD::zeros(IxDyn(&[1])));
        let dataset = JsonDataset;
        dataset.write_field(&field, path_str).unwrap();
        assert!(dataset.read_fields(path_str, "air_pressure").is_err());
    }
}
