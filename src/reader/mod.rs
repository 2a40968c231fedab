// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Abstract I/O collaborators: reading CF datasets in, and writing the
co-located result out.

Both are traits rather than a concrete NetCDF dependency, so the rest of
the engine — and its tests — never need a real dataset on disk. A real
backend (e.g. over `netcdf`/HDF5 bindings) is expected to be supplied by
the embedding application; `vision-colocate` only needs the shape of the
collaborator, matching the rest of this crate's "abstract I/O" external
interfaces.
*/

pub mod error;
pub mod json;

use crate::field::Field;
use error::DataReadingError;

/// Reads one or more fields matching a physical quantity out of a CF
/// dataset (a file path or other caller-defined source identifier).
pub trait CfDatasetReader {
    /// Reads every field in the source matching `standard_name`. More than
    /// one may come back if the source carries several candidates (e.g.
    /// the same quantity on two different grids); the pipeline's
    /// preprocessing plugin stage is responsible for reducing that list to
    /// one field.
    fn read_fields(&self, source: &str, standard_name: &str) -> Result<Vec<Field>, DataReadingError>;
}

/// Writes a finished co-location result out to a CF dataset.
pub trait CfDatasetWriter {
    fn write_field(&self, field: &Field, destination: &str) -> Result<(), DataReadingError>;
}

/// An in-memory reader/writer pair used by tests and by callers that
/// already have their fields constructed in memory (e.g. embedding
/// applications that parse their own inputs upstream of this crate).
#[derive(Default)]
pub struct InMemoryDataset {
    fields: std::collections::HashMap<(String, String), Vec<Field>>,
    pub written: std::cell::RefCell<Vec<(String, Field)>>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, standard_name: impl Into<String>, fields: Vec<Field>) {
        self.fields.insert((source.into(), standard_name.into()), fields);
    }
}

impl CfDatasetReader for InMemoryDataset {
    fn read_fields(&self, source: &str, standard_name: &str) -> Result<Vec<Field>, DataReadingError> {
        self.fields
            .get(&(source.to_string(), standard_name.to_string()))
            .cloned()
            .ok_or_else(|| DataReadingError::FieldNotFound {
                source: source.to_string(),
                standard_name: standard_name.to_string(),
            })
    }
}

impl CfDatasetWriter for InMemoryDataset {
    fn write_field(&self, field: &Field, destination: &str) -> Result<(), DataReadingError> {
        self.written
            .borrow_mut()
            .push((destination.to_string(), field.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn in_memory_dataset_round_trips_inserted_fields() {
        let mut dataset = InMemoryDataset::new();
        dataset.insert(
            "model.nc",
            "air_temperature",
            vec![Field::new("air_temperature", "K", ArrayD::zeros(IxDyn(&[2])))],
        );
        let fields = dataset.read_fields("model.nc", "air_temperature").unwrap();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn missing_field_is_a_data_reading_error() {
        let dataset = InMemoryDataset::new();
        assert!(dataset.read_fields("model.nc", "air_temperature").is_err());
    }

    #[test]
    fn write_field_records_destination_and_field() {
        let dataset = InMemoryDataset::new();
        let field = Field::new("air_temperature", "K", ArrayD::zeros(IxDyn(&[1])));
        dataset.write_field(&field, "out.nc").unwrap();
        assert_eq!(dataset.written.borrow().len(), 1);
    }
}
