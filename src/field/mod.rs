// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The in-memory field representation shared by model and observational data.

A [`Field`] carries its data array, its `standard_name`/`units`, and three
typed construct tables (dimension coordinates, auxiliary coordinates,
domain ancillaries) each keyed by `standard_name`, rather than modelling
those constructs as a class hierarchy. This mirrors the "capability trait
over inheritance" guidance this crate is built to: a function that needs
"the time coordinate, whatever form it takes" asks the relevant table for
it by name, instead of downcasting through a type hierarchy.
*/

pub mod coordinate;
pub mod error;
pub mod query;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ndarray::ArrayD;

use coordinate::{AuxiliaryCoordinate, Calendar, DimensionCoordinate, DomainAncillary, Units};
use error::FieldError;
use query::Query;

/// The backing store for a field's primary data array.
///
/// Arrays are read lazily from their source dataset and only materialised
/// (`persist`-ed) when a stage actually needs the values, matching the
/// lazy-array discipline described for this engine: a bounding-box
/// reduction narrows the *indices* to read before any bytes are pulled off
/// disk, and only the reduced subspace is ever persisted.
enum Storage {
    Lazy(Rc<dyn Fn() -> ArrayD<f64>>),
    Persisted(ArrayD<f64>),
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Storage::Lazy(_) => write!(f, "Storage::Lazy(..)"),
            Storage::Persisted(a) => write!(f, "Storage::Persisted(shape={:?})", a.shape()),
        }
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        match self {
            Storage::Lazy(f) => Storage::Lazy(Rc::clone(f)),
            Storage::Persisted(a) => Storage::Persisted(a.clone()),
        }
    }
}

/// A physical quantity defined over zero or more axes, with an attached
/// table of coordinates and domain ancillaries.
///
/// `Field` is the one type both the model input and every observational
/// input are represented as; whether a particular field plays the "model"
/// or "observational" role in a given run is a property of how the
/// [`crate::driver::Driver`] uses it, not of the type itself.
#[derive(Debug, Clone)]
pub struct Field {
    pub standard_name: String,
    pub units: Units,
    data: RefCell<Storage>,
    shape: Vec<usize>,
    dimension_coordinates: HashMap<String, DimensionCoordinate>,
    auxiliary_coordinates: HashMap<String, AuxiliaryCoordinate>,
    domain_ancillaries: HashMap<String, DomainAncillary>,
    pub history: Option<String>,
}

impl Field {
    /// Builds a field from an already-materialised data array.
    pub fn new(standard_name: impl Into<String>, units: impl Into<String>, data: ArrayD<f64>) -> Self {
        let shape = data.shape().to_vec();
        Self {
            standard_name: standard_name.into(),
            units: Units::new(units),
            data: RefCell::new(Storage::Persisted(data)),
            shape,
            dimension_coordinates: HashMap::new(),
            auxiliary_coordinates: HashMap::new(),
            domain_ancillaries: HashMap::new(),
            history: None,
        }
    }

    /// Builds a field whose data is read on first use via `loader`, which
    /// is expected to perform the I/O (the slicing/subspacing a caller
    /// wants is applied to the result, not pushed into `loader`).
    pub fn new_lazy(
        standard_name: impl Into<String>,
        units: impl Into<String>,
        shape: Vec<usize>,
        loader: impl Fn() -> ArrayD<f64> + 'static,
    ) -> Self {
        Self {
            standard_name: standard_name.into(),
            units: Units::new(units),
            data: RefCell::new(Storage::Lazy(Rc::new(loader))),
            shape,
            dimension_coordinates: HashMap::new(),
            auxiliary_coordinates: HashMap::new(),
            domain_ancillaries: HashMap::new(),
            history: None,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn with_dimension_coordinate(mut self, coord: DimensionCoordinate) -> Self {
        self.dimension_coordinates
            .insert(coord.standard_name.clone(), coord);
        self
    }

    pub fn with_auxiliary_coordinate(mut self, coord: AuxiliaryCoordinate) -> Self {
        self.auxiliary_coordinates
            .insert(coord.standard_name.clone(), coord);
        self
    }

    pub fn with_domain_ancillary(mut self, anc: DomainAncillary) -> Self {
        self.domain_ancillaries.insert(anc.standard_name.clone(), anc);
        self
    }

    /// Forces and caches the data array, returning a clone of the
    /// materialised values. Subsequent calls reuse the cached array.
    pub fn persist(&self) -> ArrayD<f64> {
        let mut storage = self.data.borrow_mut();
        let persisted = match &*storage {
            Storage::Persisted(a) => return a.clone(),
            Storage::Lazy(loader) => loader(),
        };
        *storage = Storage::Persisted(persisted.clone());
        persisted
    }

    /// Persists this field's own data plus every attached coordinate and
    /// domain ancillary that is itself lazily backed. Dimension/auxiliary
    /// coordinates in this crate are always already materialised (they
    /// come from small index arrays read up front), so this only needs to
    /// force the primary data array; it exists as a named operation to
    /// mirror the explicit cache-boundary call the pipeline makes before
    /// handing a subspaced field to a stage that reads every element.
    pub fn persist_all_metadata(&self) {
        let _ = self.persist();
    }

    pub fn dimension_coordinate(&self, standard_name: &str) -> Option<&DimensionCoordinate> {
        self.dimension_coordinates.get(standard_name)
    }

    pub fn auxiliary_coordinate(&self, standard_name: &str) -> Option<&AuxiliaryCoordinate> {
        self.auxiliary_coordinates.get(standard_name)
    }

    pub fn domain_ancillary(&self, standard_name: &str) -> Option<&DomainAncillary> {
        self.domain_ancillaries.get(standard_name)
    }

    pub fn dimension_coordinates(&self) -> impl Iterator<Item = &DimensionCoordinate> {
        self.dimension_coordinates.values()
    }

    pub fn auxiliary_coordinates(&self) -> impl Iterator<Item = &AuxiliaryCoordinate> {
        self.auxiliary_coordinates.values()
    }

    pub fn domain_ancillaries(&self) -> impl Iterator<Item = &DomainAncillary> {
        self.domain_ancillaries.values()
    }

    pub fn auxiliary_coordinate_keys(&self) -> std::collections::HashSet<String> {
        self.auxiliary_coordinates.keys().cloned().collect()
    }

    /// Looks up a dimension coordinate by identifier preference order,
    /// returning the first identifier in `preferred` that resolves to
    /// exactly one coordinate.
    pub fn find_dimension_coordinate(
        &self,
        preferred: &[&str],
    ) -> Result<&DimensionCoordinate, FieldError> {
        for name in preferred {
            if let Some(c) = self.dimension_coordinates.get(*name) {
                return Ok(c);
            }
        }
        Err(FieldError::CoordinateNotFound(preferred.join(" or ")))
    }

    /// Looks up an auxiliary coordinate by identifier preference order, the
    /// auxiliary-coordinate counterpart of [`Field::find_dimension_coordinate`].
    pub fn find_auxiliary_coordinate(
        &self,
        preferred: &[&str],
    ) -> Result<&AuxiliaryCoordinate, FieldError> {
        for name in preferred {
            if let Some(c) = self.auxiliary_coordinates.get(*name) {
                return Ok(c);
            }
        }
        Err(FieldError::CoordinateNotFound(preferred.join(" or ")))
    }

    /// Restricts a dimension coordinate's axis to the index range
    /// `[start, end)`, returning a new field with the data array, the
    /// restricted coordinate, and every other coordinate sharing that axis
    /// all sliced consistently. Coordinates not defined on `axis` are
    /// carried over unchanged.
    pub fn subspace_axis_range(&self, axis: usize, start: usize, end: usize) -> Result<Field, FieldError> {
        if axis >= self.ndim() {
            return Err(FieldError::AxisOutOfRange(axis, self.ndim()));
        }
        let data = self.persist();
        let sliced = data
            .slice_axis(ndarray::Axis(axis), ndarray::Slice::from(start..end))
            .to_owned();

        let mut shape = self.shape.clone();
        shape[axis] = end - start;

        let mut out = Field::new(self.standard_name.clone(), self.units.raw.clone(), sliced);
        out.history = self.history.clone();

        for (name, coord) in &self.dimension_coordinates {
            if coord.axis == axis {
                let restricted = coord
                    .data
                    .slice_axis(ndarray::Axis(0), ndarray::Slice::from(start..end))
                    .to_owned();
                let mut c = coord.clone();
                c.data = restricted;
                out.dimension_coordinates.insert(name.clone(), c);
            } else {
                out.dimension_coordinates.insert(name.clone(), coord.clone());
            }
        }
        for (name, coord) in &self.auxiliary_coordinates {
            if let Some(pos) = coord.axes.iter().position(|&a| a == axis) {
                let restricted = coord
                    .data
                    .slice_axis(ndarray::Axis(pos), ndarray::Slice::from(start..end))
                    .to_owned();
                let mut c = coord.clone();
                c.data = restricted;
                out.auxiliary_coordinates.insert(name.clone(), c);
            } else {
                out.auxiliary_coordinates.insert(name.clone(), coord.clone());
            }
        }
        for (name, anc) in &self.domain_ancillaries {
            if let Some(pos) = anc.axes.iter().position(|&a| a == axis) {
                let restricted = anc
                    .data
                    .slice_axis(ndarray::Axis(pos), ndarray::Slice::from(start..end))
                    .to_owned();
                let mut a = anc.clone();
                a.data = restricted;
                out.domain_ancillaries.insert(name.clone(), a);
            } else {
                out.domain_ancillaries.insert(name.clone(), anc.clone());
            }
        }
        out.shape = shape;
        Ok(out)
    }

    /// Finds the smallest `[start, end)` index range on `axis` whose
    /// coordinate values satisfy `query`, per the between-cells query
    /// logic: candidate indices are found via boolean masks rather than a
    /// linear scan, then widened by `halo` on each side and clamped to the
    /// coordinate's own extent.
    pub fn index_range_for_query(
        &self,
        axis: usize,
        query: Query,
        halo: usize,
    ) -> Result<(usize, usize), FieldError> {
        let coord = self
            .dimension_coordinates
            .values()
            .find(|c| c.axis == axis)
            .ok_or(FieldError::AxisOutOfRange(axis, self.ndim()))?;
        let n = coord.data.len();
        let ascending = n < 2 || coord.data[0] <= coord.data[n - 1];

        let matches: Vec<usize> = coord
            .data
            .iter()
            .enumerate()
            .filter(|(_, &v)| query.matches(v))
            .map(|(i, _)| i)
            .collect();

        let (lo, hi) = match query {
            Query::Within { lo, hi } => (lo, hi),
            Query::GreaterThan(b) => (b, f64::INFINITY),
            Query::LessThan(b) => (f64::NEG_INFINITY, b),
            Query::Outside { lo, hi } => (lo, hi),
        };

        if matches.is_empty() {
            return Err(FieldError::EmptySubspace { axis, lo, hi });
        }

        let (mut start, mut end) = (
            *matches.iter().min().unwrap(),
            *matches.iter().max().unwrap() + 1,
        );

        if !ascending {
            std::mem::swap(&mut start, &mut end);
            let (s, e) = (n.saturating_sub(end), n.saturating_sub(start));
            start = s;
            end = e;
        }

        start = start.saturating_sub(halo);
        end = (end + halo).min(n);
        Ok((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinate::DimensionCoordinate;
    use ndarray::{arr1, IxDyn};

    fn time_field() -> Field {
        let data = ArrayD::zeros(IxDyn(&[5]));
        let time = DimensionCoordinate {
            standard_name: "time".into(),
            units: Units::new("hours since 1970-01-01 00:00:00"),
            calendar: Some(Calendar::Standard),
            axis: 0,
            data: arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]).into_dyn(),
            bounds: None,
        };
        Field::new("air_temperature", "K", data).with_dimension_coordinate(time)
    }

    #[test]
    fn persist_caches_lazy_data() {
        let calls = Rc::new(RefCell::new(0));
        let calls2 = Rc::clone(&calls);
        let field = Field::new_lazy("air_temperature", "K", vec![3], move || {
            *calls2.borrow_mut() += 1;
            ArrayD::zeros(IxDyn(&[3]))
        });
        field.persist();
        field.persist();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn index_range_for_query_finds_enclosing_range_with_halo() {
        let field = time_field();
        let (start, end) = field
            .index_range_for_query(0, Query::Within { lo: 1.5, hi: 2.5 }, 1)
            .unwrap();
        assert_eq!((start, end), (1, 4));
    }

    #[test]
    fn index_range_for_query_clamps_halo_at_array_edges() {
        let field = time_field();
        let (start, end) = field
            .index_range_for_query(0, Query::Within { lo: 0.0, hi: 0.5 }, 2)
            .unwrap();
        assert_eq!((start, end), (0, 3));
    }

    #[test]
    fn index_range_for_query_errs_when_nothing_matches() {
        let field = time_field();
        let result = field.index_range_for_query(0, Query::Within { lo: 10.0, hi: 20.0 }, 1);
        assert!(result.is_err());
    }

    #[test]
    fn subspace_axis_range_restricts_both_data_and_coordinate() {
        let field = time_field();
        let sub = field.subspace_axis_range(0, 1, 4).unwrap();
        assert_eq!(sub.shape(), &[3]);
        let t = sub.dimension_coordinate("time").unwrap();
        assert_eq!(t.data.as_slice().unwrap(), &[1.0, 2.0, 3.0]);
    }
}
