// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while building or querying a [`crate::field::Field`].
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldError {
    #[error("no coordinate with standard_name '{0}' was found on the field")]
    CoordinateNotFound(String),

    #[error("{count} coordinates matched standard_name '{standard_name}'; identification must be unique")]
    AmbiguousCoordinate { standard_name: String, count: usize },

    #[error("axis {0} is out of range for a field with {1} axes")]
    AxisOutOfRange(usize, usize),

    #[error("cannot subspace axis {axis}: requested range [{lo}, {hi}] does not overlap the coordinate's data extent")]
    EmptySubspace { axis: usize, lo: f64, hi: f64 },

    #[error("domain ancillary '{0}' required by a parametric vertical formula is not attached to the field")]
    MissingDomainAncillary(String),

    #[error("field shapes are incompatible for concatenation along axis {axis}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        axis: usize,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },
}
