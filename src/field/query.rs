// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
A tagged-variant query over coordinate values, used in place of the
query-object pattern (`cf.wi`, `cf.gt`, `cf.lt`, `cf.wo`) the engine this
crate is modelled on exposes. Keeping queries as a closed enum lets every
consumer match exhaustively instead of relying on dynamic dispatch.
*/

/// A condition to evaluate against a coordinate's numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    /// Value is within `[lo, hi]` inclusive.
    Within { lo: f64, hi: f64 },
    /// Value is strictly greater than the bound.
    GreaterThan(f64),
    /// Value is strictly less than the bound.
    LessThan(f64),
    /// Value is outside `[lo, hi]` inclusive (the complement of `Within`).
    Outside { lo: f64, hi: f64 },
}

impl Query {
    /// Evaluates the query against a single value.
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Query::Within { lo, hi } => value >= lo && value <= hi,
            Query::GreaterThan(bound) => value > bound,
            Query::LessThan(bound) => value < bound,
            Query::Outside { lo, hi } => value < lo || value > hi,
        }
    }

    /// Counts how many values in `data` match the query.
    pub fn count_matches(&self, data: &ndarray::ArrayD<f64>) -> usize {
        data.iter().filter(|&&v| self.matches(v)).count()
    }
}
