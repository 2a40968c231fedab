// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Coordinate types attached to a [`crate::field::Field`].
*/

use ndarray::ArrayD;

/// A calendar under which a time coordinate's numeric values are
/// interpreted.
///
/// Only the variants the co-location engine must special-case are
/// enumerated; `Day360` and `NoLeap` round-trip through the engine but are
/// never coerced into `Standard`, since the 1582-10-15 Gregorian-cutoff
/// equivalence rule applies only between `Standard` and `ProlepticGregorian`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    Standard,
    ProlepticGregorian,
    Day360,
    NoLeap,
}

impl Calendar {
    /// Parses a CF `calendar` attribute value. Unrecognised strings are
    /// treated as `Standard`, which is the CF default when the attribute is
    /// absent.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "proleptic_gregorian" => Calendar::ProlepticGregorian,
            "360_day" => Calendar::Day360,
            "noleap" | "365_day" => Calendar::NoLeap,
            _ => Calendar::Standard,
        }
    }

    /// Two calendars are equivalent for the purposes of calendar
    /// reconciliation if they're identical, or if they're the
    /// `standard`/`proleptic_gregorian` pair and the model's earliest
    /// datetime falls on or after the Gregorian cutoff (1582-10-15), after
    /// which the two calendars agree exactly.
    pub fn reconcilable_with(self, other: Calendar) -> bool {
        self == other
            || matches!(
                (self, other),
                (Calendar::Standard, Calendar::ProlepticGregorian)
                    | (Calendar::ProlepticGregorian, Calendar::Standard)
            )
    }
}

/// A unit string together with the reference epoch for time units
/// expressed as `<unit> since <epoch>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    pub raw: String,
    pub since: Option<chrono::NaiveDateTime>,
}

impl Units {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let since = raw
            .split_once(" since ")
            .and_then(|(_, epoch)| parse_epoch(epoch.trim()));
        Self { raw, since }
    }

    pub fn is_time(&self) -> bool {
        self.since.is_some()
    }
}

fn parse_epoch(epoch: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(epoch, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(epoch, "%Y-%m-%d"))
        .ok()
}

/// A coordinate that indexes one axis of the field's data array directly
/// (one value per axis position, monotonic).
#[derive(Debug, Clone)]
pub struct DimensionCoordinate {
    pub standard_name: String,
    pub units: Units,
    pub calendar: Option<Calendar>,
    pub axis: usize,
    pub data: ArrayD<f64>,
    pub bounds: Option<ArrayD<f64>>,
}

/// A coordinate that varies over one or more of the field's axes but does
/// not itself index any axis (e.g. a 2-D latitude field on a curvilinear
/// grid, or a per-sample auxiliary time coordinate on a trajectory).
#[derive(Debug, Clone)]
pub struct AuxiliaryCoordinate {
    pub standard_name: String,
    pub units: Units,
    pub calendar: Option<Calendar>,
    pub axes: Vec<usize>,
    pub data: ArrayD<f64>,
}

/// A non-coordinate field carried alongside a parent field purely to
/// support computing another construct (e.g. `orog` for the hybrid-height
/// parametric vertical formula).
#[derive(Debug, Clone)]
pub struct DomainAncillary {
    pub standard_name: String,
    pub units: Units,
    pub axes: Vec<usize>,
    pub data: ArrayD<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendars_reconcile_only_in_the_standard_proleptic_pair() {
        assert!(Calendar::Standard.reconcilable_with(Calendar::ProlepticGregorian));
        assert!(Calendar::ProlepticGregorian.reconcilable_with(Calendar::Standard));
        assert!(Calendar::Standard.reconcilable_with(Calendar::Standard));
        assert!(!Calendar::Standard.reconcilable_with(Calendar::Day360));
        assert!(!Calendar::Day360.reconcilable_with(Calendar::NoLeap));
    }

    #[test]
    fn units_parses_since_epoch() {
        let u = Units::new("hours since 1970-01-01 00:00:00");
        assert!(u.is_time());
        assert_eq!(
            u.since.unwrap(),
            chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn non_time_units_have_no_epoch() {
        let u = Units::new("Pa");
        assert!(!u.is_time());
    }
}
