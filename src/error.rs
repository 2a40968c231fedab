// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The top-level error type returned by every public engine operation.

Each pipeline stage raises its own error enum (`cf_normaliser::error::CfComplianceError`,
`bbox::error::BboxError`, and so on); this type composes them via `#[from]`
so callers can match on a single `EngineError` without caring which stage
produced it, mirroring the five fatal categories every pipeline stage is
specified to raise.
*/

use thiserror::Error;

/// Any error that can terminate a co-location run.
///
/// All variants are fatal in the sense that `vision-colocate` does not
/// retry or substitute a default when one occurs; the only two local
/// recovery points (the bounding-box primary/fallback strategy switch, and
/// the temporal co-locator's halo-only empty-segment tolerance) are handled
/// internally by the stages that own them and never surface as an
/// `EngineError`.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A field does not conform to the CF conventions the engine requires
    /// (missing/ambiguous coordinate identification, unrecognised
    /// parametric vertical formula, incompatible calendars).
    #[error("{0}")]
    CfCompliance(#[from] crate::cf_normaliser::error::CfComplianceError),

    /// Two otherwise CF-compliant inputs cannot be combined (the
    /// observational time range is not enclosed by the model's).
    #[error("{0}")]
    IncompatibleInputs(#[from] crate::time_window::error::IncompatibleInputsError),

    /// The bounding-box reduction could not find an enclosing subspace.
    #[error("{0}")]
    Bbox(#[from] crate::bbox::error::BboxError),

    /// The spatial co-locator could not interpolate the reduced subspace
    /// onto the observational locations.
    #[error("{0}")]
    Spatial(#[from] crate::spatial::error::SpatialError),

    /// The temporal co-locator could not build or weight a bracketing
    /// segment for an observational timestamp.
    #[error("{0}")]
    Temporal(#[from] crate::temporal::error::TemporalError),

    /// The output assembler could not reattach metadata or assemble the
    /// contiguous ragged array representation.
    #[error("{0}")]
    Assembler(#[from] crate::assembler::error::AssemblerError),

    /// A named preprocessing plugin is unknown, or a plugin rejected its
    /// input.
    #[error("{0}")]
    Plugin(#[from] crate::plugin::PluginError),

    /// The run could not be configured (conflicting CLI flags, malformed
    /// config file, both a preferred and a deprecated alias for the same
    /// setting supplied).
    #[error("{0}")]
    Configuration(#[from] crate::config::error::ConfigurationError),

    /// Reading an input dataset failed at the I/O layer.
    #[error("{0}")]
    DataReading(#[from] crate::reader::error::DataReadingError),

    /// An error that should be unreachable given the engine's own
    /// invariants; its presence indicates a bug in `vision-colocate`
    /// itself rather than a problem with the inputs.
    #[error("internal error: {0}")]
    Internal(String),

    /// A field-model invariant was violated while building or querying a
    /// [`crate::field::Field`].
    #[error("{0}")]
    Field(#[from] crate::field::error::FieldError),
}
