// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`vision-colocate` co-locates a four-dimensional model field (time, vertical,
latitude, longitude) onto the spatio-temporal path of an observational
dataset expressed as a CF discrete sampling geometry (a flight trajectory or
a satellite swath), producing a new field carrying the model's physical
quantity at the observation's sample locations.

The pipeline is, per input observational file:

1. [`cf_normaliser`] locates each field's time coordinate, reconciles the
   model and observational calendars, and materialises any parametric
   vertical coordinate on the model field.
2. [`time_window`] checks the observational time range is enclosed by the
   model's time range.
3. [`bbox`] reduces the model field to the smallest 4-D bounding-box subspace
   that encloses the observational locations, with a halo margin.
4. [`spatial`] interpolates the reduced model subspace onto the
   observational horizontal/vertical locations via a [`spatial::regridder::LocstreamRegridder`].
5. [`temporal`] interpolates the spatially co-located result along time onto
   the observation's own timestamps.
6. [`assembler`] reattaches observational metadata and, for trajectory
   inputs, assembles a contiguous ragged array across files.

[`driver::Driver`] owns the end-to-end run across however many observational
files one invocation covers; [`config::EngineConfig`] carries the layered
configuration (defaults, JSON file, CLI flags) that parameterises it.
*/

pub mod assembler;
pub mod bbox;
pub mod cf_normaliser;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod misc;
pub mod plugin;
pub mod reader;
pub mod spatial;
pub mod temporal;
pub mod time_window;

pub use config::EngineConfig;
pub use driver::Driver;
pub use error::EngineError;
pub use field::Field;
