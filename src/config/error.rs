// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while resolving the run's configuration.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("could not read config file '{path}': {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file '{path}' as JSON: {source}")]
    FileInvalid {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("both '--{preferred}' and its deprecated alias '--{deprecated}' were supplied; use only '--{preferred}'")]
    ConflictingDeprecatedAlias {
        preferred: &'static str,
        deprecated: &'static str,
    },

    #[error("'{0}' must be a valid output directory that already exists")]
    OutputsDirMissing(String),

    #[error("'satellite-plugin-config' is not valid JSON: {0}")]
    InvalidSatellitePluginConfig(#[source] serde_json::Error),
}
