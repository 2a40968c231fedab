// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while reading or writing a CF dataset.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataReadingError {
    #[error("no field with standard_name '{standard_name}' was found in '{source}'")]
    FieldNotFound { source: String, standard_name: String },

    #[error("failed to read '{path}': {reason}")]
    IoFailure { path: String, reason: String },

    #[error("failed to write '{path}': {reason}")]
    WriteFailure { path: String, reason: String },
}
