// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while assembling the final co-located result.
*/

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("cannot assemble a contiguous ragged array from zero per-file results")]
    NoResultsToAssemble,

    #[error("per-file result has {got} samples but its declared row size is {expected}")]
    RowSizeMismatch { expected: usize, got: usize },

    #[error("observational field has no '{0}' auxiliary coordinate required for cf_role={0} assembly")]
    MissingCfRoleCoordinate(&'static str),
}
