// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Small standalone helpers used by the CLI binary at startup.
*/

/// A short banner printed once before logging initialises, so a user
/// running the tool interactively sees what they launched before any log
/// line appears.
///
/// # Returns
///
/// The banner text, with no trailing newline.
pub fn startup_banner() -> String {
    format!(
        "vision-colocate {} — model-to-observation spatio-temporal co-location",
        env!("CARGO_PKG_VERSION")
    )
}

/// Builds a one-line environment/diagnostics report logged at `info` level
/// at startup, recording the crate's own version and the key numeric/array
/// dependency versions relevant to reproducing a run.
///
/// # Returns
///
/// A human-readable, single-line report.
pub fn environment_and_diagnostics_report() -> String {
    format!(
        "vision-colocate={} ndarray=0.17 chrono=0.4 rayon=1.11",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_banner_includes_crate_version() {
        assert!(startup_banner().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn diagnostics_report_includes_crate_version() {
        assert!(environment_and_diagnostics_report().contains(env!("CARGO_PKG_VERSION")));
    }
}
