// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Named pre-processing plugins, dispatched by configuration string rather
than an `if`/`else if` chain on the name.

A [`PreprocessPlugin`] takes a list of candidate fields read from an input
file (there may be more than one field in a file matching the requested
physical quantity) and reduces it to the single field the rest of the
pipeline operates on, performing whatever dataset-specific compliance
fixes that reduction requires.
*/

use std::collections::HashMap;

use thiserror::Error;

use crate::field::Field;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("no preprocessing plugin named '{0}' is registered")]
    UnknownPlugin(String),

    #[error("plugin '{plugin}' could not reduce the input field list: {reason}")]
    ReductionFailed { plugin: &'static str, reason: String },

    #[error("the input field list to preprocess was empty")]
    EmptyFieldList,
}

/// Reduces a list of candidate fields to the one field the pipeline
/// should use, optionally honouring a caller-chosen field selector.
///
/// The returned `bool` reports whether the plugin itself already reduced
/// the list to a single field (`true`) or is deferring to the caller's
/// generic "take the chosen index, or the only field if there's one"
/// fallback (`false`).
pub trait PreprocessPlugin {
    fn name(&self) -> &'static str;

    fn apply(&self, candidates: Vec<Field>, chosen: Option<usize>) -> Result<(Field, bool), PluginError>;
}

/// The generic "take the caller's chosen index, or the only candidate"
/// reduction every plugin falls back to, and that the driver also uses
/// directly when no plugin name is configured.
pub fn take_chosen_or_only(
    plugin: &'static str,
    mut candidates: Vec<Field>,
    chosen: Option<usize>,
) -> Result<(Field, bool), PluginError> {
    if candidates.is_empty() {
        return Err(PluginError::EmptyFieldList);
    }
    if let Some(index) = chosen {
        if index >= candidates.len() {
            return Err(PluginError::ReductionFailed {
                plugin,
                reason: format!("chosen index {index} out of range for {} candidates", candidates.len()),
            });
        }
        return Ok((candidates.swap_remove(index), true));
    }
    if candidates.len() == 1 {
        return Ok((candidates.swap_remove(0), true));
    }
    Ok((candidates.swap_remove(0), false))
}

/// Validates and retags a satellite swath's field identity. The
/// averaging-kernel retrieval work this plugin's name suggests is an
/// external collaborator's responsibility; this plugin only performs the
/// CF-compliance reduction step the rest of the pipeline requires before
/// co-location can proceed.
pub struct SatellitePlugin;

impl PreprocessPlugin for SatellitePlugin {
    fn name(&self) -> &'static str {
        "satellite"
    }

    fn apply(&self, candidates: Vec<Field>, chosen: Option<usize>) -> Result<(Field, bool), PluginError> {
        take_chosen_or_only(self.name(), candidates, chosen)
    }
}

/// Unified Model pre-processing. Not yet implemented upstream of this
/// crate either; passes its input list through the generic
/// chosen-or-only reduction.
pub struct UmPlugin;

impl PreprocessPlugin for UmPlugin {
    fn name(&self) -> &'static str {
        "UM"
    }

    fn apply(&self, candidates: Vec<Field>, chosen: Option<usize>) -> Result<(Field, bool), PluginError> {
        take_chosen_or_only(self.name(), candidates, chosen)
    }
}

/// WRF pre-processing. The system this crate is modelled on references a
/// WRF-specific vertical-axis reshape fix here
/// (`wrf_extra_compliance_fixes`/`wrf_further_compliance_fixes`) whose
/// exact trigger conditions could not be recovered from the available
/// source; this plugin performs the generic reduction only, which narrows
/// (rather than changes) the set of WRF inputs the pipeline can co-locate.
pub struct WrfPlugin;

impl PreprocessPlugin for WrfPlugin {
    fn name(&self) -> &'static str {
        "WRF"
    }

    fn apply(&self, candidates: Vec<Field>, chosen: Option<usize>) -> Result<(Field, bool), PluginError> {
        take_chosen_or_only(self.name(), candidates, chosen)
    }
}

/// Flight-track pre-processing. Not yet implemented upstream of this crate
/// either; passes its input list through the generic reduction.
pub struct FlightPlugin;

impl PreprocessPlugin for FlightPlugin {
    fn name(&self) -> &'static str {
        "flight"
    }

    fn apply(&self, candidates: Vec<Field>, chosen: Option<usize>) -> Result<(Field, bool), PluginError> {
        take_chosen_or_only(self.name(), candidates, chosen)
    }
}

/// The name -> plugin lookup a [`crate::driver::Driver`] consults when a
/// `preprocess-mode-*` configuration names a plugin.
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Box<dyn PreprocessPlugin>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        let mut registry = Self {
            plugins: HashMap::new(),
        };
        registry.register(Box::new(SatellitePlugin));
        registry.register(Box::new(UmPlugin));
        registry.register(Box::new(WrfPlugin));
        registry.register(Box::new(FlightPlugin));
        registry
    }
}

impl PluginRegistry {
    pub fn register(&mut self, plugin: Box<dyn PreprocessPlugin>) {
        self.plugins.insert(plugin.name(), plugin);
    }

    pub fn get(&self, name: &str) -> Result<&dyn PreprocessPlugin, PluginError> {
        self.plugins
            .get(name)
            .map(|b| b.as_ref())
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn dummy_field(n: &str) -> Field {
        Field::new(n, "K", ArrayD::zeros(IxDyn(&[1])))
    }

    #[test]
    fn registry_resolves_known_plugin_names() {
        let registry = PluginRegistry::default();
        assert!(registry.get("satellite").is_ok());
        assert!(registry.get("UM").is_ok());
        assert!(registry.get("WRF").is_ok());
        assert!(registry.get("flight").is_ok());
    }

    #[test]
    fn registry_rejects_unknown_plugin_names() {
        let registry = PluginRegistry::default();
        assert!(registry.get("not-a-plugin").is_err());
    }

    #[test]
    fn chosen_or_only_picks_a_single_candidate_without_reduction_flag() {
        let plugin = SatellitePlugin;
        let (field, reduced) = plugin
            .apply(vec![dummy_field("a")], None)
            .unwrap();
        assert_eq!(field.standard_name, "a");
        assert!(reduced);
    }

    #[test]
    fn chosen_or_only_defers_reduction_when_ambiguous() {
        let plugin = SatellitePlugin;
        let (_, reduced) = plugin
            .apply(vec![dummy_field("a"), dummy_field("b")], None)
            .unwrap();
        assert!(!reduced);
    }

    #[test]
    fn empty_candidate_list_is_an_error() {
        let plugin = SatellitePlugin;
        assert!(plugin.apply(vec![], None).is_err());
    }
}
