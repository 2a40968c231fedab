// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Layered run configuration: hard-coded defaults, overridden by an optional
JSON config file, overridden in turn by CLI flags.

[`EngineConfig`] is built once per run and passed by shared reference to
every pipeline stage that needs it, rather than consulted through a global
configuration object — the whole point of resolving the three layers up
front is that nothing downstream has to know or care which layer a given
setting actually came from.
*/

pub mod error;

use std::path::PathBuf;

use clap::Parser;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use error::ConfigurationError;

lazy_static! {
    /// Hard-coded defaults, applied before the config file and CLI layers.
    pub static ref CONFIG_DEFAULTS: EngineConfig = EngineConfig {
        verbose: 0,
        start_time_override: None,
        obs_data_path: ".".into(),
        model_data_path: ".".into(),
        chosen_obs_field: None,
        chosen_model_field: None,
        preprocess_mode_obs: None,
        preprocess_mode_model: None,
        orography: None,
        outputs_dir: ".".into(),
        output_file_name: "vision_toolkit_result_field.nc".into(),
        history_message: "Processed using the NCAS VISION Toolkit to co-locate from model data \
to the observational data spatio-temporal location."
            .into(),
        halo_size: 1,
        spatial_colocation_method: "linear".into(),
        vertical_colocation_coord: "air_pressure".into(),
        source_axes: false,
        satellite_level_index: 10,
        satellite_plugin_config: None,
    };
}

/// The fully resolved configuration for one co-location run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub verbose: u8,
    pub start_time_override: Option<String>,
    pub obs_data_path: String,
    pub model_data_path: String,
    pub chosen_obs_field: Option<usize>,
    pub chosen_model_field: Option<usize>,
    pub preprocess_mode_obs: Option<String>,
    pub preprocess_mode_model: Option<String>,
    pub orography: Option<String>,
    pub outputs_dir: String,
    pub output_file_name: String,
    pub history_message: String,
    pub halo_size: usize,
    pub spatial_colocation_method: String,
    pub vertical_colocation_coord: String,
    pub source_axes: bool,
    /// The pressure-level index a satellite plugin's result collapses to;
    /// see `crate::temporal::collapse_satellite_level`.
    pub satellite_level_index: usize,
    pub satellite_plugin_config: Option<serde_json::Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        CONFIG_DEFAULTS.clone()
    }
}

/// The CLI surface: every setting in [`EngineConfig`], plus the config-file
/// path and a couple of deprecated flag aliases kept for backwards
/// compatibility.
#[derive(Parser, Debug, Default)]
#[command(name = "vision-colocate", about = "Co-locates a model field onto observational discrete sampling geometry data.")]
pub struct CliArgs {
    /// Path to a JSON config file; its settings override the built-in
    /// defaults and are themselves overridden by any CLI flag below.
    #[arg(short = 'c', long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// Repeatable; -v, -vv, -vvv increase verbosity.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(long = "start-time-override")]
    pub start_time_override: Option<String>,

    #[arg(long = "obs-data-path")]
    pub obs_data_path: Option<String>,

    #[arg(long = "model-data-path")]
    pub model_data_path: Option<String>,

    #[arg(long = "chosen-obs-field")]
    pub chosen_obs_field: Option<usize>,

    #[arg(long = "chosen-model-field")]
    pub chosen_model_field: Option<usize>,

    #[arg(long = "preprocess-mode-obs")]
    pub preprocess_mode_obs: Option<String>,

    #[arg(long = "preprocess-mode-model")]
    pub preprocess_mode_model: Option<String>,

    #[arg(long = "orography")]
    pub orography: Option<String>,

    #[arg(long = "outputs-dir")]
    pub outputs_dir: Option<String>,

    #[arg(long = "output-file-name")]
    pub output_file_name: Option<String>,

    #[arg(long = "history-message")]
    pub history_message: Option<String>,

    #[arg(long = "halo-size")]
    pub halo_size: Option<usize>,

    #[arg(long = "spatial-colocation-method")]
    pub spatial_colocation_method: Option<String>,

    /// Deprecated alias for `--spatial-colocation-method`.
    #[arg(long = "regrid-method")]
    pub regrid_method: Option<String>,

    #[arg(long = "vertical-colocation-coord")]
    pub vertical_colocation_coord: Option<String>,

    /// Deprecated alias for `--vertical-colocation-coord`.
    #[arg(long = "regrid-z-coord")]
    pub regrid_z_coord: Option<String>,

    #[arg(long = "source-axes")]
    pub source_axes: bool,

    #[arg(long = "satellite-level-index")]
    pub satellite_level_index: Option<usize>,

    /// A JSON object configuring the satellite preprocessing plugin.
    #[arg(long = "satellite-plugin-config")]
    pub satellite_plugin_config: Option<String>,
}

fn apply_deprecated_alias(
    preferred: &mut Option<String>,
    deprecated: Option<String>,
    preferred_name: &'static str,
    deprecated_name: &'static str,
) -> Result<(), ConfigurationError> {
    if let Some(value) = deprecated {
        if preferred.is_some() {
            return Err(ConfigurationError::ConflictingDeprecatedAlias {
                preferred: preferred_name,
                deprecated: deprecated_name,
            });
        }
        log::warn!("'--{deprecated_name}' is deprecated; use '--{preferred_name}' instead");
        *preferred = Some(value);
    }
    Ok(())
}

impl EngineConfig {
    /// Resolves the three configuration layers: [`CONFIG_DEFAULTS`],
    /// overridden by the JSON file named in `cli.config_file` (if any),
    /// overridden in turn by every CLI flag that was actually supplied.
    pub fn resolve(mut cli: CliArgs) -> Result<EngineConfig, ConfigurationError> {
        apply_deprecated_alias(
            &mut cli.spatial_colocation_method,
            cli.regrid_method.take(),
            "spatial-colocation-method",
            "regrid-method",
        )?;
        apply_deprecated_alias(
            &mut cli.vertical_colocation_coord,
            cli.regrid_z_coord.take(),
            "vertical-colocation-coord",
            "regrid-z-coord",
        )?;

        let mut config = match &cli.config_file {
            Some(path) => read_config_file(path)?,
            None => CONFIG_DEFAULTS.clone(),
        };

        if cli.verbose > 0 {
            config.verbose = cli.verbose;
        }
        if let Some(v) = cli.start_time_override {
            config.start_time_override = Some(v);
        }
        if let Some(v) = cli.obs_data_path {
            config.obs_data_path = v;
        }
        if let Some(v) = cli.model_data_path {
            config.model_data_path = v;
        }
        if let Some(v) = cli.chosen_obs_field {
            config.chosen_obs_field = Some(v);
        }
        if let Some(v) = cli.chosen_model_field {
            config.chosen_model_field = Some(v);
        }
        if let Some(v) = cli.preprocess_mode_obs {
            config.preprocess_mode_obs = Some(v);
        }
        if let Some(v) = cli.preprocess_mode_model {
            config.preprocess_mode_model = Some(v);
        }
        if let Some(v) = cli.orography {
            config.orography = Some(v);
        }
        if let Some(v) = cli.outputs_dir {
            config.outputs_dir = v;
        }
        if let Some(v) = cli.output_file_name {
            config.output_file_name = v;
        }
        if let Some(v) = cli.history_message {
            config.history_message = v;
        }
        if let Some(v) = cli.halo_size {
            config.halo_size = v;
        }
        if let Some(v) = cli.spatial_colocation_method {
            config.spatial_colocation_method = v;
        }
        if let Some(v) = cli.vertical_colocation_coord {
            config.vertical_colocation_coord = v;
        }
        if cli.source_axes {
            config.source_axes = true;
        }
        if let Some(v) = cli.satellite_level_index {
            config.satellite_level_index = v;
        }
        if let Some(raw) = cli.satellite_plugin_config {
            let value = serde_json::from_str(&raw)
                .map_err(ConfigurationError::InvalidSatellitePluginConfig)?;
            config.satellite_plugin_config = Some(value);
        }

        validate(&config)?;
        Ok(config)
    }
}

fn read_config_file(path: &std::path::Path) -> Result<EngineConfig, ConfigurationError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::FileUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    let overrides: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| ConfigurationError::FileInvalid {
            path: path.display().to_string(),
            source,
        })?;

    let mut defaults = serde_json::to_value(CONFIG_DEFAULTS.clone())
        .expect("EngineConfig always serializes");
    if let (Some(defaults_obj), Some(overrides_obj)) = (defaults.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides_obj {
            defaults_obj.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(defaults).map_err(|source| ConfigurationError::FileInvalid {
        path: path.display().to_string(),
        source,
    })
}

fn validate(config: &EngineConfig) -> Result<(), ConfigurationError> {
    if !std::path::Path::new(&config.outputs_dir).is_dir() {
        return Err(ConfigurationError::OutputsDirMissing(config.outputs_dir.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_cli_overrides_over_defaults() {
        let cli = CliArgs {
            outputs_dir: Some(".".into()),
            halo_size: Some(3),
            ..Default::default()
        };
        let config = EngineConfig::resolve(cli).unwrap();
        assert_eq!(config.halo_size, 3);
        assert_eq!(config.spatial_colocation_method, "linear");
    }

    #[test]
    fn deprecated_regrid_method_alias_maps_to_preferred_field() {
        let cli = CliArgs {
            outputs_dir: Some(".".into()),
            regrid_method: Some("nearest".into()),
            ..Default::default()
        };
        let config = EngineConfig::resolve(cli).unwrap();
        assert_eq!(config.spatial_colocation_method, "nearest");
    }

    #[test]
    fn supplying_both_preferred_and_deprecated_flag_is_an_error() {
        let cli = CliArgs {
            outputs_dir: Some(".".into()),
            spatial_colocation_method: Some("linear".into()),
            regrid_method: Some("nearest".into()),
            ..Default::default()
        };
        assert!(EngineConfig::resolve(cli).is_err());
    }

    #[test]
    fn nonexistent_outputs_dir_is_rejected() {
        let cli = CliArgs {
            outputs_dir: Some("/definitely/not/a/real/path".into()),
            ..Default::default()
        };
        assert!(EngineConfig::resolve(cli).is_err());
    }
}
