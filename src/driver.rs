// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Owns the end-to-end run across however many observational files one
invocation covers: read the model once, run every file through the
normalise → validate → reduce → spatially co-locate → temporally
co-locate pipeline, and hand the per-file results to the assembler.
*/

use crate::assembler;
use crate::bbox::{self, ObsBounds};
use crate::cf_normaliser;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::field::coordinate::DomainAncillary;
use crate::field::Field;
use crate::plugin::{self, PluginRegistry};
use crate::reader::{CfDatasetReader, CfDatasetWriter};
use crate::spatial::regridder::{DefaultRegridder, InterpolationMethod, LocstreamRegridder};
use crate::spatial::{self, SampleLocation};
use crate::temporal;

/// The discrete sampling geometry feature type of the observational input,
/// which determines both the vertical co-location strategy and how
/// per-file results are finally assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    /// A flight track: each sample carries its own vertical location, and
    /// per-file results are assembled as a contiguous ragged array.
    Trajectory,
    /// A satellite swath: no per-sample vertical location: every model
    /// level is co-located and then collapsed to a configured level index.
    /// Per-file results are concatenated, not CRA-assembled.
    Satellite,
}

/// Owns one co-location run.
pub struct Driver<'a> {
    config: &'a EngineConfig,
    reader: &'a dyn CfDatasetReader,
    writer: &'a dyn CfDatasetWriter,
    plugins: PluginRegistry,
    regridder: Box<dyn LocstreamRegridder>,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a EngineConfig, reader: &'a dyn CfDatasetReader, writer: &'a dyn CfDatasetWriter) -> Self {
        let method = if config.spatial_colocation_method == "nearest" {
            InterpolationMethod::Nearest
        } else {
            InterpolationMethod::Linear
        };
        Self {
            config,
            reader,
            writer,
            plugins: PluginRegistry::default(),
            regridder: Box::new(DefaultRegridder { method }),
        }
    }

    fn reduce_candidates(
        &self,
        plugin_name: Option<&str>,
        candidates: Vec<Field>,
        chosen: Option<usize>,
    ) -> Result<Field, EngineError> {
        let (field, _reduced) = match plugin_name {
            Some(name) => self.plugins.get(name)?.apply(candidates, chosen)?,
            None => plugin::take_chosen_or_only("none", candidates, chosen)?,
        };
        Ok(field)
    }

    /// Reads and attaches the `surface_altitude` domain ancillary named by
    /// `config.orography`, if one was configured, so that
    /// [`cf_normaliser::compute_parametric_vertical`] can resolve the
    /// `atmosphere_hybrid_height_coordinate` formula's `orog` term. A run
    /// with no `--orography` configured leaves `model` untouched, which is
    /// fine for any formula that doesn't need it.
    fn attach_orography(&self, model: Field) -> Result<Field, EngineError> {
        let Some(path) = self.config.orography.as_deref() else {
            return Ok(model);
        };
        let candidates = self.reader.read_fields(path, "surface_altitude")?;
        let (orog, _) = plugin::take_chosen_or_only("none", candidates, None)?;

        let lat_axis = model.dimension_coordinate("latitude").map(|c| c.axis);
        let lon_axis = model.dimension_coordinate("longitude").map(|c| c.axis);
        let (lat_axis, lon_axis) = match (lat_axis, lon_axis) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(EngineError::CfCompliance(
                    crate::cf_normaliser::error::CfComplianceError::MissingParametricInput {
                        formula: "atmosphere_hybrid_height_coordinate".into(),
                        ancillary: "model latitude/longitude".into(),
                    },
                ))
            }
        };

        let ancillary = DomainAncillary {
            standard_name: "orog".into(),
            units: orog.units.clone(),
            axes: vec![lat_axis, lon_axis],
            data: orog.persist(),
        };
        Ok(model.with_domain_ancillary(ancillary))
    }

    /// Runs the full pipeline across `obs_sources` against the single
    /// model field read from `model_source`, and writes the assembled
    /// result to `config.output_file_name` inside `config.outputs_dir`.
    pub fn run(
        &self,
        model_source: &str,
        model_standard_name: &str,
        obs_sources: &[String],
        obs_standard_name: &str,
        feature_type: FeatureType,
    ) -> Result<Field, EngineError> {
        log::info!("{}", crate::misc::environment_and_diagnostics_report());

        let model_candidates = self.reader.read_fields(model_source, model_standard_name)?;
        let model = self.reduce_candidates(
            self.config.preprocess_mode_model.as_deref(),
            model_candidates,
            self.config.chosen_model_field,
        )?;
        model.persist_all_metadata();
        let model = self.attach_orography(model)?;
        let model = cf_normaliser::compute_parametric_vertical(&model)?;

        let mut results = Vec::with_capacity(obs_sources.len());
        let mut trajectory_ids = Vec::with_capacity(obs_sources.len());

        for (index, source) in obs_sources.iter().enumerate() {
            log::info!(
                "Start of colocation iteration with file number {}",
                index + 1
            );
            let result = self.colocate_single_file(&model, source, obs_standard_name, feature_type)?;
            results.push(result);
            trajectory_ids.push(source.clone());
        }

        let assembled = match feature_type {
            FeatureType::Trajectory => assembler::assemble_trajectory_cra(&results, &trajectory_ids)?,
            FeatureType::Satellite => assembler::assemble_satellite(&results)?,
        };

        let output_path = format!("{}/cra_{}", self.config.outputs_dir, self.config.output_file_name);
        self.writer.write_field(&assembled, &output_path)?;
        Ok(assembled)
    }

    fn colocate_single_file(
        &self,
        model: &Field,
        source: &str,
        obs_standard_name: &str,
        feature_type: FeatureType,
    ) -> Result<Field, EngineError> {
        let obs_candidates = self.reader.read_fields(source, obs_standard_name)?;
        let obs = self.reduce_candidates(
            self.config.preprocess_mode_obs.as_deref(),
            obs_candidates,
            self.config.chosen_obs_field,
        )?;

        let model_time = cf_normaliser::locate_model_time(model)?;
        let obs_time = cf_normaliser::locate_obs_time(&obs)?;
        let model_time_in_obs_units = cf_normaliser::reconcile_time(&model_time, &obs_time)?;
        let obs_time_values: Vec<f64> = obs_time.data.iter().cloned().collect();

        crate::time_window::validate(&model_time_in_obs_units, &obs_time_values)?;

        let latitude = obs.find_auxiliary_coordinate(&["latitude", "Y"])?;
        let longitude = obs.find_auxiliary_coordinate(&["longitude", "X"])?;
        let vertical = obs
            .find_auxiliary_coordinate(&[self.config.vertical_colocation_coord.as_str()])
            .ok();

        let lat_values: Vec<f64> = latitude.data.iter().cloned().collect();
        let lon_values: Vec<f64> = longitude.data.iter().cloned().collect();
        let vertical_values: Option<Vec<f64>> = vertical.map(|v| v.data.iter().cloned().collect());

        let (obs_time_lo, obs_time_hi) = min_max(&obs_time_values);
        let model_time_bounds = (
            cf_normaliser::convert_time_value(obs_time.units, obs_time_lo, model_time.units)
                .unwrap_or(obs_time_lo),
            cf_normaliser::convert_time_value(obs_time.units, obs_time_hi, model_time.units)
                .unwrap_or(obs_time_hi),
        );

        let obs_bounds = ObsBounds {
            time: model_time_bounds,
            latitude: min_max(&lat_values),
            longitude: min_max(&lon_values),
            vertical: vertical_values.as_deref().map(min_max),
        };

        let reduced_model = bbox::reduce(
            model,
            &obs_bounds,
            self.config.halo_size,
            &self.config.vertical_colocation_coord,
        )?;

        // `bbox::reduce` narrows the model's time axis independently of
        // `model_time_in_obs_units`, which was computed against the
        // unreduced model above for the time-window check. Every array
        // derived from `reduced_model` must be indexed against a time
        // coordinate re-derived from `reduced_model` itself, or its length
        // and offset won't match.
        let reduced_model_time = cf_normaliser::locate_model_time(&reduced_model)?;
        let reduced_model_time_in_obs_units =
            cf_normaliser::reconcile_time(&reduced_model_time, &obs_time)?;

        let destinations: Vec<SampleLocation> = lat_values
            .iter()
            .zip(lon_values.iter())
            .enumerate()
            .map(|(i, (&lat, &lon))| SampleLocation {
                latitude: lat,
                longitude: lon,
                vertical: vertical_values.as_ref().map(|v| v[i]),
            })
            .collect();

        let ln_z = self.config.vertical_colocation_coord.contains("pressure");

        let values = match feature_type {
            FeatureType::Trajectory => {
                let spatial_values = spatial::colocate_spatial(
                    &reduced_model,
                    &destinations,
                    &self.config.vertical_colocation_coord,
                    ln_z,
                    self.regridder.as_ref(),
                )?;
                temporal::colocate_temporal(
                    &reduced_model_time_in_obs_units,
                    &spatial_values,
                    &obs_time_values,
                )?
            }
            FeatureType::Satellite => {
                let per_level = spatial::colocate_spatial_per_level(
                    &reduced_model,
                    &destinations,
                    &self.config.vertical_colocation_coord,
                    self.regridder.as_ref(),
                )?;
                let per_level_time_interpolated: Vec<Vec<f64>> = per_level
                    .iter()
                    .map(|per_time| {
                        temporal::colocate_temporal(
                            &reduced_model_time_in_obs_units,
                            per_time,
                            &obs_time_values,
                        )
                    })
                    .collect::<Result<_, _>>()?;
                temporal::collapse_satellite_level(
                    &per_level_time_interpolated,
                    self.config.satellite_level_index,
                )
            }
        };

        Ok(assembler::assemble_result(
            &model.standard_name,
            &model.units.raw,
            values,
            obs.history.as_deref(),
            &self.config.history_message,
        ))
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}
