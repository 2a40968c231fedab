// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The `vision-colocate` command-line entry point: resolves the layered
configuration, wires up logging, and runs a [`vision_colocate::Driver`]
over the JSON dataset backend.
*/

use clap::Parser;
use vision_colocate::config::{CliArgs, EngineConfig};
use vision_colocate::driver::FeatureType;
use vision_colocate::reader::json::JsonDataset;
use vision_colocate::Driver;

/// Additional positional/flag arguments the binary needs beyond the
/// library's `CliArgs` layer: which files to process and what kind of
/// discrete sampling geometry they are.
#[derive(Parser, Debug)]
struct Cli {
    #[command(flatten)]
    engine: CliArgs,

    /// Paths to the observational input files, processed in order.
    #[arg(long = "obs-file", required = true)]
    obs_files: Vec<String>,

    /// Path to the model input file.
    #[arg(long = "model-file", required = true)]
    model_file: String,

    /// CF standard_name of the model quantity to co-locate.
    #[arg(long = "model-standard-name", required = true)]
    model_standard_name: String,

    /// CF standard_name of the observational path field.
    #[arg(long = "obs-standard-name", required = true)]
    obs_standard_name: String,

    /// Whether the observational input is a flight trajectory or a
    /// satellite swath.
    #[arg(long = "feature-type", value_enum, default_value = "trajectory")]
    feature_type: FeatureTypeArg,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum FeatureTypeArg {
    Trajectory,
    Satellite,
}

impl From<FeatureTypeArg> for FeatureType {
    fn from(value: FeatureTypeArg) -> Self {
        match value {
            FeatureTypeArg::Trajectory => FeatureType::Trajectory,
            FeatureTypeArg::Satellite => FeatureType::Satellite,
        }
    }
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    println!("{}", vision_colocate::misc::startup_banner());

    setup_logging(cli.engine.verbose);
    let config: EngineConfig = EngineConfig::resolve(cli.engine)?;

    let dataset = JsonDataset;
    let driver = Driver::new(&config, &dataset, &dataset);
    driver.run(
        &cli.model_file,
        &cli.model_standard_name,
        &cli.obs_files,
        &cli.obs_standard_name,
        cli.feature_type.into(),
    )?;

    log::info!("Co-location complete; result written under {}", config.outputs_dir);
    Ok(())
}
