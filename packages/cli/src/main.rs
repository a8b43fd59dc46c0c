#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive crime dashboard.
//!
//! Loads the call, camera, and tract files named by the configuration,
//! then loops over a `dialoguer` menu. Every selection change reruns the
//! pipeline and rewrites the outputs (filtered rows, aggregated series,
//! chart, and map) under the output directory.
//!
//! Uses `indicatif-log-bridge` (via [`crime_dash_cli_utils::init_logger`])
//! so that log lines and the loading progress bar share the terminal.

mod menu;
mod output;

use crime_dash_cli_utils::IndicatifProgress;
use crime_dash_config::DashboardConfig;
use crime_dash_dataset::{load_dataset, paths};
use crime_dash_pipeline::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dash_cli_utils::init_logger();

    println!("Crime Dashboard");
    println!();

    let config = DashboardConfig::load()?;
    let data_paths = config.data_paths();
    let progress = IndicatifProgress::steps_bar(&multi, "Loading dataset", 3);
    let store = load_dataset(&data_paths, &progress)?;

    let out_dir = paths::output_dir();
    paths::ensure_dir(&out_dir)?;

    let mut session = Session::new(store, &config)?;
    menu::run(&mut session, &out_dir)
}
