#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use field::Scene;
use report::Report;
use settings::Cli;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod report;
mod settings;
mod smooth;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;

    let scene = Scene::new(&settings.radar, &settings.grid).context("invalid configuration")?;
    info!(
        alpha = scene.computed().edge_angle,
        f_k = scene.computed().edge_gain,
        "fence edge"
    );

    let start = Instant::now();
    let fields = scene.generate();
    info!(elapsed = ?start.elapsed(), "fields generated");

    let smoothed = smooth::gaussian_filter(&fields.power, settings.grid.smoothing_sigma);
    let report = Report::new(&scene, &smoothed);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    Ok(())
}
