//! Command line and configuration file.

use anyhow::{Context, Result};
use clap::Parser;
use field::{GridSpec, RadarConfig, Scale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "fencemap",
    about = "Received radar power behind a clutter-shielding fence"
)]
pub struct Cli {
    /// JSON configuration file; anything it leaves out takes the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Angle between the antenna's main beam and the horizon (degrees)
    #[arg(long, allow_negative_numbers = true)]
    pub tilt: Option<f64>,

    /// Detection threshold in dBm; repeat for several, replaces the configured ones
    #[arg(long = "threshold", allow_negative_numbers = true)]
    pub thresholds: Vec<f64>,

    /// Standard deviation of the smoothing kernel, in cells (0 disables smoothing)
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Use decimetre steps for heights
    #[arg(long)]
    pub vertical_decimetres: bool,

    /// Use decimetre steps for distances
    #[arg(long)]
    pub horizontal_decimetres: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything needed for one run.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub radar: RadarConfig,
    pub grid: GridSpec,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing configuration in {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies command line overrides on top of the file (or the defaults).
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(tilt) = cli.tilt {
            self.radar.antenna_tilt = tilt;
        }

        if !cli.thresholds.is_empty() {
            self.grid.thresholds = cli.thresholds.clone();
        }

        if let Some(sigma) = cli.sigma {
            self.grid.smoothing_sigma = sigma;
        }

        if cli.vertical_decimetres {
            self.grid.vertical_scale = Scale::Decimetres;
        }

        if cli.horizontal_decimetres {
            self.grid.horizontal_scale = Scale::Decimetres;
        }

        self
    }
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Ok(settings.with_overrides(self))
    }
}

#[test]
fn empty_file_gives_defaults() {
    let settings = Settings::parse("{}").unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.radar, RadarConfig::default());
    assert_eq!(settings.grid.thresholds, vec![-74.0]);
}

#[test]
fn partial_file() {
    let settings = Settings::parse(
        r#"{
            "radar": { "fence_height": 2.5 },
            "grid": { "horizontal_resolution": 200, "horizontal_scale": "decimetres" }
        }"#,
    )
    .unwrap();

    assert_eq!(settings.radar.fence_height, 2.5);
    assert_eq!(settings.radar.antenna_height, 1.985);
    assert_eq!(settings.grid.horizontal_resolution, 200);
    assert_eq!(settings.grid.horizontal_scale, Scale::Decimetres);
    assert_eq!(settings.grid.shape(), (300, 2000));
}

#[test]
fn typos_are_errors() {
    assert!(Settings::parse(r#"{ "raddar": {} }"#).is_err());
    assert!(Settings::parse(r#"{ "grid": { "threshold": [-70] } }"#).is_err());
}

#[test]
fn command_line_overrides() {
    let cli = Cli::parse_from(&[
        "fencemap",
        "--tilt",
        "10",
        "--threshold",
        "-70",
        "--threshold=-80",
        "--sigma",
        "0",
        "--vertical-decimetres",
    ]);

    let settings = cli.settings().unwrap();
    assert_eq!(settings.radar.antenna_tilt, 10.0);
    assert_eq!(settings.grid.thresholds, vec![-70.0, -80.0]);
    assert_eq!(settings.grid.smoothing_sigma, 0.0);
    assert_eq!(settings.grid.vertical_scale, Scale::Decimetres);
    assert_eq!(settings.grid.horizontal_scale, Scale::Metres);
    assert!(!cli.json);
}

#[test]
fn file_and_command_line_combine() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("fencemap.json");
    fs::write(
        &path,
        r#"{
            "radar": { "antenna_tilt": 12.0, "fence_height": 2.5 },
            "grid": { "thresholds": [-70, -80], "vertical_scale": "decimetres" }
        }"#,
    )
    .unwrap();

    let cli = Cli::parse_from(&[
        "fencemap",
        "--config",
        path.to_str().unwrap(),
        "--tilt",
        "5",
    ]);

    let settings = cli.settings().unwrap();
    assert_eq!(settings.radar.antenna_tilt, 5.0);
    assert_eq!(settings.radar.fence_height, 2.5);
    assert_eq!(settings.radar.antenna_height, 1.985);
    assert_eq!(settings.grid.thresholds, vec![-70.0, -80.0]);
    assert_eq!(settings.grid.vertical_scale, Scale::Decimetres);
    assert_eq!(settings.grid.horizontal_scale, Scale::Metres);
}

#[test]
fn broken_file_names_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "radar": { "tilt": 5 } }"#).unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("parsing configuration in"));
}

#[test]
fn missing_file_is_reported() {
    let err = Settings::load(Path::new("/nonexistent/fencemap.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/fencemap.json"));
}
