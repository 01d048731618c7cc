//! Radar installation and grid parameters.

use crate::error::ConfigError;
use std::f64::consts::PI;

/// Physical parameters of the radar, the fence, and the target.
///
/// Lengths are in metres, angles in degrees. The defaults describe the
/// installation the vertical gain pattern was measured on.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct RadarConfig {
    /// Angle between the antenna's main beam and the horizon.
    pub antenna_tilt: f64,

    /// Height of the antenna above ground.
    pub antenna_height: f64,

    /// Horizontal distance from the antenna to the fence.
    pub fence_distance: f64,

    /// Height of the fence edge above ground.
    pub fence_height: f64,

    /// Radar wavelength (m).
    pub wavelength: f64,

    /// Peak transmit power (W).
    pub peak_power: f64,

    /// Antenna gain (linear).
    pub antenna_gain: f64,

    /// Radar cross-section of the target (m²).
    pub cross_section: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            antenna_tilt: 15.0,
            antenna_height: 1.985,
            fence_distance: 6.0,
            fence_height: 2.2,
            wavelength: 0.031859,
            peak_power: 12000.0,
            antenna_gain: 1247.38,
            cross_section: 0.00127,
        }
    }
}

impl RadarConfig {
    /// Effective receive area of the antenna (m²): `G·λ²/4π`.
    pub fn effective_aperture(&self) -> f64 {
        self.antenna_gain * self.wavelength.powi(2) / (4.0 * PI)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("antenna tilt", self.antenna_tilt)?;
        non_negative("antenna height", self.antenna_height)?;
        positive("fence distance", self.fence_distance)?;
        non_negative("fence height", self.fence_height)?;
        positive("wavelength", self.wavelength)?;
        positive("peak power", self.peak_power)?;
        positive("antenna gain", self.antenna_gain)?;
        positive("cross section", self.cross_section)?;
        Ok(())
    }
}

/// Unit of one grid step along an axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Scale {
    Metres,
    Decimetres,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Metres
    }
}

impl Scale {
    /// Grid steps per metre.
    pub fn steps(self) -> usize {
        match self {
            Scale::Metres => 1,
            Scale::Decimetres => 10,
        }
    }

    /// Grid steps per metre, as a float for dividing indices.
    pub fn factor(self) -> f64 {
        self.steps() as f64
    }

    pub fn unit(self) -> &'static str {
        match self {
            Scale::Metres => "m",
            Scale::Decimetres => "dm",
        }
    }
}

/// Extent and resolution of the computed map, and display parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct GridSpec {
    /// Maximum height, in whole metres.
    pub vertical_resolution: usize,

    /// Maximum distance beyond the fence, in whole metres.
    pub horizontal_resolution: usize,

    pub vertical_scale: Scale,
    pub horizontal_scale: Scale,

    /// Minimum received power for a detection (dBm).
    pub thresholds: Vec<f64>,

    /// Standard deviation of the display smoothing kernel, in cells.
    pub smoothing_sigma: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            vertical_resolution: 300,
            horizontal_resolution: 1000,
            vertical_scale: Scale::Metres,
            horizontal_scale: Scale::Metres,
            thresholds: vec![-74.0],
            smoothing_sigma: 0.7,
        }
    }
}

impl GridSpec {
    /// Number of (rows, columns) of every field.
    ///
    /// Only meaningful for a grid that passed [`GridSpec::validate`].
    pub fn shape(&self) -> (usize, usize) {
        (
            self.vertical_resolution * self.vertical_scale.steps(),
            self.horizontal_resolution * self.horizontal_scale.steps(),
        )
    }

    fn checked_shape(&self) -> Option<(usize, usize)> {
        Some((
            self.vertical_resolution.checked_mul(self.vertical_scale.steps())?,
            self.horizontal_resolution.checked_mul(self.horizontal_scale.steps())?,
        ))
    }

    /// Horizontal distance beyond the fence of a stored column, in grid steps.
    pub fn distance_steps(&self, col: usize) -> usize {
        col + 1
    }

    /// Height above ground of a stored row, in grid steps. Row zero is the
    /// top of the map.
    pub fn height_steps(&self, row: usize) -> usize {
        let (rows, _) = self.shape();
        rows - 1 - row
    }

    /// Horizontal distance beyond the fence of a stored column (m).
    pub fn distance_at(&self, col: usize) -> f64 {
        self.distance_steps(col) as f64 / self.horizontal_scale.factor()
    }

    /// Height above ground of a stored row (m).
    pub fn height_at(&self, row: usize) -> f64 {
        self.height_steps(row) as f64 / self.vertical_scale.factor()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols) = self.checked_shape().ok_or(ConfigError::GridTooLarge {
            vertical_resolution: self.vertical_resolution,
            horizontal_resolution: self.horizontal_resolution,
        })?;

        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }

        if self.thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }

        for &threshold in &self.thresholds {
            finite("detection threshold", threshold)?;
        }

        non_negative("smoothing sigma", self.smoothing_sigma)?;
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        Err(ConfigError::Negative { name, value })
    } else {
        Ok(())
    }
}
