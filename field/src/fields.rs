//! Per-cell results and the grids they are stored in.

use crate::formulae::to_dbm;
use ndarray::Array2;

/// Everything computed for one point of the map.
///
/// Intensities are in W/m² and power in W until [`Sample::to_dbm`] is
/// applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    /// Knife-edge diffraction factor (linear).
    pub diffraction: f64, // <Bf>

    /// Intensity arriving over the fence edge.
    pub diffracted: f64, // <Ibe>

    /// Intensity along the direct path.
    pub direct: f64, // <Iad>

    /// Intensity of the ground path that cancels part of the direct one.
    pub ground: f64, // <Igr>

    /// Coherent sum of the three paths.
    pub combined: f64, // <Iges>

    /// Power received by the radar.
    pub power: f64, // <Pe>
}

impl Sample {
    /// Converts everything but the diffraction factor to dBm.
    ///
    /// Non-positive values are kept as they are; see [`to_dbm`].
    pub fn to_dbm(self) -> Self {
        Self {
            diffraction: self.diffraction,
            diffracted: to_dbm(self.diffracted),
            direct: to_dbm(self.direct),
            ground: to_dbm(self.ground),
            combined: to_dbm(self.combined),
            power: to_dbm(self.power),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.diffraction.is_finite()
            && self.diffracted.is_finite()
            && self.direct.is_finite()
            && self.ground.is_finite()
            && self.combined.is_finite()
            && self.power.is_finite()
    }
}

/// The full set of maps for one run.
///
/// All grids share one shape. Row zero is the top of the map (the greatest
/// height) and column zero the sampled distance closest to the fence.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    pub diffraction: Array2<f64>,
    pub diffracted: Array2<f64>,
    pub direct: Array2<f64>,
    pub ground: Array2<f64>,
    pub combined: Array2<f64>,
    pub power: Array2<f64>,
}

impl Fields {
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            diffraction: Array2::zeros(shape),
            diffracted: Array2::zeros(shape),
            direct: Array2::zeros(shape),
            ground: Array2::zeros(shape),
            combined: Array2::zeros(shape),
            power: Array2::zeros(shape),
        }
    }

    /// Assembles the grids from rows of samples ordered from the ground up.
    ///
    /// This is the order the generator produces them in: the first row holds
    /// height index zero, and within a row samples go outwards from the fence.
    pub(crate) fn from_rows(shape: (usize, usize), rows: Vec<Vec<Sample>>) -> Self {
        let mut fields = Self::zeros(shape);
        let top = shape.0.saturating_sub(1);

        for (iy, row) in rows.into_iter().enumerate() {
            for (col, sample) in row.into_iter().enumerate() {
                fields.store(top - iy, col, sample);
            }
        }

        fields
    }

    fn store(&mut self, row: usize, col: usize, sample: Sample) {
        let at = [row, col];
        self.diffraction[at] = sample.diffraction;
        self.diffracted[at] = sample.diffracted;
        self.direct[at] = sample.direct;
        self.ground[at] = sample.ground;
        self.combined[at] = sample.combined;
        self.power[at] = sample.power;
    }

    /// Number of (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        self.power.dim()
    }

    /// Reads back one stored cell.
    pub fn at(&self, row: usize, col: usize) -> Sample {
        let at = [row, col];
        Sample {
            diffraction: self.diffraction[at],
            diffracted: self.diffracted[at],
            direct: self.direct[at],
            ground: self.ground[at],
            combined: self.combined[at],
            power: self.power[at],
        }
    }
}
