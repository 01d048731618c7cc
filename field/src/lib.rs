//! Received radar power around a ground radar behind a clutter fence.
//!
//! A small ground radar looks out over a fence that is there to shield it
//! from ground clutter. The fence also shadows part of the space in front of
//! the radar, and the question this crate answers is: how much power comes
//! back from a small target, for every point of a vertical slice in front of
//! the installation?
//!
//! Three paths are considered for every point of the map:
//!
//!  - the **direct** path, weighted by the antenna's vertical gain pattern in
//!    the direction of the point;
//!
//!  - the path **diffracted** over the fence edge, modelled as a single knife
//!    edge and weighted by the gain towards that edge;
//!
//!  - a **ground** path of the same strength as the unobstructed edge ray,
//!    which cancels against the others in the coherent sum.
//!
//! The coherent sum is turned into received power with the radar equation,
//! and every intensity is expressed in dBm.
//!
//! Geometry uses a vertical plane with the origin at the foot of the fence,
//! distances counted positive away from the radar, heights above ground. The
//! antenna therefore sits at `(-fence_distance, antenna_height)`.
//!
//! All preliminary work is done when a [`Scene`] is created; computing a cell
//! only needs immutable access, so cells can be computed in any order and on
//! any thread. With the `parallel` feature, [`Scene::generate`] spreads rows
//! over a rayon pool.

#![forbid(unsafe_code)]

use geo::algorithm::euclidean_distance::EuclideanDistance;
use geo::Point;
use std::f64::consts::PI;
use tracing::{debug, info, warn};

pub use config::{GridSpec, RadarConfig, Scale};
pub use error::ConfigError;
pub use fields::{Fields, Sample};

use formulae::diffraction_factor;

mod config;
mod error;
mod fields;
pub mod formulae;
pub mod gain;

/// Columns (1-based distance index) below which near-unity diffraction
/// factors are snapped to exactly one.
///
/// Close to the fence the Fresnel ripple around full illumination shows up
/// as speckle in the map; this flattens it.
pub const NEAR_FIELD_COLUMNS: usize = 200;

/// Diffraction factors in this band count as full illumination near the fence.
const UNITY_BAND: (f64, f64) = (0.985, 1.015);

/// One radar installation prepared for computing a map.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene<'a> {
    radar: &'a RadarConfig,
    grid: &'a GridSpec,
    computed: Computed,
}

/// Values derived once from the configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Computed {
    /// Position of the antenna.
    pub antenna: Point<f64>,

    /// Position of the top of the fence.
    pub fence_edge: Point<f64>,

    /// Angle from the main beam to the fence edge, in degrees.
    pub edge_angle: f64, // <alpha>

    /// Vertical gain towards the fence edge (linear).
    pub edge_gain: f64, // <fK>

    /// Effective receive aperture (m²).
    pub aperture: f64, // <AEr>

    /// `Pt·Gt·σ/16π²`: the radar equation without range and pattern terms.
    pub radar_constant: f64,
}

impl<'a> Scene<'a> {
    /// Validates the configuration and prepares the fixed geometry.
    ///
    /// Errors early: the first invalid parameter found is returned, which may
    /// hide further ones.
    pub fn new(radar: &'a RadarConfig, grid: &'a GridSpec) -> Result<Self, ConfigError> {
        radar.validate()?;
        grid.validate()?;

        let antenna = Point::new(-radar.fence_distance, radar.antenna_height);
        let fence_edge = Point::new(0.0, radar.fence_height);

        let edge_angle = elevation(antenna, fence_edge) - radar.antenna_tilt;
        if !gain::covers(edge_angle) {
            warn!(
                angle = edge_angle,
                "fence edge is outside the fitted gain pattern, using the nearest edge of the pattern"
            );
        }

        let edge_gain = gain::gain(edge_angle);

        let computed = Computed {
            antenna,
            fence_edge,
            edge_angle,
            edge_gain,
            aperture: radar.effective_aperture(),
            radar_constant: radar.peak_power * radar.antenna_gain * radar.cross_section
                / (16.0 * PI.powi(2)),
        };

        debug!(
            alpha = edge_angle,
            f_k = edge_gain,
            aperture = computed.aperture,
            "prepared scene"
        );

        Ok(Self {
            radar,
            grid,
            computed,
        })
    }

    pub fn grid(&self) -> &GridSpec {
        self.grid
    }

    pub fn computed(&self) -> &Computed {
        &self.computed
    }

    /// Computes one cell in linear units.
    ///
    /// `iy` is the height index counted from the ground, `ix` the 1-based
    /// distance index counted from the fence (so the first column is one step
    /// beyond it, never on it).
    pub fn sample_linear(&self, iy: usize, ix: usize) -> Sample {
        let radar = self.radar;
        let c = &self.computed;

        let target = Point::new(
            ix as f64 / self.grid.horizontal_scale.factor(),
            iy as f64 / self.grid.vertical_scale.factor(),
        );

        // Knife edge: where the line of sight crosses the plane of the fence,
        // and by how much the edge sticks out above that point.
        let offset = radar.fence_distance * (target.y() - radar.antenna_height)
            / (target.x() + radar.fence_distance); // <d>
        let crossing = Point::new(0.0, radar.antenna_height + offset);
        let clearance = c.fence_edge.y() - crossing.y();

        let rho0 = c.antenna.euclidean_distance(&crossing);
        let r0 = crossing.euclidean_distance(&target);
        let u = clearance * (2.0 * (rho0 + r0) / (radar.wavelength * rho0 * r0)).sqrt();

        let mut diffraction = diffraction_factor(u);
        if ix < NEAR_FIELD_COLUMNS && diffraction >= UNITY_BAND.0 && diffraction <= UNITY_BAND.1 {
            diffraction = 1.0;
        }

        let range = c.antenna.euclidean_distance(&target);
        let spread = c.radar_constant / range.powi(4);

        let view_angle = elevation(c.antenna, target) - radar.antenna_tilt; // <phi>
        let direct_gain = if view_angle <= c.edge_angle {
            // At or below the fence edge the edge's own gain applies.
            c.edge_gain
        } else {
            gain::gain(view_angle)
        };

        let diffracted = diffraction.powi(2) * spread * c.edge_gain.powi(2);
        let direct = spread * direct_gain.powi(2);
        let ground = spread * c.edge_gain.powi(2);
        let combined = (direct.sqrt() + diffracted.sqrt() - ground.sqrt()).powi(2);

        Sample {
            diffraction,
            diffracted,
            direct,
            ground,
            combined,
            power: c.aperture * combined,
        }
    }

    /// Computes one cell as stored in the map (intensities in dBm).
    pub fn sample(&self, iy: usize, ix: usize) -> Sample {
        self.sample_linear(iy, ix).to_dbm()
    }

    /// Computes all cells at one height, outwards from the fence.
    pub fn row(&self, iy: usize) -> Vec<Sample> {
        let (_, cols) = self.grid.shape();
        (1..=cols).map(|ix| self.sample(iy, ix)).collect()
    }

    /// Computes the whole map, one row after the other.
    pub fn generate_sequential(&self) -> Fields {
        let shape = self.grid.shape();
        info!(rows = shape.0, cols = shape.1, "generating fields");

        let rows = (0..shape.0).map(|iy| self.row(iy)).collect();
        Fields::from_rows(shape, rows)
    }

    /// Computes the whole map, rows spread over the rayon pool.
    ///
    /// Every row is owned by one task, and the result is identical to
    /// [`Scene::generate_sequential`].
    #[cfg(feature = "parallel")]
    pub fn generate_parallel(&self) -> Fields {
        use rayon::prelude::*;

        let shape = self.grid.shape();
        info!(
            rows = shape.0,
            cols = shape.1,
            threads = rayon::current_num_threads(),
            "generating fields in parallel"
        );

        let rows = (0..shape.0).into_par_iter().map(|iy| self.row(iy)).collect();
        Fields::from_rows(shape, rows)
    }

    /// Computes the whole map.
    #[cfg(feature = "parallel")]
    pub fn generate(&self) -> Fields {
        self.generate_parallel()
    }

    /// Computes the whole map.
    #[cfg(not(feature = "parallel"))]
    pub fn generate(&self) -> Fields {
        self.generate_sequential()
    }
}

/// Angle of the line from `from` to `to` above the horizontal, in degrees.
fn elevation(from: Point<f64>, to: Point<f64>) -> f64 {
    ((to.y() - from.y()) / (to.x() - from.x())).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_grid() -> GridSpec {
        GridSpec {
            vertical_resolution: 12,
            horizontal_resolution: 40,
            ..GridSpec::default()
        }
    }

    #[test]
    fn default_edge_angle_and_gain() {
        let radar = RadarConfig::default();
        let grid = small_grid();
        let scene = Scene::new(&radar, &grid).unwrap();
        let c = scene.computed();

        assert_relative_eq!(c.edge_angle, -12.947_779_303_016_81, max_relative = 1e-12);
        assert_eq!(gain::band(c.edge_angle), &gain::BANDS[4]);
        assert_relative_eq!(c.edge_gain, 0.412_216, max_relative = 1e-6);
    }

    #[test]
    fn positions() {
        let radar = RadarConfig::default();
        let grid = small_grid();
        let scene = Scene::new(&radar, &grid).unwrap();

        assert_eq!(scene.computed().antenna, Point::new(-6.0, 1.985));
        assert_eq!(scene.computed().fence_edge, Point::new(0.0, 2.2));
    }

    #[test]
    fn invalid_configuration_is_refused() {
        let radar = RadarConfig {
            fence_distance: 0.0,
            ..RadarConfig::default()
        };
        let grid = small_grid();

        assert!(Scene::new(&radar, &grid).is_err());
    }

    #[test]
    fn elevation_angles() {
        let origin = Point::new(0.0, 0.0);
        assert_relative_eq!(elevation(origin, Point::new(1.0, 1.0)), 45.0);
        assert_relative_eq!(elevation(origin, Point::new(2.0, -2.0)), -45.0);
        assert_eq!(elevation(origin, Point::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn shadowed_cells_only_see_the_edge() {
        let radar = RadarConfig::default();
        let grid = small_grid();
        let scene = Scene::new(&radar, &grid).unwrap();

        // On the ground far out the view angle is below the fence edge, so the
        // direct and ground terms cancel and only the diffracted ray remains.
        let s = scene.sample_linear(0, 40);
        assert_eq!(s.direct, s.ground);
        assert_relative_eq!(s.combined, s.diffracted, max_relative = 1e-9);
    }

    #[test]
    fn near_unity_diffraction_snaps_close_to_the_fence() {
        let radar = RadarConfig::default();
        let grid = GridSpec::default();
        let scene = Scene::new(&radar, &grid).unwrap();

        assert_eq!(scene.sample_linear(3, 5).diffraction, 1.0);
        assert_eq!(scene.sample_linear(6, 2).diffraction, 1.0);

        // Same band, but too far out to be snapped.
        let far = scene.sample_linear(18, 206).diffraction;
        assert!(far > UNITY_BAND.0 && far < UNITY_BAND.1);
        assert_ne!(far, 1.0);
    }

    #[test]
    fn stored_sample_is_the_dbm_of_the_linear_one() {
        let radar = RadarConfig::default();
        let grid = small_grid();
        let scene = Scene::new(&radar, &grid).unwrap();

        for &(iy, ix) in &[(0, 1), (2, 10), (5, 33), (11, 40)] {
            let linear = scene.sample_linear(iy, ix);
            let stored = scene.sample(iy, ix);

            assert_eq!(stored.diffraction, linear.diffraction);
            for &(raw, db) in &[
                (linear.diffracted, stored.diffracted),
                (linear.direct, stored.direct),
                (linear.ground, stored.ground),
                (linear.combined, stored.combined),
                (linear.power, stored.power),
            ] {
                if raw > 0.0 {
                    assert_relative_eq!(db, 10.0 * (raw * 1000.0).log10());
                } else {
                    assert_eq!(db, raw);
                }
            }
        }
    }

    #[test]
    fn row_length() {
        let radar = RadarConfig::default();
        let grid = small_grid();
        let scene = Scene::new(&radar, &grid).unwrap();

        let row = scene.row(4);
        assert_eq!(row.len(), 40);
        assert_eq!(row[0], scene.sample(4, 1));
        assert_eq!(row[39], scene.sample(4, 40));
    }
}
