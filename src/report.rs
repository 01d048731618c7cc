//! Detection coverage: where the smoothed power map clears a threshold.
//!
//! This is the information the threshold isoline of a contour plot carries,
//! in numbers: for every height, how far out a target is still detected.
//! Like the axes of such a plot, the per-height table counts grid steps of
//! each axis; the overall maximum range is given in metres.

use field::{GridSpec, Scale, Scene};
use ndarray::Array2;
use serde::Serialize;
use std::fmt;

pub fn distance_label(scale: Scale) -> String {
    format!("Horizontal distance [{}]", scale.unit())
}

pub fn height_label(scale: Scale) -> String {
    format!("Height above ground [{}]", scale.unit())
}

/// Furthest detection at one height, in grid steps of each axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Extent {
    /// Height above ground.
    pub height: usize,

    /// Furthest distance beyond the fence with enough power, if any.
    pub range: Option<usize>,
}

/// Detection coverage for one threshold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Coverage {
    /// Minimum received power (dBm).
    pub threshold: f64,

    /// Furthest detection at any height (m).
    pub max_range: Option<f64>,

    /// Share of the map's cells at or above the threshold.
    pub detected_fraction: f64,

    /// One entry per map row, top of the map first.
    pub extents: Vec<Extent>,
}

impl Coverage {
    pub fn measure(power: &Array2<f64>, grid: &GridSpec, threshold: f64) -> Self {
        let mut detected = 0;
        let mut furthest_anywhere: Option<usize> = None;

        let extents: Vec<Extent> = power
            .outer_iter()
            .enumerate()
            .map(|(row, values)| {
                let mut furthest = None;
                for (col, &value) in values.iter().enumerate() {
                    if value >= threshold {
                        detected += 1;
                        furthest = Some(col);
                    }
                }

                if let Some(col) = furthest {
                    furthest_anywhere = Some(furthest_anywhere.map_or(col, |max| max.max(col)));
                }

                Extent {
                    height: grid.height_steps(row),
                    range: furthest.map(|col| grid.distance_steps(col)),
                }
            })
            .collect();

        let max_range = furthest_anywhere.map(|col| grid.distance_at(col));

        let cells = power.len();
        let detected_fraction = if cells == 0 {
            0.0
        } else {
            detected as f64 / cells as f64
        };

        Self {
            threshold,
            max_range,
            detected_fraction,
            extents,
        }
    }
}

/// Summary of one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Angle from the main beam to the fence edge (degrees).
    pub edge_angle: f64,

    /// Vertical gain towards the fence edge (linear).
    pub edge_gain: f64,

    /// Effective receive aperture (m²).
    pub aperture: f64,

    /// Strongest received power anywhere on the smoothed map (dBm).
    pub peak_power: f64,

    pub distance_label: String,
    pub height_label: String,
    pub coverage: Vec<Coverage>,
}

impl Report {
    pub fn new(scene: &Scene, smoothed_power: &Array2<f64>) -> Self {
        let grid = scene.grid();
        let computed = scene.computed();

        Self {
            edge_angle: computed.edge_angle,
            edge_gain: computed.edge_gain,
            aperture: computed.aperture,
            peak_power: smoothed_power.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            distance_label: distance_label(grid.horizontal_scale),
            height_label: height_label(grid.vertical_scale),
            coverage: grid
                .thresholds
                .iter()
                .map(|&threshold| Coverage::measure(smoothed_power, grid, threshold))
                .collect(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "fence edge angle  {:>10.4} °", self.edge_angle)?;
        writeln!(f, "fence edge gain   {:>10.6}", self.edge_gain)?;
        writeln!(f, "receive aperture  {:>10.6} m²", self.aperture)?;
        writeln!(f, "peak power        {:>10.2} dBm", self.peak_power)?;

        for coverage in &self.coverage {
            writeln!(f)?;
            write!(f, "threshold {} dBm: ", coverage.threshold)?;
            match coverage.max_range {
                Some(range) => write!(f, "detected out to {} m", range)?,
                None => write!(f, "nothing detected")?,
            }
            writeln!(f, ", {:.1}% of the map", coverage.detected_fraction * 100.0)?;

            writeln!(f, "{:>28} | {}", self.height_label, self.distance_label)?;
            for extent in &coverage.extents {
                match extent.range {
                    Some(range) => writeln!(f, "{:>28} | {}", extent.height, range)?,
                    None => writeln!(f, "{:>28} | -", extent.height)?,
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field::RadarConfig;
    use ndarray::array;

    fn grid(rows: usize, cols: usize, horizontal_scale: Scale) -> GridSpec {
        GridSpec {
            vertical_resolution: rows,
            horizontal_resolution: cols,
            horizontal_scale,
            ..GridSpec::default()
        }
    }

    #[test]
    fn labels() {
        assert_eq!(distance_label(Scale::Metres), "Horizontal distance [m]");
        assert_eq!(height_label(Scale::Decimetres), "Height above ground [dm]");
    }

    #[test]
    fn furthest_cell_per_row() {
        let grid = grid(3, 4, Scale::Metres);
        let power = array![
            [-90.0, -90.0, -90.0, -90.0],
            [-60.0, -80.0, -70.0, -75.0],
            [-50.0, -60.0, -74.0, -80.0],
        ];

        let coverage = Coverage::measure(&power, &grid, -74.0);
        assert_eq!(
            coverage.extents,
            vec![
                Extent {
                    height: 2,
                    range: None
                },
                Extent {
                    height: 1,
                    range: Some(3)
                },
                Extent {
                    height: 0,
                    range: Some(3)
                },
            ]
        );
        assert_eq!(coverage.max_range, Some(3.0));
        assert_eq!(coverage.detected_fraction, 5.0 / 12.0);
    }

    #[test]
    fn decimetre_distances() {
        let grid = grid(1, 1, Scale::Decimetres);
        let mut power = Array2::from_elem((1, 10), -100.0);
        power[[0, 6]] = -10.0;

        let coverage = Coverage::measure(&power, &grid, -74.0);
        assert_eq!(coverage.max_range, Some(0.7));
        assert_eq!(coverage.extents[0].range, Some(7));
    }

    #[test]
    fn decimetre_table_counts_decimetres() {
        let radar = RadarConfig::default();
        let grid = GridSpec {
            vertical_resolution: 1,
            horizontal_resolution: 1,
            vertical_scale: Scale::Decimetres,
            horizontal_scale: Scale::Decimetres,
            ..GridSpec::default()
        };
        let scene = Scene::new(&radar, &grid).unwrap();
        let power = Array2::from_elem((10, 10), -10.0);

        let report = Report::new(&scene, &power);
        let extents = &report.coverage[0].extents;
        assert_eq!(extents[0], Extent { height: 9, range: Some(10) });
        assert_eq!(extents[9], Extent { height: 0, range: Some(10) });
        assert_eq!(report.coverage[0].max_range, Some(1.0));

        let text = report.to_string();
        assert!(text.contains("detected out to 1 m"));

        let mut lines = text.lines().skip_while(|line| !line.contains('|'));
        assert_eq!(
            lines.next().map(str::trim),
            Some("Height above ground [dm] | Horizontal distance [dm]")
        );
        assert_eq!(lines.next().map(str::trim), Some("9 | 10"));
        assert_eq!(lines.last().map(str::trim), Some("0 | 10"));
    }

    #[test]
    fn nothing_detected() {
        let grid = grid(2, 2, Scale::Metres);
        let power = Array2::from_elem((2, 2), -120.0);

        let coverage = Coverage::measure(&power, &grid, -74.0);
        assert_eq!(coverage.max_range, None);
        assert_eq!(coverage.detected_fraction, 0.0);
        assert!(coverage.extents.iter().all(|extent| extent.range.is_none()));
    }

    #[test]
    fn report_has_one_coverage_per_threshold() {
        let radar = RadarConfig::default();
        let grid = GridSpec {
            vertical_resolution: 4,
            horizontal_resolution: 20,
            thresholds: vec![-60.0, -74.0, -90.0],
            ..GridSpec::default()
        };
        let scene = Scene::new(&radar, &grid).unwrap();
        let fields = scene.generate();

        let report = Report::new(&scene, &fields.power);
        assert_eq!(report.coverage.len(), 3);
        assert_eq!(report.coverage[1].threshold, -74.0);
        assert!(report.peak_power.is_finite());

        // Lower thresholds can only detect more.
        assert!(report.coverage[0].detected_fraction <= report.coverage[1].detected_fraction);
        assert!(report.coverage[1].detected_fraction <= report.coverage[2].detected_fraction);

        let text = report.to_string();
        assert!(text.contains("threshold -74 dBm"));
        assert!(text.contains("Height above ground [m]"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["coverage"][2]["threshold"], -90.0);
    }
}
