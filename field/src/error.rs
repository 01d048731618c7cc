use thiserror::Error;

/// Reasons a radar or grid configuration is refused.
///
/// Checks run in declaration order and stop at the first failure, so one
/// error may shadow another.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} may not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error(
        "grid of {vertical_resolution} by {horizontal_resolution} has more cells than can be indexed"
    )]
    GridTooLarge {
        vertical_resolution: usize,
        horizontal_resolution: usize,
    },

    #[error("grid has no cells ({rows} rows by {cols} columns)")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("at least one detection threshold is required")]
    NoThresholds,
}
