//! Gaussian smoothing of a map before thresholding.
//!
//! The knife-edge ripple and the notches in the gain pattern make the raw
//! power map noisy at the cell level; contours drawn straight from it are
//! ragged. A small Gaussian blur evens that out.
//!
//! The filter is separable: one 1-D pass down the columns, then one along the
//! rows. The kernel extends to four standard deviations (rounded to the
//! nearest cell) and the map is mirrored at its borders, with the border cell
//! repeated (`d c b a | a b c d | d c b a`).

use ndarray::{Array2, Axis};

/// Kernel half-width, in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Smooths a map with a Gaussian kernel of standard deviation `sigma` cells.
///
/// A `sigma` of zero (or less) returns the map as is.
pub fn gaussian_filter(field: &Array2<f64>, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 || field.is_empty() {
        return field.clone();
    }

    let kernel = kernel(sigma);
    let columns = convolve_axis(field, &kernel, Axis(0));
    convolve_axis(&columns, &kernel, Axis(1))
}

/// Normalised Gaussian weights, from `-radius` to `+radius`.
fn kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f64 / sigma).powi(2)).exp())
        .collect();

    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Maps an index that may lie outside `0..len` back inside by mirroring.
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let index = index.rem_euclid(period);

    if index < len {
        index as usize
    } else {
        (period - 1 - index) as usize
    }
}

fn convolve_axis(input: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let mut output = Array2::zeros(input.dim());
    let radius = (kernel.len() / 2) as isize;

    for (lane, mut smoothed) in input.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let len = lane.len();
        for i in 0..len {
            smoothed[i] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * lane[reflect(i as isize + k as isize - radius, len)])
                .sum();
        }
    }

    output
}
