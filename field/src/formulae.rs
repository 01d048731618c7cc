//! Utilities for the field generator.
//!
//! These are miscellaneous functions that are functionally pure but also
//! implement well-known algorithms and formulae. They might be reusable
//! elsewhere and/or they might benefit from optimisation or being replaced by
//! calls to more efficient or correct versions.

use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_2, PI};

/// Below this magnitude the series is used, above it the continued fraction.
const FRESNEL_SWITCH: f64 = 1.5;

/// Upper bound on series terms or continued fraction convergents.
const FRESNEL_MAX_ITERATIONS: usize = 100;

/// Floor used by the modified Lentz method to avoid dividing by zero.
const TINY: f64 = 1e-300;

/// Fresnel sine and cosine integrals, returned as `(S, C)`.
///
/// Uses the normalised convention:
///
/// ```text
/// S(x) = ∫₀ˣ sin(πt²/2) dt
/// C(x) = ∫₀ˣ cos(πt²/2) dt
/// ```
///
/// Both are odd functions and tend to ½ as _x_ grows. For small arguments the
/// power series is summed (alternating between the terms of _S_ and _C_), and
/// for larger arguments the complementary error function is evaluated as a
/// complex continued fraction with the modified Lentz method.
pub fn fresnel(x: f64) -> (f64, f64) {
    let ax = x.abs();

    let (s, c) = if ax < TINY.sqrt() {
        (0.0, ax)
    } else if ax <= FRESNEL_SWITCH {
        fresnel_series(ax)
    } else {
        fresnel_continued_fraction(ax)
    };

    if x < 0.0 {
        (-s, -c)
    } else {
        (s, c)
    }
}

fn fresnel_series(x: f64) -> (f64, f64) {
    let factor = FRAC_PI_2 * x * x;

    let mut sum_s = 0.0;
    let mut sum_c = x;
    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut term = x;
    let mut odd = true;
    let mut n = 3.0;

    for k in 1..=FRESNEL_MAX_ITERATIONS {
        term *= factor / k as f64;
        sum += sign * term / n;
        let test = sum.abs() * f64::EPSILON;

        // Terms alternate between S (odd k) and C (even k), and each pair
        // flips sign.
        if odd {
            sign = -sign;
            sum_s = sum;
            sum = sum_c;
        } else {
            sum_c = sum;
            sum = sum_s;
        }

        if term < test {
            break;
        }

        odd = !odd;
        n += 2.0;
    }

    (sum_s, sum_c)
}

fn fresnel_continued_fraction(x: f64) -> (f64, f64) {
    let pix2 = PI * x * x;

    let mut b = Complex64::new(1.0, -pix2);
    let mut c = Complex64::new(1.0 / TINY, 0.0);
    let mut d = b.inv();
    let mut h = d;
    let mut n = -1.0;

    for _ in 2..=FRESNEL_MAX_ITERATIONS {
        n += 2.0;
        let a = Complex64::new(-n * (n + 1.0), 0.0);
        b += 4.0;
        d = (a * d + b).inv();
        c = b + a / c;
        let del = c * d;
        h *= del;

        if (del.re - 1.0).abs() + del.im.abs() < f64::EPSILON {
            break;
        }
    }

    h *= Complex64::new(x, -x);
    let phase = Complex64::new((0.5 * pix2).cos(), (0.5 * pix2).sin());
    let cs = Complex64::new(0.5, 0.5) * (Complex64::new(1.0, 0.0) - phase * h);

    (cs.im, cs.re)
}

/// Knife-edge diffraction factor from the Fresnel integrals at `u`.
///
/// This is the relative intensity `½·((½ − S)² + (½ − C)²)`: ¼ on the shadow
/// boundary, tending to 1 well inside the lit region and to 0 deep in the
/// shadow, with the familiar ripples in between.
pub fn diffraction_factor(u: f64) -> f64 {
    let (s, c) = fresnel(u);
    0.5 * ((0.5 - s).powi(2) + (0.5 - c).powi(2))
}

/// Converts a linear value in watts (or W/m²) to the milli-decibel scale.
///
/// Only strictly positive values are converted. Zero and negative values are
/// returned untouched, which leaves them as a floor well above any real dBm
/// reading in the plotted map.
pub fn to_dbm(value: f64) -> f64 {
    if value > 0.0 {
        (value * 1000.0).log10() * 10.0
    } else {
        value
    }
}

/// Evaluates a polynomial with coefficients ordered from the highest power
/// down to the constant term.
pub fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, k| acc * x + k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fresnel_reference_values() {
        // (x, S(x), C(x))
        let table = [
            (0.5, 0.064_732_432_859_999_29, 0.492_344_225_871_446_3),
            (1.0, 0.438_259_147_390_354_8, 0.779_893_400_376_822_8),
            (1.5, 0.697_504_960_082_093_3, 0.445_261_176_039_821_8),
            (2.0, 0.343_415_678_363_698_2, 0.488_253_406_075_340_8),
            (3.0, 0.496_312_998_967_375, 0.605_720_789_297_685_6),
            (5.0, 0.499_191_381_917_116_9, 0.563_631_188_704_012_2),
            (10.0, 0.468_169_978_584_882_2, 0.499_898_694_205_515_7),
        ];

        for &(x, s, c) in &table {
            let (fs, fc) = fresnel(x);
            assert_relative_eq!(fs, s, max_relative = 1e-12);
            assert_relative_eq!(fc, c, max_relative = 1e-12);
        }
    }

    #[test]
    fn fresnel_is_odd() {
        for &x in &[0.2, 1.0, 1.49, 1.51, 4.2, 17.0] {
            let (s, c) = fresnel(x);
            let (ns, nc) = fresnel(-x);
            assert_eq!(ns, -s);
            assert_eq!(nc, -c);
        }
    }

    #[test]
    fn fresnel_at_zero() {
        assert_eq!(fresnel(0.0), (0.0, 0.0));
    }

    #[test]
    fn fresnel_is_continuous_across_method_switch() {
        let (s_lo, c_lo) = fresnel(FRESNEL_SWITCH - 1e-9);
        let (s_hi, c_hi) = fresnel(FRESNEL_SWITCH + 1e-9);
        assert_relative_eq!(s_lo, s_hi, epsilon = 1e-8);
        assert_relative_eq!(c_lo, c_hi, epsilon = 1e-8);
    }

    #[test]
    fn fresnel_tends_to_half() {
        let (s, c) = fresnel(1e4);
        assert_relative_eq!(s, 0.5, epsilon = 1e-4);
        assert_relative_eq!(c, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn diffraction_factor_landmarks() {
        // On the shadow boundary the field is half, so intensity is a quarter.
        assert_relative_eq!(diffraction_factor(0.0), 0.25);
        // Deep in the lit region the edge no longer matters.
        assert_relative_eq!(diffraction_factor(-1e4), 1.0, epsilon = 1e-3);
        // Deep in the shadow hardly anything gets through.
        assert!(diffraction_factor(50.0) < 1e-4);
    }

    #[test]
    fn dbm_converts_positive_values_once() {
        assert_relative_eq!(to_dbm(1.0), 30.0);
        assert_relative_eq!(to_dbm(0.001), 0.0, epsilon = 1e-12);
        assert_relative_eq!(to_dbm(1e-10), -70.0, epsilon = 1e-9);
    }

    #[test]
    fn dbm_leaves_non_positive_values_alone() {
        assert_eq!(to_dbm(0.0), 0.0);
        assert_eq!(to_dbm(-3.5), -3.5);
        assert_eq!(to_dbm(-0.0).to_bits(), (-0.0f64).to_bits());
    }

    #[test]
    fn polynomial_is_highest_power_first() {
        // 2x² − 3x + 1
        assert_eq!(polynomial(&[2.0, -3.0, 1.0], 0.0), 1.0);
        assert_eq!(polynomial(&[2.0, -3.0, 1.0], 2.0), 3.0);
        assert_eq!(polynomial(&[], 5.0), 0.0);
    }
}
