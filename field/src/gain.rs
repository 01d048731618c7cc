//! Vertical gain pattern of the radar antenna.
//!
//! The pattern was fitted from measurements of one particular antenna: it is
//! a ladder of sixth-degree polynomials in the decibel domain, separated by
//! one-degree-wide flat notches where the fits do not join up. Angles are
//! measured from the main beam direction, positive upwards.

use crate::formulae::polynomial;

/// Lower edge of the fitted domain, in degrees.
pub const MIN_ANGLE: f64 = -90.0;

/// Upper edge of the fitted domain, in degrees.
pub const MAX_ANGLE: f64 = 90.0;

/// Shape of the pattern over one band of angles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Profile {
    /// Polynomial in the angle, coefficients from the sixth power down.
    Polynomial([f64; 7]),

    /// Constant attenuation (dB).
    Flat(f64),
}

impl Profile {
    fn db(&self, angle: f64) -> f64 {
        match self {
            Profile::Polynomial(coefficients) => polynomial(coefficients, angle),
            Profile::Flat(db) => *db,
        }
    }
}

/// One rung of the ladder: applies to angles below `upper` (or equal to it
/// when `closed`) that were not claimed by an earlier band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub closed: bool,
    pub profile: Profile,
}

impl Band {
    const fn new(upper: f64, closed: bool, profile: Profile) -> Self {
        Self {
            upper,
            closed,
            profile,
        }
    }

    fn claims(&self, angle: f64) -> bool {
        angle < self.upper || (self.closed && angle == self.upper)
    }
}

/// Bands in ascending order. The first band starts at [`MIN_ANGLE`].
pub static BANDS: [Band; 11] = [
    // [-90, -66]
    Band::new(
        -66.0,
        true,
        Profile::Polynomial([
            -0.0000014949373086659,
            -0.00070852557198875,
            -0.139564445915408,
            -14.6269997026561,
            -860.348932178637,
            -26930.8173654556,
            -350531.287449198,
        ]),
    ),
    // (-66, -65)
    Band::new(-65.0, false, Profile::Flat(-25.0)),
    // [-65, -46]
    Band::new(
        -46.0,
        true,
        Profile::Polynomial([
            0.00000924361736032164,
            0.00317711838901613,
            0.452725277285858,
            34.2289384878583,
            1448.03189137727,
            32495.1484198473,
            302155.154934733,
        ]),
    ),
    // (-46, -45)
    Band::new(-45.0, false, Profile::Flat(-28.5)),
    // [-45, -6]
    Band::new(
        -6.0,
        true,
        Profile::Polynomial([
            0.00000023872326298364,
            0.0000323677929426722,
            0.00162989131166868,
            0.0378547726457397,
            0.410376348505567,
            2.40825420520235,
            5.54984371908995,
        ]),
    ),
    // (-6, -5)
    Band::new(-5.0, false, Profile::Flat(-0.3)),
    // [-5, 24]
    Band::new(
        24.0,
        true,
        Profile::Polynomial([
            0.00000032995287249996,
            -0.0000163823803811039,
            0.000265198637203808,
            -0.00142243569562971,
            -0.0225810237465976,
            0.00733935885191899,
            0.0917462794648984,
        ]),
    ),
    // (24, 25)
    Band::new(25.0, false, Profile::Flat(-12.0)),
    // [25, 48)
    Band::new(
        48.0,
        false,
        Profile::Polynomial([
            0.00000077622007460532,
            -0.000220951871694131,
            0.0239971036813745,
            -1.31399907413014,
            38.829659677977,
            -592.007132559122,
            3644.36331641867,
        ]),
    ),
    // [48, 49)
    Band::new(49.0, false, Profile::Flat(-45.0)),
    // [49, 90]
    Band::new(
        MAX_ANGLE,
        true,
        Profile::Polynomial([
            -0.0000000561726448663,
            0.0000249198038587816,
            -0.00464433823247045,
            0.465663117836564,
            -26.4723013262135,
            807.350584298887,
            -10311.7349777897,
        ]),
    ),
];

/// Whether the angle lies within the fitted domain.
///
/// Outside of it [`gain_db`] and [`gain`] clamp to the nearest edge.
pub fn covers(angle: f64) -> bool {
    angle >= MIN_ANGLE && angle <= MAX_ANGLE
}

/// The band an angle falls into, after clamping.
pub fn band(angle: f64) -> &'static Band {
    let angle = angle.max(MIN_ANGLE).min(MAX_ANGLE);
    BANDS
        .iter()
        .find(|band| band.claims(angle))
        .unwrap_or(&BANDS[BANDS.len() - 1])
}

/// Vertical gain at `angle` degrees off boresight, in dB.
pub fn gain_db(angle: f64) -> f64 {
    let clamped = angle.max(MIN_ANGLE).min(MAX_ANGLE);
    band(clamped).profile.db(clamped)
}

/// Vertical gain at `angle` degrees off boresight, as a linear factor.
pub fn gain(angle: f64) -> f64 {
    10f64.powf(gain_db(angle) / 10.0)
}
