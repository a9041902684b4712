//! Easing curves.
//!
//! Every curve maps normalized progress `t` in `[0, 1]` onto `[0, 1]`, is
//! monotonic, and hits both endpoints exactly. Inputs outside `[0, 1]` are
//! clamped, so `ease(0) == 0` and `ease(1) == 1` hold bit-for-bit even for
//! curves whose closed form rounds (sine, exponential).

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Lower bound of the adaptive ease-in-out exponent.
pub const ADAPTIVE_MIN_EXPONENT: f64 = 2.0;
/// Upper bound of the adaptive ease-in-out exponent.
pub const ADAPTIVE_MAX_EXPONENT: f64 = 6.0;

/// log10 altitude range (meters) the adaptive curve responds to: 100 m .. 10 000 km.
const ADAPTIVE_LOG_ALT_LOW: f64 = 2.0;
const ADAPTIVE_LOG_ALT_HIGH: f64 = 7.0;

/// Named easing curves.
///
/// Discriminants are the stable integer tags used by project files; see
/// [`Easing::to_tag`] and [`Easing::from_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Easing {
    Linear = 0,
    #[default]
    EaseInOutQuad = 1,
    EaseInQuad = 2,
    EaseOutQuad = 3,
    EaseInOutCubic = 4,
    EaseInOutQuint = 5,
    EaseInCubic = 6,
    EaseOutCubic = 7,
    EaseInQuart = 8,
    EaseOutQuart = 9,
    EaseInOutQuart = 10,
    EaseInQuint = 11,
    EaseOutQuint = 12,
    EaseInSine = 13,
    EaseOutSine = 14,
    EaseInOutSine = 15,
    EaseInExpo = 16,
    EaseOutExpo = 17,
    EaseInOutExpo = 18,
    /// Altitude-aware ease-in-out; see [`adaptive_ease_in_out`].
    Adaptive = 19,
}

impl Easing {
    pub const ALL: [Easing; 20] = [
        Easing::Linear,
        Easing::EaseInOutQuad,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutCubic,
        Easing::EaseInOutQuint,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::Adaptive,
    ];

    pub fn to_tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Evaluates the curve at `t`.
    ///
    /// Without altitude context, `Adaptive` uses the neutral exponent (a
    /// quartic ease-in-out). Use [`adaptive_ease_in_out`] when altitudes are known.
    pub fn ease(self, t: f64) -> f64 {
        let f: fn(f64) -> f64 = match self {
            Easing::Linear => linear,
            Easing::EaseInQuad => ease_in_quad,
            Easing::EaseOutQuad => ease_out_quad,
            Easing::EaseInOutQuad => ease_in_out_quad,
            Easing::EaseInCubic => ease_in_cubic,
            Easing::EaseOutCubic => ease_out_cubic,
            Easing::EaseInOutCubic => ease_in_out_cubic,
            Easing::EaseInQuart => ease_in_quart,
            Easing::EaseOutQuart => ease_out_quart,
            Easing::EaseInOutQuart => ease_in_out_quart,
            Easing::EaseInQuint => ease_in_quint,
            Easing::EaseOutQuint => ease_out_quint,
            Easing::EaseInOutQuint => ease_in_out_quint,
            Easing::EaseInSine => ease_in_sine,
            Easing::EaseOutSine => ease_out_sine,
            Easing::EaseInOutSine => ease_in_out_sine,
            Easing::EaseInExpo => ease_in_expo,
            Easing::EaseOutExpo => ease_out_expo,
            Easing::EaseInOutExpo => ease_in_out_expo,
            Easing::Adaptive => {
                return power_ease_in_out(t, 0.5 * (ADAPTIVE_MIN_EXPONENT + ADAPTIVE_MAX_EXPONENT));
            }
        };
        bounded(t, f)
    }
}

#[inline]
fn bounded(t: f64, f: fn(f64) -> f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        f(t)
    }
}

pub fn linear(t: f64) -> f64 {
    t
}

pub fn ease_in_quad(t: f64) -> f64 {
    t * t
}

pub fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn ease_in_cubic(t: f64) -> f64 {
    t * t * t
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let u = t - 1.0;
    u * u * u + 1.0
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        (t - 1.0) * u * u + 1.0
    }
}

pub fn ease_in_quart(t: f64) -> f64 {
    t.powi(4)
}

pub fn ease_out_quart(t: f64) -> f64 {
    1.0 - (t - 1.0).powi(4)
}

pub fn ease_in_out_quart(t: f64) -> f64 {
    if t < 0.5 {
        8.0 * t.powi(4)
    } else {
        1.0 - 8.0 * (t - 1.0).powi(4)
    }
}

pub fn ease_in_quint(t: f64) -> f64 {
    t.powi(5)
}

pub fn ease_out_quint(t: f64) -> f64 {
    1.0 + (t - 1.0).powi(5)
}

pub fn ease_in_out_quint(t: f64) -> f64 {
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        1.0 + 16.0 * (t - 1.0).powi(5)
    }
}

pub fn ease_in_sine(t: f64) -> f64 {
    1.0 - (t * FRAC_PI_2).cos()
}

pub fn ease_out_sine(t: f64) -> f64 {
    (t * FRAC_PI_2).sin()
}

pub fn ease_in_out_sine(t: f64) -> f64 {
    -((PI * t).cos() - 1.0) * 0.5
}

pub fn ease_in_expo(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * (t - 1.0))
    }
}

pub fn ease_out_expo(t: f64) -> f64 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

pub fn ease_in_out_expo(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else if t < 0.5 {
        2f64.powf(20.0 * t - 10.0) * 0.5
    } else {
        (2.0 - 2f64.powf(-20.0 * t + 10.0)) * 0.5
    }
}

/// Hermite smoothstep `3t^2 - 2t^3` on `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Generalized ease-in-out with exponent `p` (2 = quadratic, 4 = quartic, ...).
pub fn power_ease_in_out(t: f64, p: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else if t < 0.5 {
        2f64.powf(p - 1.0) * t.powf(p)
    } else {
        1.0 - (2.0 - 2.0 * t).powf(p) * 0.5
    }
}

/// Maps the lower of two camera altitudes to `[0, 1]`: 1 near the ground, 0 from orbit.
pub fn altitude_factor(from_alt_m: f64, to_alt_m: f64) -> f64 {
    let lowest = from_alt_m.min(to_alt_m).max(1.0);
    let log_alt = lowest.log10().clamp(ADAPTIVE_LOG_ALT_LOW, ADAPTIVE_LOG_ALT_HIGH);
    1.0 - (log_alt - ADAPTIVE_LOG_ALT_LOW) / (ADAPTIVE_LOG_ALT_HIGH - ADAPTIVE_LOG_ALT_LOW)
}

/// Ease-in-out exponent for a smoothness setting and a pair of altitudes.
///
/// Low altitude and high smoothness both push the exponent toward
/// [`ADAPTIVE_MAX_EXPONENT`], giving a longer, gentler deceleration.
///
/// The exponent is continuous in `[2, 6]` rather than snapped to even
/// integers, so small altitude changes never make the curve jump.
/// [`power_ease_in_out`] mirrors the ease-in half, which keeps odd and
/// fractional exponents symmetric about the midpoint.
pub fn adaptive_exponent(smoothness: f64, from_alt_m: f64, to_alt_m: f64) -> f64 {
    let smoothness = if smoothness.is_nan() { 0.5 } else { smoothness.clamp(0.0, 1.0) };
    let combined = 0.5 * smoothness + 0.5 * altitude_factor(from_alt_m, to_alt_m);
    ADAPTIVE_MIN_EXPONENT + (ADAPTIVE_MAX_EXPONENT - ADAPTIVE_MIN_EXPONENT) * combined
}

/// Altitude-aware ease-in-out.
pub fn adaptive_ease_in_out(t: f64, smoothness: f64, from_alt_m: f64, to_alt_m: f64) -> f64 {
    power_ease_in_out(t, adaptive_exponent(smoothness, from_alt_m, to_alt_m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn every_curve_hits_endpoints_exactly() {
        for easing in Easing::ALL {
            assert_eq!(easing.ease(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.ease(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn every_curve_is_monotonic() {
        for easing in Easing::ALL {
            let mut prev = easing.ease(0.0);
            for i in 1..=200 {
                let v = easing.ease(i as f64 / 200.0);
                assert!(v + 1e-12 >= prev, "{easing:?} decreased at step {i}");
                assert!((0.0..=1.0).contains(&v), "{easing:?} left [0,1]: {v}");
                prev = v;
            }
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Easing::EaseInCubic.ease(-0.5), 0.0);
        assert_eq!(Easing::EaseOutExpo.ease(3.0), 1.0);
    }

    #[test]
    fn in_out_curves_pass_through_midpoint() {
        for easing in [
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutQuart,
            Easing::EaseInOutQuint,
            Easing::EaseInOutSine,
            Easing::EaseInOutExpo,
        ] {
            assert_close(easing.ease(0.5), 0.5, 1e-12);
        }
    }

    #[test]
    fn tags_round_trip() {
        for easing in Easing::ALL {
            assert_eq!(Easing::from_tag(easing.to_tag()), Some(easing));
        }
        assert_eq!(Easing::from_tag(200), None);
        assert_eq!(Easing::default().to_tag(), 1);
    }

    #[test]
    fn adaptive_exponent_is_softer_near_ground() {
        let low = adaptive_exponent(0.5, 200.0, 500.0);
        let high = adaptive_exponent(0.5, 5_000_000.0, 8_000_000.0);
        assert!(low > high, "low={low} high={high}");
        assert!((ADAPTIVE_MIN_EXPONENT..=ADAPTIVE_MAX_EXPONENT).contains(&low));
        assert!((ADAPTIVE_MIN_EXPONENT..=ADAPTIVE_MAX_EXPONENT).contains(&high));
    }

    #[test]
    fn adaptive_exponent_bounds() {
        assert_close(adaptive_exponent(1.0, 1.0, 1.0), ADAPTIVE_MAX_EXPONENT, 1e-12);
        assert_close(adaptive_exponent(0.0, 1e9, 1e9), ADAPTIVE_MIN_EXPONENT, 1e-12);
        // Out-of-range smoothness and non-positive altitude are clamped.
        assert_close(adaptive_exponent(7.0, -10.0, 0.0), ADAPTIVE_MAX_EXPONENT, 1e-12);
    }

    #[test]
    fn fractional_exponent_is_symmetric_and_monotonic() {
        let exponent = adaptive_exponent(0.37, 2_500.0, 40_000.0);
        assert!(exponent.fract() != 0.0, "exponent {exponent}");
        let mut prev = 0.0;
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let v = power_ease_in_out(t, exponent);
            assert_close(v + power_ease_in_out(1.0 - t, exponent), 1.0, 1e-12);
            assert!(v >= prev, "not monotonic at t={t}");
            prev = v;
        }
    }

    #[test]
    fn adaptive_curve_endpoints_and_midpoint() {
        for (s, a, b) in [(0.0, 100.0, 1e6), (1.0, 10.0, 20.0), (0.3, 1e7, 2e7)] {
            assert_eq!(adaptive_ease_in_out(0.0, s, a, b), 0.0);
            assert_eq!(adaptive_ease_in_out(1.0, s, a, b), 1.0);
            assert_close(adaptive_ease_in_out(0.5, s, a, b), 0.5, 1e-12);
        }
    }

    #[test]
    fn power_ease_matches_named_curves() {
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert_close(power_ease_in_out(t, 2.0), ease_in_out_quad(t), 1e-12);
            assert_close(power_ease_in_out(t, 3.0), ease_in_out_cubic(t), 1e-12);
        }
    }

    #[test]
    fn smoothstep_clamps() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert_close(smoothstep(0.5), 0.5, 1e-12);
    }
}
