//! Easing curves for animation progress.
//!
//! An easing function maps normalized progress (0.0-1.0) to an eased value
//! (0.0-1.0), shaping perceived animation speed. Counter animations default
//! to `ExpoOut`, which rises steeply at first and flattens into the target.

use serde::{Deserialize, Serialize};

/// Easing function definitions for animation curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Linear interpolation
    Linear,
    /// Quadratic ease-in
    EaseIn,
    /// Quadratic ease-out
    EaseOut,
    /// Quadratic ease-in-out
    EaseInOut,
    /// Cubic ease-in
    CubicIn,
    /// Cubic ease-out
    CubicOut,
    /// Cubic ease-in-out
    CubicInOut,
    /// Exponential ease-in
    ExpoIn,
    /// Exponential ease-out (steep rise, asymptotic flattening)
    #[default]
    ExpoOut,
    /// Exponential ease-in-out
    ExpoInOut,
}

impl Easing {
    /// Evaluate the easing function at time t (0.0-1.0).
    ///
    /// Input is clamped to [0.0, 1.0]. The exponential family returns its
    /// endpoint values exactly, so `ExpoOut.evaluate(1.0)` is `1.0` with no
    /// floating-point residue and a counter lands on its target precisely.
    #[must_use]
    pub fn evaluate(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let t1 = t - 1.0;
                t1 * t1 * t1 + 1.0
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0 * t - 2.0;
                    0.5 * t1 * t1 * t1 + 1.0
                }
            }
            Self::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f64.powf(10.0 * t - 10.0)
                }
            }
            Self::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Self::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_linear() {
        let f = Easing::Linear;
        assert!((f.evaluate(0.0)).abs() < f64::EPSILON);
        assert!((f.evaluate(0.5) - 0.5).abs() < f64::EPSILON);
        assert!((f.evaluate(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_ease_in() {
        let f = Easing::EaseIn;
        assert!((f.evaluate(0.0)).abs() < f64::EPSILON);
        assert!((f.evaluate(0.5) - 0.25).abs() < f64::EPSILON); // t^2
        assert!((f.evaluate(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_ease_out() {
        let f = Easing::EaseOut;
        assert!((f.evaluate(0.0)).abs() < f64::EPSILON);
        assert!((f.evaluate(1.0) - 1.0).abs() < f64::EPSILON);
        // ease-out should be faster at start
        assert!(f.evaluate(0.5) > 0.5);
    }

    #[test]
    fn test_easing_cubic_family() {
        assert!((Easing::CubicIn.evaluate(0.5) - 0.125).abs() < f64::EPSILON); // t^3
        assert!((Easing::CubicOut.evaluate(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((Easing::CubicInOut.evaluate(0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_expo_out_endpoints_exact() {
        // 1 - 2^0 is exactly zero, and the t = 1 branch returns the literal.
        assert_eq!(Easing::ExpoOut.evaluate(0.0), 0.0);
        assert_eq!(Easing::ExpoOut.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_easing_expo_out_curve() {
        let f = Easing::ExpoOut;
        // 1 - 2^(-5) at the midpoint
        assert!((f.evaluate(0.5) - 0.968_75).abs() < f64::EPSILON);
        // steep start: half the value in a tenth of the time
        assert!(f.evaluate(0.1) > 0.5);
    }

    #[test]
    fn test_easing_expo_in_out() {
        assert_eq!(Easing::ExpoIn.evaluate(0.0), 0.0);
        assert!((Easing::ExpoIn.evaluate(1.0) - 1.0).abs() < f64::EPSILON);
        assert_eq!(Easing::ExpoInOut.evaluate(0.0), 0.0);
        assert_eq!(Easing::ExpoInOut.evaluate(1.0), 1.0);
        assert!((Easing::ExpoInOut.evaluate(0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_clamp() {
        let f = Easing::ExpoOut;
        assert_eq!(f.evaluate(-0.5), 0.0);
        assert_eq!(f.evaluate(1.5), 1.0);
    }

    #[test]
    fn test_easing_monotonic() {
        let curves = [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::ExpoIn,
            Easing::ExpoOut,
            Easing::ExpoInOut,
        ];
        for curve in curves {
            let mut prev = curve.evaluate(0.0);
            for i in 1..=100 {
                let next = curve.evaluate(f64::from(i) / 100.0);
                assert!(
                    next >= prev,
                    "{curve:?} decreased between samples {} and {i}",
                    i - 1
                );
                prev = next;
            }
        }
    }

    #[test]
    fn test_easing_default_is_expo_out() {
        assert_eq!(Easing::default(), Easing::ExpoOut);
    }

    #[test]
    fn test_easing_serde_roundtrip() {
        let json = serde_json::to_string(&Easing::ExpoOut).unwrap();
        let parsed: Easing = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Easing::ExpoOut);
    }
}
