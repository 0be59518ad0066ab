#![forbid(unsafe_code)]

//! Rubber-band resistance for drags past a boundary.
//!
//! Inside `[min, max]` the value passes through unchanged. Past a bound the
//! overshoot is compressed along
//!
//!   f(x) = bound + band × (1 − 1 / (overshoot / band + 1))
//!
//! which has slope 1 at the bound and approaches `bound + band`
//! asymptotically.
//!
//! # Invariants
//!
//! 1. Monotonic non-decreasing in `value`.
//! 2. For `value > max`: `max <= f(value) < max + band`.
//! 3. For `value < min`: `min - band < f(value) <= min`.
//! 4. `max = f64::INFINITY` (or `min = -INFINITY`) leaves that side
//!    unbounded.
//!
//! # Failure Modes
//!
//! - `band <= 0` (or non-finite): degenerates to a hard clamp.
//! - `min > max`: treated as `min == max == min`.
//! - Overshoot large enough that the curve rounds onto `bound ± band`: the
//!   result is pulled back to the adjacent representable value.
//! - `band` too small to move `bound` at all in `f64`: the bound itself.

/// Compress `value` toward `[min, max]` with the given band length.
#[must_use]
pub fn rubber_band(value: f64, min: f64, max: f64, band_length: f64) -> f64 {
    let max = max.max(min);
    let hard = !(band_length.is_finite() && band_length > 0.0);

    if value > max {
        if hard {
            return max;
        }
        let limit = (max + band_length).next_down().max(max);
        (max + compress(value - max, band_length)).min(limit)
    } else if value < min {
        if hard {
            return min;
        }
        let limit = (min - band_length).next_up().min(min);
        (min - compress(min - value, band_length)).max(limit)
    } else {
        value
    }
}

#[inline]
fn compress(overshoot: f64, band: f64) -> f64 {
    if overshoot.is_infinite() {
        // Limit of the curve; never actually reached by finite input.
        return band * (1.0 - f64::EPSILON);
    }
    band * (1.0 - 1.0 / (overshoot / band + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_range_is_identity() {
        assert_eq!(rubber_band(5.0, 0.0, 10.0, 20.0), 5.0);
        assert_eq!(rubber_band(0.0, 0.0, 10.0, 20.0), 0.0);
        assert_eq!(rubber_band(10.0, 0.0, 10.0, 20.0), 10.0);
    }

    #[test]
    fn above_max_is_compressed() {
        let v = rubber_band(30.0, 0.0, 10.0, 20.0);
        // overshoot 20 → 20 * (1 - 1/2) = 10
        assert!((v - 20.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn below_min_is_compressed() {
        let v = rubber_band(-50.0, 0.0, f64::INFINITY, 50.0);
        // overshoot 50 → 50 * (1 - 1/2) = 25
        assert!((v + 25.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn one_sided_upper_unbounded() {
        assert_eq!(rubber_band(1e9, 0.0, f64::INFINITY, 50.0), 1e9);
    }

    #[test]
    fn approaches_but_never_reaches_band() {
        for overshoot in [1.0, 10.0, 1e3, 1e6, 1e12] {
            let v = rubber_band(100.0 + overshoot, 0.0, 100.0, 20.0);
            assert!(v >= 100.0 && v < 120.0, "overshoot {overshoot} gave {v}");
        }
    }

    #[test]
    fn extreme_overshoot_stays_inside_band() {
        let up = rubber_band(770.0 + 1e16, 770.0, 770.0, 20.0);
        assert!(up > 770.0 && up < 790.0, "got {up}");

        let down = rubber_band(770.0 - 1e16, 770.0, 770.0, 20.0);
        assert!(down < 770.0 && down > 750.0, "got {down}");

        assert!(rubber_band(f64::MAX, 0.0, 100.0, 20.0) < 120.0);
        assert!(rubber_band(f64::MIN, 0.0, 100.0, 20.0) > -20.0);
    }

    #[test]
    fn two_sided_point_range() {
        let up = rubber_band(800.0, 770.0, 770.0, 20.0);
        let down = rubber_band(740.0, 770.0, 770.0, 20.0);
        assert!(up > 770.0 && up < 790.0);
        assert!(down < 770.0 && down > 750.0);
    }

    #[test]
    fn slope_near_bound_is_one() {
        let v = rubber_band(10.001, 0.0, 10.0, 20.0);
        assert!((v - 10.001).abs() < 1e-6);
    }

    #[test]
    fn zero_band_clamps() {
        assert_eq!(rubber_band(30.0, 0.0, 10.0, 0.0), 10.0);
        assert_eq!(rubber_band(-30.0, 0.0, 10.0, -1.0), 0.0);
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        assert_eq!(rubber_band(5.0, 5.0, 1.0, 10.0), 5.0);
    }
}
