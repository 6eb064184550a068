//! Q-format fixed-point arithmetic for the OpenPlot control core.
//!
//! Every quantity in the control core is a signed integer interpreted as
//! `value / 2^q` for a quantity-specific exponent `q`. The exponents are
//! named constants here so that conversions between formats are always an
//! explicit, visible shift:
//!
//! - [`POSITION_Q`]: measured positions and position references, Q16 degrees
//! - [`VELOCITY_Q`]: calibrated angular velocity, Q16 degrees/second
//! - [`OUTPUT_Q`]: actuator output scaling exponent
//!
//! # Overflow discipline
//!
//! The legacy implementation silently truncated any accumulator overflow.
//! Here every operation widens to `i64` internally, saturates to the `i32`
//! range on the way out, and reports whether it clipped via [`SatValue`].
//! Callers decide whether a clip is survivable (count it and continue with
//! the saturated value) or fatal.
//!
//! # RT Safety
//!
//! All functions are pure integer arithmetic:
//! - No heap allocations
//! - O(1) time complexity
//! - No syscalls or I/O

pub mod ops;

pub use ops::{add_sat, mul_shr, rescale, saturate, shl_sat, sub_sat, SatValue};

/// Fractional bits for position and position-reference values (Q16 degrees).
pub const POSITION_Q: u32 = 16;

/// Fractional bits for calibrated velocity values (Q16 degrees/second).
pub const VELOCITY_Q: u32 = 16;

/// Fractional bits for actuator output scaling (the legacy `Q_VALUE`).
pub const OUTPUT_Q: u32 = 8;

/// Convert a fixed-point value to floating-point units.
///
/// Diagnostic/test path only; the control core never computes in floats.
#[inline]
#[must_use]
pub fn to_float(value: i32, q: u32) -> f64 {
    f64::from(value) / f64::from(1u32 << q)
}

/// Convert floating-point units to a fixed-point value, rounding to nearest.
///
/// Diagnostic/test path only. Out-of-range inputs clamp to the `i32` range.
#[inline]
#[must_use]
pub fn from_float(units: f64, q: u32) -> i32 {
    let scaled = (units * f64::from(1u32 << q)).round();
    if scaled >= f64::from(i32::MAX) {
        i32::MAX
    } else if scaled <= f64::from(i32::MIN) {
        i32::MIN
    } else {
        // In range by the checks above.
        scaled as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_round_trip_position() {
        let half_degree = from_float(0.5, POSITION_Q);
        assert_eq!(half_degree, 1 << 15);
        assert!((to_float(half_degree, POSITION_Q) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_float_rounds_to_nearest() {
        // 0.25 + half an LSB rounds up
        let q = 2;
        assert_eq!(from_float(0.375, q), 2); // 1.5 LSB rounds away from zero
        assert_eq!(from_float(0.26, q), 1);
    }

    #[test]
    fn test_from_float_clamps() {
        assert_eq!(from_float(1e12, POSITION_Q), i32::MAX);
        assert_eq!(from_float(-1e12, POSITION_Q), i32::MIN);
    }

    #[test]
    fn test_format_constants() {
        // One degree in Q16 is 65536; one output LSB is 1/256.
        assert_eq!(from_float(1.0, POSITION_Q), 65536);
        assert_eq!(1 << OUTPUT_Q, 256);
    }
}
