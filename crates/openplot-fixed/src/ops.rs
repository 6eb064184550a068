//! Saturating fixed-point operations.
//!
//! All operations widen to `i64`, so no intermediate product or sum of two
//! `i32` operands can overflow before the final narrowing step. Narrowing
//! saturates to the `i32` range and reports the condition.

/// Result of a saturating fixed-point operation.
///
/// `saturated` is true when the mathematically exact result did not fit in
/// `i32` and `value` was clipped to `i32::MIN`/`i32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SatValue {
    /// The (possibly clipped) result.
    pub value: i32,
    /// Whether clipping occurred.
    pub saturated: bool,
}

impl SatValue {
    /// Wrap a value known to be exact.
    #[inline]
    pub const fn exact(value: i32) -> Self {
        Self {
            value,
            saturated: false,
        }
    }
}

/// Narrow a widened intermediate to `i32`, clipping out-of-range results.
#[inline]
pub fn saturate(wide: i64) -> SatValue {
    if wide > i64::from(i32::MAX) {
        SatValue {
            value: i32::MAX,
            saturated: true,
        }
    } else if wide < i64::from(i32::MIN) {
        SatValue {
            value: i32::MIN,
            saturated: true,
        }
    } else {
        // In range by the checks above.
        SatValue::exact(wide as i32)
    }
}

/// Multiply two fixed-point values and align the result with an arithmetic
/// right shift: `(a * b) >> shift`.
///
/// The shift uses floor semantics (arithmetic shift of the signed product),
/// matching the legacy `>>` usage: `(100 * 140) >> 9 == 27`.
#[inline]
pub fn mul_shr(a: i32, b: i32, shift: u32) -> SatValue {
    let product = i64::from(a) * i64::from(b);
    saturate(product >> shift.min(63))
}

/// Left-shift a value, saturating instead of discarding high bits.
#[inline]
pub fn shl_sat(a: i32, shift: u32) -> SatValue {
    let wide = i64::from(a);
    let shift = shift.min(63);
    let shifted = wide << shift;
    // A shift that cannot round-trip lost significant bits.
    if (shifted >> shift) != wide {
        saturate(if wide < 0 { i64::MIN } else { i64::MAX })
    } else {
        saturate(shifted)
    }
}

/// Saturating addition of two same-format values.
#[inline]
pub fn add_sat(a: i32, b: i32) -> SatValue {
    saturate(i64::from(a) + i64::from(b))
}

/// Saturating subtraction of two same-format values.
#[inline]
pub fn sub_sat(a: i32, b: i32) -> SatValue {
    saturate(i64::from(a) - i64::from(b))
}

/// Re-align a value from one Q format to another.
///
/// Widening (`to_q > from_q`) saturates; narrowing discards fractional bits
/// with floor semantics and is always exact in the target format.
#[inline]
pub fn rescale(value: i32, from_q: u32, to_q: u32) -> SatValue {
    if to_q >= from_q {
        shl_sat(value, to_q - from_q)
    } else {
        SatValue::exact(value >> (from_q - to_q).min(31))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_shr_matches_legacy_gain_math() {
        // The pinned controller literal: (100 * 140) >> 9 == 27.
        let r = mul_shr(100, 140, 9);
        assert_eq!(r.value, 27);
        assert!(!r.saturated);
    }

    #[test]
    fn test_mul_shr_floor_semantics_for_negative() {
        // Arithmetic shift floors toward negative infinity.
        let r = mul_shr(-100, 140, 9);
        assert_eq!(r.value, -28);
        assert!(!r.saturated);
    }

    #[test]
    fn test_mul_shr_saturates_positive() {
        let r = mul_shr(i32::MAX, i32::MAX, 0);
        assert_eq!(r.value, i32::MAX);
        assert!(r.saturated);
    }

    #[test]
    fn test_mul_shr_saturates_negative() {
        let r = mul_shr(i32::MIN, i32::MAX, 0);
        assert_eq!(r.value, i32::MIN);
        assert!(r.saturated);
    }

    #[test]
    fn test_shl_sat_exact() {
        let r = shl_sat(100, 16);
        assert_eq!(r.value, 100 << 16);
        assert!(!r.saturated);
    }

    #[test]
    fn test_shl_sat_clips() {
        let r = shl_sat(1 << 20, 16);
        assert_eq!(r.value, i32::MAX);
        assert!(r.saturated);

        let r = shl_sat(-(1 << 20), 16);
        assert_eq!(r.value, i32::MIN);
        assert!(r.saturated);
    }

    #[test]
    fn test_shl_sat_large_shift() {
        let r = shl_sat(1, 62);
        assert!(r.saturated);
        let r = shl_sat(0, 63);
        assert_eq!(r.value, 0);
        assert!(!r.saturated);
    }

    #[test]
    fn test_add_sub_sat() {
        assert_eq!(add_sat(1, 2).value, 3);
        assert!(add_sat(i32::MAX, 1).saturated);
        assert!(sub_sat(i32::MIN, 1).saturated);
        assert_eq!(sub_sat(3, 5).value, -2);
    }

    #[test]
    fn test_rescale_widening_and_narrowing() {
        let widened = rescale(100, 0, 16);
        assert_eq!(widened.value, 100 << 16);
        assert!(!widened.saturated);

        let narrowed = rescale(100 << 16, 16, 8);
        assert_eq!(narrowed.value, 100 << 8);
        assert!(!narrowed.saturated);
    }

    #[test]
    fn test_rescale_same_format_is_identity() {
        let r = rescale(12345, 16, 16);
        assert_eq!(r.value, 12345);
        assert!(!r.saturated);
    }
}
