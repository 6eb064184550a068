//! Property tests comparing the saturating fixed-point operations against
//! widened-integer reference semantics.

use openplot_fixed::{add_sat, mul_shr, rescale, shl_sat, sub_sat};
use proptest::prelude::*;

fn in_i32(wide: i128) -> bool {
    wide >= i128::from(i32::MIN) && wide <= i128::from(i32::MAX)
}

proptest! {
    #[test]
    fn mul_shr_matches_wide_reference(a in any::<i32>(), b in any::<i32>(), shift in 0u32..48) {
        let r = mul_shr(a, b, shift);
        let exact = (i128::from(a) * i128::from(b)) >> shift;
        if in_i32(exact) {
            prop_assert_eq!(i128::from(r.value), exact);
            prop_assert!(!r.saturated);
        } else {
            prop_assert!(r.saturated);
            prop_assert!(r.value == i32::MAX || r.value == i32::MIN);
        }
    }

    #[test]
    fn shl_sat_matches_wide_reference(a in any::<i32>(), shift in 0u32..40) {
        let r = shl_sat(a, shift);
        let exact = i128::from(a) << shift;
        if in_i32(exact) {
            prop_assert_eq!(i128::from(r.value), exact);
            prop_assert!(!r.saturated);
        } else {
            prop_assert!(r.saturated);
            // Saturation preserves the sign of the exact result.
            prop_assert_eq!(r.value < 0, exact < 0);
        }
    }

    #[test]
    fn add_sat_matches_wide_reference(a in any::<i32>(), b in any::<i32>()) {
        let r = add_sat(a, b);
        let exact = i128::from(a) + i128::from(b);
        if in_i32(exact) {
            prop_assert_eq!(i128::from(r.value), exact);
        } else {
            prop_assert!(r.saturated);
        }
    }

    #[test]
    fn sub_sat_matches_wide_reference(a in any::<i32>(), b in any::<i32>()) {
        let r = sub_sat(a, b);
        let exact = i128::from(a) - i128::from(b);
        if in_i32(exact) {
            prop_assert_eq!(i128::from(r.value), exact);
        } else {
            prop_assert!(r.saturated);
        }
    }

    #[test]
    fn rescale_narrowing_never_saturates(v in any::<i32>(), from_q in 8u32..24, drop in 1u32..8) {
        let r = rescale(v, from_q, from_q - drop);
        prop_assert!(!r.saturated);
        prop_assert_eq!(r.value, v >> drop);
    }

    #[test]
    fn rescale_round_trip_preserves_integral_part(v in -30_000i32..30_000, q in 0u32..16) {
        // Widening then narrowing back is lossless when the widened value fits.
        let widened = rescale(v, 0, q);
        prop_assert!(!widened.saturated);
        let back = rescale(widened.value, q, 0);
        prop_assert_eq!(back.value, v);
    }
}
