//! Property tests for the decode table and the servo law.

use openplot_control::{decode, servo_command, ServoGains};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoder_step_is_bounded(prev in 0u8..4, code in 0u8..4) {
        let (delta, next_prev) = decode(prev, code);
        prop_assert!((-1..=1).contains(&delta));
        prop_assert!(next_prev < 4);
    }

    #[test]
    fn decoder_history_only_advances_on_steps(codes in proptest::collection::vec(0u8..4, 1..256)) {
        let mut prev = 0u8;
        for code in codes {
            let (delta, next_prev) = decode(prev, code);
            if delta == 0 {
                prop_assert_eq!(next_prev, prev);
            } else {
                prop_assert_eq!(next_prev, code);
            }
            prev = next_prev;
        }
    }

    #[test]
    fn decoder_reversing_a_step_cancels_it(prev in 0u8..4, code in 0u8..4) {
        // Walking back a valid step returns the opposite delta.
        let (delta, next_prev) = decode(prev, code);
        prop_assume!(delta != 0);
        let (back, _) = decode(next_prev, prev);
        prop_assert_eq!(back, -delta);
    }

    #[test]
    fn servo_output_stays_in_window(
        reference in any::<i32>(),
        position in any::<i32>(),
        velocity in any::<i32>(),
    ) {
        let gains = ServoGains::default();
        let out = servo_command(&gains, reference, position, velocity);
        prop_assert!(i32::from(out.command) >= gains.output_min);
        prop_assert!(i32::from(out.command) <= gains.output_max);
    }

    #[test]
    fn servo_in_range_math_matches_reference(
        error_deg in -200i32..200,
        velocity_units in -2000i32..2000,
    ) {
        // Small enough that no stage can clip with the default gains.
        let gains = ServoGains::default();
        let out = servo_command(&gains, error_deg, 0, velocity_units);
        let raw = ((i64::from(error_deg) * 140) >> 9) - ((i64::from(velocity_units) * 64) >> 9);
        let expected = ((raw * 256) >> 8) + 2048;
        prop_assert_eq!(i64::from(out.command), expected);
        prop_assert!(!out.saturated);
    }
}
