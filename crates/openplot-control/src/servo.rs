//! Proportional position control with rate feedback.
//!
//! The law is deliberately not a PI(D): there is no integral term and no
//! true differentiation. Position error drives a proportional term and the
//! measured velocity is subtracted as a damping term, then the result is
//! scaled into unsigned device units around the output midpoint:
//!
//! ```text
//! error   = reference - position                          (Q16 degrees)
//! raw     = ((error * kp) >> kp_q) - ((velocity * kd) >> kd_q)
//! command = clamp(((raw * output_scale) >> OUTPUT_Q) + output_midpoint)
//! ```
//!
//! The rate term always uses the commanded axis's own velocity. Output
//! clamping to the device range is part of this design; the clip is
//! reported as saturation rather than absorbed silently.

use openplot_fixed::{add_sat, mul_shr, sub_sat, OUTPUT_Q};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Servo gain validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServoError {
    /// Gain exponents must stay below the accumulator width.
    #[error("gain exponent {0} out of range")]
    BadGainExponent(u32),
    /// The output window must satisfy `min <= midpoint <= max <= u16::MAX`.
    #[error("output range [{min}, {max}] around midpoint {midpoint} is invalid")]
    BadOutputRange {
        /// Lower clamp.
        min: i32,
        /// Resting output.
        midpoint: i32,
        /// Upper clamp.
        max: i32,
    },
}

/// Per-axis control gains and output scaling.
///
/// All gains are fixed-point with explicit per-gain exponents so different
/// motor/load pairs tune without rebuilding. Defaults carry the legacy
/// bench tuning for the SRV02 pair behind a 12-bit DAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoGains {
    /// Proportional gain.
    pub kp: i32,
    /// Q exponent of `kp`.
    pub kp_q: u32,
    /// Rate-feedback gain.
    pub kd: i32,
    /// Q exponent of `kd`.
    pub kd_q: u32,
    /// Scale from controller units into device units.
    pub output_scale: i32,
    /// Device-unit output at zero command (DAC mid-rail).
    pub output_midpoint: i32,
    /// Lower output clamp, device units.
    pub output_min: i32,
    /// Upper output clamp, device units.
    pub output_max: i32,
}

impl ServoGains {
    /// Set the proportional gain and its exponent.
    #[must_use]
    pub const fn with_kp(mut self, kp: i32, kp_q: u32) -> Self {
        self.kp = kp;
        self.kp_q = kp_q;
        self
    }

    /// Set the rate-feedback gain and its exponent.
    #[must_use]
    pub const fn with_kd(mut self, kd: i32, kd_q: u32) -> Self {
        self.kd = kd;
        self.kd_q = kd_q;
        self
    }

    /// Set the output clamp window.
    #[must_use]
    pub const fn with_output_range(mut self, min: i32, max: i32) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    /// Validate exponents and the output window.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError`] when a gain exponent exceeds the accumulator
    /// width or the clamp window cannot hold the midpoint in 16 bits.
    pub fn validate(&self) -> Result<(), ServoError> {
        for q in [self.kp_q, self.kd_q] {
            if q > 62 {
                return Err(ServoError::BadGainExponent(q));
            }
        }
        let window_ok = 0 <= self.output_min
            && self.output_min <= self.output_midpoint
            && self.output_midpoint <= self.output_max
            && self.output_max <= i32::from(u16::MAX);
        if !window_ok {
            return Err(ServoError::BadOutputRange {
                min: self.output_min,
                midpoint: self.output_midpoint,
                max: self.output_max,
            });
        }
        Ok(())
    }
}

impl Default for ServoGains {
    fn default() -> Self {
        Self {
            kp: 140,
            kp_q: 9,
            kd: 64,
            kd_q: 9,
            output_scale: 1 << OUTPUT_Q,
            output_midpoint: 2048,
            output_min: 0,
            output_max: 4095,
        }
    }
}

/// One actuator command sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ServoCommand {
    /// Unsigned device-unit sample, within the configured clamp window.
    pub command: u16,
    /// Whether any stage of the computation clipped.
    pub saturated: bool,
}

/// Run the control law for one cycle.
///
/// `reference` and `position` are Q16 degrees; `velocity` is Q16 °/s.
/// The returned command is ready for the output channel.
#[inline]
pub fn servo_command(gains: &ServoGains, reference: i32, position: i32, velocity: i32) -> ServoCommand {
    let error = sub_sat(reference, position);
    let proportional = mul_shr(error.value, gains.kp, gains.kp_q);
    let damping = mul_shr(velocity, gains.kd, gains.kd_q);
    let raw = sub_sat(proportional.value, damping.value);
    let scaled = mul_shr(raw.value, gains.output_scale, OUTPUT_Q);
    let centered = add_sat(scaled.value, gains.output_midpoint);

    let clipped = centered.value < gains.output_min || centered.value > gains.output_max;
    let command = centered.value.clamp(gains.output_min, gains.output_max);

    ServoCommand {
        // Within u16 range per the validated clamp window.
        command: command as u16,
        saturated: error.saturated
            || proportional.saturated
            || damping.saturated
            || raw.saturated
            || scaled.saturated
            || centered.saturated
            || clipped,
    }
}
