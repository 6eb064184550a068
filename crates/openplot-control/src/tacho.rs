//! Tachometer velocity estimation.
//!
//! The tachometer produces a voltage proportional to rotational speed,
//! sampled by the ADC once per control tick. Each raw sample is centered
//! (ADC midscale plus a per-axis DC bias are subtracted) and written into a
//! power-of-two ring; the filter output is the moving average of the ring,
//! aligned to Q16 and scaled by the calibration gain.
//!
//! Sample capture ([`VelocityFilter::push`]) is the interrupt-context half
//! and is a store plus a masked index increment. The summation half
//! ([`VelocityFilter::output`]) runs in deferred context.

use openplot_fixed::{mul_shr, shl_sat, SatValue, VELOCITY_Q};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Velocity-estimator configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TachoError {
    /// The ring length must allow a masked index increment.
    #[error("filter taps must be a nonzero power of two, got {0}")]
    BadTapCount(usize),
    /// The gain exponent must leave headroom in the 64-bit intermediate.
    #[error("gain exponent {0} out of range")]
    BadGainExponent(u32),
    /// Mid-scale and bias offsets must stay within the converter word range.
    #[error("offset {0} outside the converter range")]
    BadOffset(i32),
}

/// Per-axis tachometer calibration.
///
/// The default gain converts centered 12-bit ADC counts into Q16
/// degrees/second for the SRV02 drivetrain: 3.3 V full scale over 4096
/// counts, 1.5 mV per motor rpm, gear ratio 14. That works out to about
/// 0.23 °/s per count, `15088 / 2^16` in fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TachoConfig {
    /// Moving-average length; must be a nonzero power of two.
    pub taps: usize,
    /// ADC mid-scale offset subtracted from every raw sample.
    pub adc_midscale: i32,
    /// Per-axis tachometer DC bias, in raw ADC counts.
    pub bias_offset: i32,
    /// Calibration gain applied to the aligned average.
    pub gain: i32,
    /// Q exponent of `gain`.
    pub gain_q: u32,
}

impl TachoConfig {
    /// Set the per-axis DC bias compensation.
    #[must_use]
    pub const fn with_bias_offset(mut self, bias_offset: i32) -> Self {
        self.bias_offset = bias_offset;
        self
    }

    /// Set the calibration gain and its exponent.
    #[must_use]
    pub const fn with_gain(mut self, gain: i32, gain_q: u32) -> Self {
        self.gain = gain;
        self.gain_q = gain_q;
        self
    }
}

impl Default for TachoConfig {
    fn default() -> Self {
        Self {
            taps: 8,
            adc_midscale: 2048,
            bias_offset: 0,
            gain: 15088,
            gain_q: 16,
        }
    }
}

/// Moving-average filter over centered tachometer samples.
///
/// The tap divisor is folded into the output right shift, so a constant
/// input `c` held for a full ring reproduces exactly
/// `((c << VELOCITY_Q) * gain) >> gain_q`.
#[derive(Debug, Clone)]
pub struct VelocityFilter {
    ring: Vec<i32>,
    index: usize,
    mask: usize,
    center: i32,
    gain: i32,
    output_shift: u32,
}

impl VelocityFilter {
    /// Build a filter from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TachoError::BadTapCount`] unless `taps` is a nonzero power
    /// of two, [`TachoError::BadGainExponent`] when `gain_q` plus the tap
    /// shift leaves no headroom in the intermediate, and
    /// [`TachoError::BadOffset`] when an offset leaves the converter word
    /// range.
    pub fn new(config: &TachoConfig) -> Result<Self, TachoError> {
        if config.taps == 0 || !config.taps.is_power_of_two() {
            return Err(TachoError::BadTapCount(config.taps));
        }
        let word = i32::from(u16::MAX);
        if config.adc_midscale < 0 || config.adc_midscale > word {
            return Err(TachoError::BadOffset(config.adc_midscale));
        }
        if config.bias_offset < -word || config.bias_offset > word {
            return Err(TachoError::BadOffset(config.bias_offset));
        }
        let tap_shift = config.taps.trailing_zeros();
        let output_shift = config.gain_q + tap_shift;
        if output_shift > 62 {
            return Err(TachoError::BadGainExponent(config.gain_q));
        }
        Ok(Self {
            ring: vec![0; config.taps],
            index: 0,
            mask: config.taps - 1,
            center: config.adc_midscale + config.bias_offset,
            gain: config.gain,
            output_shift,
        })
    }

    /// Capture one raw ADC sample (interrupt-context half).
    ///
    /// Centers the sample and advances the ring index modulo the tap count.
    #[inline]
    pub fn push(&mut self, raw: u16) {
        self.ring[self.index] = i32::from(raw) - self.center;
        self.index = (self.index + 1) & self.mask;
    }

    /// Compute the calibrated velocity (deferred-context half), Q16 °/s.
    ///
    /// Sums the ring, aligns to Q16, applies the gain, and divides by the
    /// tap count via the folded right shift. Saturation is reported, never
    /// silent.
    #[inline]
    pub fn output(&self) -> SatValue {
        let mut sum: i64 = 0;
        for sample in &self.ring {
            sum += i64::from(*sample);
        }
        // The sum of `taps` centered samples always fits in i32 for any
        // realistic tap count and ADC width.
        let sum = openplot_fixed::saturate(sum);
        let aligned = shl_sat(sum.value, VELOCITY_Q);
        let scaled = mul_shr(aligned.value, self.gain, self.output_shift);
        SatValue {
            value: scaled.value,
            saturated: sum.saturated || aligned.saturated || scaled.saturated,
        }
    }

    /// Number of taps in the ring.
    #[must_use]
    pub fn taps(&self) -> usize {
        self.ring.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_gain() -> TachoConfig {
        // gain/2^gain_q == 1.0 so outputs read directly in aligned counts.
        TachoConfig {
            taps: 8,
            adc_midscale: 2048,
            bias_offset: 0,
            gain: 1,
            gain_q: 0,
        }
    }

    #[test]
    fn test_rejects_bad_tap_counts() {
        for taps in [0usize, 3, 6, 12] {
            let config = TachoConfig {
                taps,
                ..TachoConfig::default()
            };
            let result = VelocityFilter::new(&config);
            assert!(
                matches!(result, Err(TachoError::BadTapCount(t)) if t == taps),
                "taps = {taps}"
            );
        }
    }

    #[test]
    fn test_rejects_out_of_range_offsets() {
        // Offsets beyond the converter word would overflow the centering
        // subtraction instead of calibrating it.
        for (adc_midscale, bias_offset) in
            [(-1, 0), (1 << 16, 0), (2048, i32::MIN), (2048, 1 << 16)]
        {
            let config = TachoConfig {
                adc_midscale,
                bias_offset,
                ..TachoConfig::default()
            };
            assert!(
                matches!(
                    VelocityFilter::new(&config),
                    Err(TachoError::BadOffset(_))
                ),
                "midscale {adc_midscale}, bias {bias_offset}"
            );
        }
    }

    #[test]
    fn test_rejects_oversized_gain_exponent() {
        let config = TachoConfig {
            gain_q: 61,
            ..TachoConfig::default()
        };
        assert!(matches!(
            VelocityFilter::new(&config),
            Err(TachoError::BadGainExponent(61))
        ));
    }

    #[test]
    fn test_constant_input_is_idempotent() -> Result<(), TachoError> {
        // Feeding the same raw sample N times yields that sample, rescaled
        // by the documented gain and exponent.
        let config = TachoConfig::default();
        let mut filter = VelocityFilter::new(&config)?;
        let raw = 2048 + 100; // 100 counts above midscale
        for _ in 0..config.taps {
            filter.push(raw);
        }
        let expected = ((100i64 << VELOCITY_Q) * i64::from(config.gain)) >> config.gain_q;
        let out = filter.output();
        assert_eq!(i64::from(out.value), expected);
        assert!(!out.saturated);
        Ok(())
    }

    #[test]
    fn test_zero_speed_reads_zero() -> Result<(), TachoError> {
        let mut filter = VelocityFilter::new(&unit_gain())?;
        for _ in 0..16 {
            filter.push(2048);
        }
        assert_eq!(filter.output().value, 0);
        Ok(())
    }

    #[test]
    fn test_bias_offset_centers_reading() -> Result<(), TachoError> {
        // A tachometer idling 12 counts below midscale reads zero velocity.
        let config = unit_gain().with_bias_offset(-12);
        let mut filter = VelocityFilter::new(&config)?;
        for _ in 0..8 {
            filter.push(2048 - 12);
        }
        assert_eq!(filter.output().value, 0);
        Ok(())
    }

    #[test]
    fn test_moving_average_tracks_step_input() -> Result<(), TachoError> {
        let mut filter = VelocityFilter::new(&unit_gain())?;
        for _ in 0..8 {
            filter.push(2048);
        }
        // Half the ring at +80 counts: average is +40, aligned to Q16.
        for _ in 0..4 {
            filter.push(2048 + 80);
        }
        assert_eq!(filter.output().value, 40 << VELOCITY_Q);
        Ok(())
    }

    #[test]
    fn test_negative_velocity() -> Result<(), TachoError> {
        let mut filter = VelocityFilter::new(&unit_gain())?;
        for _ in 0..8 {
            filter.push(2048 - 64);
        }
        assert_eq!(filter.output().value, -(64 << VELOCITY_Q));
        Ok(())
    }

    #[test]
    fn test_saturation_is_reported() -> Result<(), TachoError> {
        let config = TachoConfig {
            taps: 8,
            adc_midscale: 0,
            bias_offset: 0,
            gain: i32::MAX,
            gain_q: 0,
        };
        let mut filter = VelocityFilter::new(&config)?;
        for _ in 0..8 {
            filter.push(u16::MAX);
        }
        let out = filter.output();
        assert!(out.saturated);
        assert_eq!(out.value, i32::MAX);
        Ok(())
    }
}
