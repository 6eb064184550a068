//! Quadrature phase decoding.
//!
//! Two sensor channels 90° out of phase produce a 2-bit code whose gray
//! sequence encodes both direction and magnitude of rotation. The decoder
//! is a pure lookup over `(previous_code << 2) | current_code`: one table
//! read per edge, no branching on direction.
//!
//! A transition where both phase bits change at once is physically
//! impossible for a single edge and decodes to zero; it is absorbed, never
//! a fault. The previous-code state is only advanced on a transition that
//! produced a step, so an invalid code glitch cannot corrupt the direction
//! history that subsequent edges decode against.

use serde::{Deserialize, Serialize};

/// Signed step per `(prev_code << 2) | code` transition.
///
/// Codes are `(B << 1) | A`. The forward gray sequence `00 → 01 → 11 → 10`
/// decodes to `+1` per edge; its reverse decodes to `-1`; idle and
/// double-bit transitions decode to `0`.
pub const QUAD_DELTA: [i8; 16] = [
    0, 1, -1, 0, // from 00
    -1, 0, 0, 1, // from 01
    1, 0, 0, -1, // from 10
    0, -1, 1, 0, // from 11
];

/// Pack two digital phase samples into a 2-bit code.
#[inline]
#[must_use]
pub fn phase_code(a: bool, b: bool) -> u8 {
    (u8::from(b) << 1) | u8::from(a)
}

/// Decode one quadrature edge.
///
/// Returns the signed step in `{-1, 0, +1}` and the next previous-code
/// value to feed back. The fed-back code is re-encoded from the produced
/// step: a zero-step transition (idle or invalid) retains the old code.
#[inline]
#[must_use]
pub fn decode(prev_code: u8, code: u8) -> (i8, u8) {
    let index = usize::from(((prev_code & 0x3) << 2) | (code & 0x3));
    let delta = QUAD_DELTA[index];
    let next_prev = if delta == 0 { prev_code & 0x3 } else { code & 0x3 };
    (delta, next_prev)
}

/// Per-axis encoder calibration.
///
/// `angle_per_tick` converts one quadrature event into a Q16-degree
/// position increment. The default matches the SRV02 load shaft: a
/// 1024-line encoder read on all four edges gives 4096 events per
/// mechanical rotation, and `(360 / 4096) · 2^16 = 5760` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Quadrature events per mechanical rotation.
    pub counts_per_rev: u32,
    /// Q16-degree position increment per quadrature event.
    pub angle_per_tick: i32,
}

impl EncoderConfig {
    /// Calibration for the SRV02's 1024-line load-shaft encoder.
    #[must_use]
    pub const fn srv02() -> Self {
        Self {
            counts_per_rev: 4096,
            angle_per_tick: 5760,
        }
    }

    /// Set the per-event angular increment (Q16 degrees).
    #[must_use]
    pub const fn with_angle_per_tick(mut self, angle_per_tick: i32) -> Self {
        self.angle_per_tick = angle_per_tick;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::srv02()
    }
}
