//! Run state machine.
//!
//! Two states only. `Stopped → Plotting` happens on the external start
//! trigger; `Plotting → Stopped` happens when the trajectory is exhausted
//! or a fatal fault stops the run. While `Stopped`, velocity filters keep
//! collecting raw samples but no controller wakeups are issued, so the
//! actuator buffers hold their last value.

use serde::{Deserialize, Serialize};

/// Run state of the plotter core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum RunState {
    /// No new control data is produced.
    #[default]
    Stopped = 0,
    /// All components run every cycle.
    Plotting = 1,
}

impl RunState {
    /// Encode for atomic storage.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode from atomic storage; unknown encodings read as `Stopped`.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Plotting,
            _ => Self::Stopped,
        }
    }

    /// Whether the run is active.
    #[inline]
    #[must_use]
    pub const fn is_plotting(self) -> bool {
        matches!(self, Self::Plotting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_u8() {
        for state in [RunState::Stopped, RunState::Plotting] {
            assert_eq!(RunState::from_u8(state.as_u8()), state);
        }
    }

    #[test]
    fn test_unknown_encoding_reads_stopped() {
        assert_eq!(RunState::from_u8(0xFF), RunState::Stopped);
    }

    #[test]
    fn test_default_is_stopped() {
        assert!(!RunState::default().is_plotting());
    }
}
