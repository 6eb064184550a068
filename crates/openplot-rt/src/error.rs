//! Error types for the real-time dispatch crate.

use std::fmt;
use std::fmt::Display;
use std::time::Duration;

use openplot_control::{ServoError, TachoError};
use openplot_trajectory::TrajectoryError;

/// Real-time error codes (pre-allocated for RT path)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RtError {
    /// Fixed-point arithmetic saturated while the fault-on-overflow policy is active
    Overflow = 1,
    /// A periodic context overran its entire period
    MissedDeadline = 2,
    /// A trajectory segment failed to converge within the tick bound
    VertexStall = 3,
    /// start requested while a plot run is already active
    AlreadyPlotting = 4,
    /// Operation requires an active plot run
    NotPlotting = 5,
}

impl RtError {
    /// Wire-stable code for publication through an atomic fault latch.
    pub fn as_code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_code`](Self::as_code); zero and unknown codes map to `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Overflow),
            2 => Some(Self::MissedDeadline),
            3 => Some(Self::VertexStall),
            4 => Some(Self::AlreadyPlotting),
            5 => Some(Self::NotPlotting),
            _ => None,
        }
    }
}

impl Display for RtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtError::Overflow => write!(f, "fixed-point overflow"),
            RtError::MissedDeadline => write!(f, "periodic context missed its deadline"),
            RtError::VertexStall => write!(f, "trajectory stalled short of a vertex"),
            RtError::AlreadyPlotting => write!(f, "plot run already active"),
            RtError::NotPlotting => write!(f, "no plot run active"),
        }
    }
}

impl std::error::Error for RtError {}

/// RT-safe result type
pub type RtResult<T = ()> = Result<T, RtError>;

/// Configuration validation failures. These carry context and allocate freely;
/// they are only produced at setup time, never on the RT path.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Servo gain or output-window validation failed.
    #[error(transparent)]
    Servo(#[from] ServoError),
    /// Tachometer filter validation failed.
    #[error(transparent)]
    Tacho(#[from] TachoError),
    /// Trajectory or ramp validation failed.
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
    /// The control tick period was zero.
    #[error("control period must be nonzero")]
    ZeroControlPeriod,
    /// The trajectory tick was faster than the control tick.
    #[error("trajectory period {trajectory:?} must be at least the control period {control:?}")]
    PeriodOrder {
        /// Configured control tick period.
        control: Duration,
        /// Configured trajectory tick period.
        trajectory: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for err in [
            RtError::Overflow,
            RtError::MissedDeadline,
            RtError::VertexStall,
            RtError::AlreadyPlotting,
            RtError::NotPlotting,
        ] {
            assert_eq!(RtError::from_code(err.as_code()), Some(err));
        }
        assert_eq!(RtError::from_code(0), None);
        assert_eq!(RtError::from_code(200), None);
    }

    #[test]
    fn test_display_is_lowercase_and_terse() {
        assert_eq!(RtError::Overflow.to_string(), "fixed-point overflow");
        assert_eq!(
            RtError::VertexStall.to_string(),
            "trajectory stalled short of a vertex"
        );
    }
}
