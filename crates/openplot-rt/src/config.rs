//! Plotter configuration.
//!
//! Defaults reproduce the SRV02 bench tuning: 1 ms control tick, 100 ms
//! trajectory tick, 8-tap velocity filters and the kp 140 / kd 64 gain set.
//! Configurations deserialize from JSON and must pass [`PlotterConfig::validate`]
//! before they reach the real-time core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use openplot_control::{EncoderConfig, ServoGains, TachoConfig, VelocityFilter};
use openplot_trajectory::{StepperConfig, TrajectoryError};

use crate::error::ConfigError;

/// What to do when a fixed-point operation saturates on the RT path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Keep running on the clamped value and count the event.
    #[default]
    Saturate,
    /// Stop the run and surface a fault.
    Fault,
}

/// Per-axis sensing and servo tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Quadrature decode calibration.
    pub encoder: EncoderConfig,
    /// Tachometer filter and calibration.
    pub tacho: TachoConfig,
    /// Servo law gains and output window.
    pub servo: ServoGains,
}

/// Complete plotter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    /// X axis tuning.
    pub x: AxisConfig,
    /// Y axis tuning.
    pub y: AxisConfig,
    /// Trajectory ramp tuning.
    pub stepper: StepperConfig,
    /// Control tick period. Each axis is serviced every other tick.
    pub control_period: Duration,
    /// Trajectory stepper period.
    pub trajectory_period: Duration,
    /// Saturation handling on the RT path.
    pub overflow_policy: OverflowPolicy,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            x: AxisConfig::default(),
            y: AxisConfig::default(),
            stepper: StepperConfig::default(),
            control_period: Duration::from_millis(1),
            trajectory_period: Duration::from_millis(100),
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl PlotterConfig {
    /// Check every tunable before constructing the real-time core.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in [&self.x, &self.y] {
            axis.servo.validate()?;
            // Filter construction performs the tap and exponent checks.
            VelocityFilter::new(&axis.tacho)?;
        }
        if self.stepper.max_step <= 0 {
            return Err(TrajectoryError::BadRampLimit(self.stepper.max_step).into());
        }
        if self.control_period.is_zero() {
            return Err(ConfigError::ZeroControlPeriod);
        }
        if self.trajectory_period < self.control_period {
            return Err(ConfigError::PeriodOrder {
                control: self.control_period,
                trajectory: self.trajectory_period,
            });
        }
        Ok(())
    }
}
