//! Per-axis signal processing and control law for the OpenPlot core.
//!
//! This crate holds the pure, per-sample algorithmic pieces of the control
//! loop, one module per stage:
//!
//! - **encoder**: quadrature phase decoding into signed position increments
//! - **tacho**: moving-average filtering of tachometer ADC samples into
//!   calibrated angular velocity
//! - **servo**: the proportional + rate-feedback control law producing an
//!   actuator command from reference, position and velocity
//!
//! Everything here is free of shared state and execution-context concerns;
//! the `openplot-rt` crate owns the published axis state and invokes these
//! stages from the right contexts at the right cadences.
//!
//! # RT Safety
//!
//! All hot-path functions in this crate are:
//! - Allocation-free (filter storage is sized at construction)
//! - O(1) time complexity, or O(taps) with a small configured bound
//! - Free of syscalls, I/O and blocking

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod encoder;
pub mod prelude;
pub mod servo;
pub mod tacho;

pub use encoder::{decode, phase_code, EncoderConfig, QUAD_DELTA};
pub use servo::{servo_command, ServoCommand, ServoError, ServoGains};
pub use tacho::{TachoConfig, TachoError, VelocityFilter};
