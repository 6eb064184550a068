//! Trajectory data model, run state machine and reference stepper.
//!
//! A trajectory is an ordered, immutable list of integer `(x, y)` vertices
//! loaded once before a run. The [`TrajectoryStepper`] advances the
//! per-axis position references toward the active vertex under a per-tick
//! ramp limit, synchronizing vertex advancement on both axes arriving in
//! the same invocation. Large reference discontinuities destabilize the
//! rate-feedback loop, so the reference never moves by more than the
//! configured maximum step per invocation.
//!
//! The stepper exclusively owns `current_step` and is the only writer of
//! the position references; the surrounding dispatch layer invokes it from
//! the slow periodic context only.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod path;
pub mod run;
pub mod stepper;

pub use path::{Trajectory, TrajectoryError, Vertex};
pub use run::RunState;
pub use stepper::{StepOutcome, StepperConfig, TrajectoryStepper};
