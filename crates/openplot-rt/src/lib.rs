//! Real-time state, timing and dispatch for the OpenPlot core.
//!
//! `openplot-control` and `openplot-trajectory` supply the per-sample math;
//! this crate runs it. It owns the published axis state, the counters, the
//! wakeup signals and the multi-rate context structure:
//!
//! - **state**: single-writer atomic cells per axis plus the run flag
//! - **signal**: the binary non-queuing wakeup between filter and servo
//! - **deferred**: the conversion-to-filter work handoff
//! - **clock**: absolute-deadline tick source for the periodic contexts
//! - **core**: one handler per context, free of threads and I/O
//! - **dispatch**: the hosted thread mapping and the [`Platform`] seam
//!
//! The priority order, highest first: encoder edges, conversion completions,
//! the deferred filter step, the control tick, the blocking control tasks,
//! the trajectory tick, then idle observation via counter snapshots.
//!
//! # Fault policy
//!
//! Timing overruns of a full period, trajectory stalls and (under the fault
//! overflow policy) arithmetic saturation all stop the run and latch the
//! first error on [`PlotterCore`]; the axes then hold their last references.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod core;
pub mod counters;
pub mod deferred;
pub mod dispatch;
pub mod error;
pub mod signal;
pub mod state;

pub use clock::{TickClock, TickStats};
pub use config::{AxisConfig, OverflowPolicy, PlotterConfig};
pub use crate::core::{ControlTickIo, PlotterCore};
pub use counters::{CounterSnapshot, Counters};
pub use deferred::{ChannelExecutor, DeferredExecutor, DeferredWork};
pub use dispatch::{HostDispatcher, Platform};
pub use error::{ConfigError, RtError, RtResult};
pub use signal::DataReady;
pub use state::{AxisId, AxisShared, SharedState};
