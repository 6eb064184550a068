//! Shared axis state published between real-time contexts.
//!
//! Each cell has exactly one writing context and any number of readers:
//! position is accumulated by the encoder edge handler, velocity by the
//! deferred filter step, the reference by the trajectory stepper and the
//! actuator command by the control task. Readers always observe some value
//! that was fully written; the data-ready signal, not these cells, provides
//! the fresh-sample handshake.

use core::sync::atomic::{AtomicI32, AtomicU16, AtomicU8, Ordering};

use openplot_trajectory::RunState;

/// Axis selector for the two-axis mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl AxisId {
    /// Both axes, in conversion order.
    pub const BOTH: [AxisId; 2] = [AxisId::X, AxisId::Y];

    /// Index into per-axis arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
        }
    }

    /// Lowercase axis name for log fields.
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AxisId::X => "x",
            AxisId::Y => "y",
        }
    }
}

/// Published state for one axis. All values are Q16 except the actuator
/// command, which is the raw converter word.
#[derive(Debug, Default)]
pub struct AxisShared {
    position: AtomicI32,
    velocity: AtomicI32,
    reference: AtomicI32,
    command: AtomicU16,
}

impl AxisShared {
    /// Accumulate a position delta. Encoder edge handler only.
    #[inline]
    pub fn add_position(&self, delta: i32) {
        self.position.fetch_add(delta, Ordering::Relaxed);
    }

    /// Overwrite the measured position. Setup and test use.
    #[inline]
    pub fn set_position(&self, value: i32) {
        self.position.store(value, Ordering::Relaxed);
    }

    /// Publish a filtered velocity estimate. Deferred filter step only.
    #[inline]
    pub fn publish_velocity(&self, value: i32) {
        self.velocity.store(value, Ordering::Relaxed);
    }

    /// Publish a ramped position reference. Trajectory stepper only.
    #[inline]
    pub fn publish_reference(&self, value: i32) {
        self.reference.store(value, Ordering::Relaxed);
    }

    /// Publish a computed actuator word. Control task only.
    #[inline]
    pub fn publish_command(&self, value: u16) {
        self.command.store(value, Ordering::Relaxed);
    }

    /// Latest accumulated position, Q16.
    #[inline]
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    /// Latest velocity estimate, Q16.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> i32 {
        self.velocity.load(Ordering::Relaxed)
    }

    /// Latest ramped reference, Q16.
    #[inline]
    #[must_use]
    pub fn reference(&self) -> i32 {
        self.reference.load(Ordering::Relaxed)
    }

    /// Latest actuator word.
    #[inline]
    #[must_use]
    pub fn command(&self) -> u16 {
        self.command.load(Ordering::Relaxed)
    }
}

/// Full shared state: one cell bank per axis plus the run flag.
#[derive(Debug, Default)]
pub struct SharedState {
    axes: [AxisShared; 2],
    run: AtomicU8,
}

impl SharedState {
    /// Fresh state: zeroed axes, run flag Stopped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell bank for one axis.
    #[inline]
    #[must_use]
    pub fn axis(&self, axis: AxisId) -> &AxisShared {
        &self.axes[axis.index()]
    }

    /// Current run state.
    #[inline]
    #[must_use]
    pub fn run_state(&self) -> RunState {
        RunState::from_u8(self.run.load(Ordering::Acquire))
    }

    /// Publish a new run state.
    #[inline]
    pub fn set_run_state(&self, state: RunState) {
        self.run.store(state.as_u8(), Ordering::Release);
    }

    /// Transition Stopped -> Plotting. Returns false when a run is already
    /// active, so concurrent start requests cannot both win.
    #[inline]
    #[must_use]
    pub fn try_start(&self) -> bool {
        self.run
            .compare_exchange(
                RunState::Stopped.as_u8(),
                RunState::Plotting.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_index_is_stable() {
        assert_eq!(AxisId::X.index(), 0);
        assert_eq!(AxisId::Y.index(), 1);
        assert_eq!(AxisId::BOTH, [AxisId::X, AxisId::Y]);
    }

    #[test]
    fn test_position_accumulates() {
        let shared = SharedState::new();
        shared.axis(AxisId::X).add_position(16);
        shared.axis(AxisId::X).add_position(-4);
        assert_eq!(shared.axis(AxisId::X).position(), 12);
        assert_eq!(shared.axis(AxisId::Y).position(), 0);
    }

    #[test]
    fn test_publish_and_read_back() {
        let shared = SharedState::new();
        shared.axis(AxisId::Y).publish_velocity(-1 << 16);
        shared.axis(AxisId::Y).publish_reference(100 << 16);
        shared.axis(AxisId::Y).publish_command(2075);
        assert_eq!(shared.axis(AxisId::Y).velocity(), -1 << 16);
        assert_eq!(shared.axis(AxisId::Y).reference(), 100 << 16);
        assert_eq!(shared.axis(AxisId::Y).command(), 2075);
    }

    #[test]
    fn test_try_start_is_exclusive() {
        let shared = SharedState::new();
        assert_eq!(shared.run_state(), RunState::Stopped);
        assert!(shared.try_start());
        assert_eq!(shared.run_state(), RunState::Plotting);
        assert!(!shared.try_start());
        shared.set_run_state(RunState::Stopped);
        assert!(shared.try_start());
    }
}
