//! Ramp-limited reference stepper.
//!
//! Invoked at the slow periodic cadence (an order of magnitude below the
//! control tick). Each invocation moves each axis's position reference at
//! most `max_step` toward the active vertex, snapping exactly onto the
//! coordinate once the remaining distance is within one step, so the
//! reference never overshoots a vertex.
//!
//! `current_step` is the index of the most recently *reached* vertex. The
//! starting references are seeded from vertex 0, so the active target is
//! always `vertices[current_step + 1]`. The step only advances when both
//! axes arrive in the same invocation; an axis that arrives early holds
//! its exact coordinate while the other catches up. Reaching the final
//! vertex finishes the run.
//!
//! Axes that can never converge would otherwise stall the advance forever,
//! so the time spent on any single vertex is bounded by
//! `max_ticks_per_vertex`; exceeding the bound is surfaced as
//! [`StepOutcome::Stalled`] for the dispatch layer to treat as fatal.

use crate::path::{Trajectory, TrajectoryError, Vertex};
use openplot_fixed::POSITION_Q;
use serde::{Deserialize, Serialize};

/// Stepper tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepperConfig {
    /// Maximum per-invocation reference change, Q16 reference units.
    pub max_step: i32,
    /// Invocation bound per vertex before the run is declared stalled.
    pub max_ticks_per_vertex: u32,
}

impl StepperConfig {
    /// Set the ramp limit (Q16 reference units).
    #[must_use]
    pub const fn with_max_step(mut self, max_step: i32) -> Self {
        self.max_step = max_step;
        self
    }
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            // 2° per trajectory tick at the legacy 10 Hz cadence.
            max_step: 2 << POSITION_Q,
            max_ticks_per_vertex: 10_000,
        }
    }
}

/// Outcome of one stepper invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum StepOutcome {
    /// At least one axis is still ramping toward the active vertex.
    Moving,
    /// Both axes arrived this invocation; `current_step` advanced to the
    /// contained index.
    VertexReached(usize),
    /// The final vertex has been reached; the run is complete.
    Finished,
    /// The per-vertex invocation bound was exceeded.
    Stalled,
}

/// Ramp-limited generator advancing the position references through a
/// trajectory.
#[derive(Debug, Clone)]
pub struct TrajectoryStepper {
    trajectory: Trajectory,
    config: StepperConfig,
    current_step: usize,
    ticks_at_vertex: u32,
    finished: bool,
}

impl TrajectoryStepper {
    /// Build a stepper over a validated trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::BadRampLimit`] when `max_step` is not
    /// positive. (The trajectory itself is already validated.)
    pub fn new(trajectory: Trajectory, config: StepperConfig) -> Result<Self, TrajectoryError> {
        if config.max_step <= 0 {
            return Err(TrajectoryError::BadRampLimit(config.max_step));
        }
        Ok(Self {
            trajectory,
            config,
            current_step: 0,
            ticks_at_vertex: 0,
            finished: false,
        })
    }

    /// References for the starting vertex, Q16.
    #[must_use]
    pub fn start_references(&self) -> (i32, i32) {
        let start = self.vertex(0);
        (start.x << POSITION_Q, start.y << POSITION_Q)
    }

    /// Index of the most recently reached vertex.
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Whether the trajectory has been exhausted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished || self.current_step == self.trajectory.last_index()
    }

    /// Rewind to the starting vertex for a fresh run.
    pub fn reset(&mut self) {
        self.current_step = 0;
        self.ticks_at_vertex = 0;
        self.finished = false;
    }

    /// Advance both references one invocation toward the active vertex.
    pub fn advance(&mut self, x_ref: &mut i32, y_ref: &mut i32) -> StepOutcome {
        if self.is_finished() {
            return StepOutcome::Finished;
        }

        let target = self.vertex(self.current_step + 1);
        let arrived_x = Self::step_axis(x_ref, target.x << POSITION_Q, self.config.max_step);
        let arrived_y = Self::step_axis(y_ref, target.y << POSITION_Q, self.config.max_step);

        if arrived_x && arrived_y {
            self.current_step += 1;
            self.ticks_at_vertex = 0;
            if self.current_step == self.trajectory.last_index() {
                self.finished = true;
                StepOutcome::Finished
            } else {
                StepOutcome::VertexReached(self.current_step)
            }
        } else {
            self.ticks_at_vertex += 1;
            if self.ticks_at_vertex > self.config.max_ticks_per_vertex {
                StepOutcome::Stalled
            } else {
                StepOutcome::Moving
            }
        }
    }

    /// Move one reference toward `target`, bounded by `max_step`.
    ///
    /// Returns true when the reference sits exactly on the target after the
    /// move. A remaining distance equal to `max_step` snaps.
    fn step_axis(reference: &mut i32, target: i32, max_step: i32) -> bool {
        let distance = i64::from(target) - i64::from(*reference);
        if distance.abs() > i64::from(max_step) {
            let step = if distance > 0 { max_step } else { -max_step };
            *reference = reference.saturating_add(step);
            false
        } else {
            *reference = target;
            true
        }
    }

    fn vertex(&self, index: usize) -> Vertex {
        // Index validity is an invariant of advance()/new().
        self.trajectory.get(index).unwrap_or(Vertex::new(0, 0))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // fixtures are valid by construction

    use super::*;

    const Q: u32 = POSITION_Q;

    fn stepper(vertices: &[(i32, i32)], max_step_units: i32) -> TrajectoryStepper {
        let vertices = vertices
            .iter()
            .map(|&(x, y)| Vertex::new(x, y))
            .collect::<Vec<_>>();
        let trajectory = Trajectory::new(vertices).unwrap();
        let config = StepperConfig::default().with_max_step(max_step_units << Q);
        TrajectoryStepper::new(trajectory, config).unwrap()
    }

    #[test]
    fn test_pinned_scenario_four_ramps_then_snap() {
        // trajectory [(0,0), (100,0)], max_step 20: X ramps 20/40/60/80 and
        // snaps onto 100 on the 5th invocation, where current_step becomes 1
        // and the run finishes.
        let mut s = stepper(&[(0, 0), (100, 0)], 20);
        let (mut x, mut y) = s.start_references();
        assert_eq!((x, y), (0, 0));

        for expected in [20, 40, 60, 80] {
            assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
            assert_eq!(x, expected << Q);
            assert_eq!(y, 0);
            assert_eq!(s.current_step(), 0);
        }

        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!(x, 100 << Q);
        assert_eq!(y, 0);
        assert_eq!(s.current_step(), 1);
        assert!(s.is_finished());
    }

    #[test]
    fn test_reference_change_is_ramp_bounded() {
        let mut s = stepper(&[(0, 0), (1000, -1000)], 7);
        let (mut x, mut y) = s.start_references();
        for _ in 0..50 {
            let (px, py) = (x, y);
            assert_ne!(s.advance(&mut x, &mut y), StepOutcome::Stalled);
            assert!((i64::from(x) - i64::from(px)).abs() <= i64::from(7 << Q));
            assert!((i64::from(y) - i64::from(py)).abs() <= i64::from(7 << Q));
        }
    }

    #[test]
    fn test_exact_snap_no_overshoot() {
        let mut s = stepper(&[(0, 0), (5, 0)], 20);
        let (mut x, mut y) = s.start_references();
        // Remaining distance below one step: snap exactly, never past.
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!(x, 5 << Q);
    }

    #[test]
    fn test_step_advances_only_when_both_axes_arrive() {
        // X arrives 3 invocations before Y; current_step holds until then.
        let mut s = stepper(&[(0, 0), (20, 80), (40, 80)], 20);
        let (mut x, mut y) = s.start_references();

        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
        assert_eq!(x, 20 << Q); // X arrived
        assert_eq!(y, 20 << Q);
        assert_eq!(s.current_step(), 0);

        for expected_y in [40, 60] {
            assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
            assert_eq!(x, 20 << Q); // holds its coordinate
            assert_eq!(y, expected_y << Q);
            assert_eq!(s.current_step(), 0);
        }

        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::VertexReached(1));
        assert_eq!(y, 80 << Q);
        assert_eq!(s.current_step(), 1);
    }

    #[test]
    fn test_negative_direction_ramping() {
        let mut s = stepper(&[(100, 0), (0, 0)], 30);
        let (mut x, mut y) = s.start_references();
        assert_eq!(x, 100 << Q);

        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
        assert_eq!(x, 70 << Q);
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
        assert_eq!(x, 40 << Q);
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
        assert_eq!(x, 10 << Q);
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!(x, 0);
    }

    #[test]
    fn test_finished_is_idempotent() {
        let mut s = stepper(&[(0, 0), (10, 0)], 20);
        let (mut x, mut y) = s.start_references();
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!(x, 10 << Q);
    }

    #[test]
    fn test_single_vertex_trajectory_finishes_immediately() {
        let mut s = stepper(&[(3, 4)], 20);
        let (mut x, mut y) = s.start_references();
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert_eq!((x, y), (3 << Q, 4 << Q));
    }

    #[test]
    fn test_stall_bound_fires() {
        let trajectory = Trajectory::new(vec![Vertex::new(0, 0), Vertex::new(100, 0)]).unwrap();
        let config = StepperConfig {
            max_step: 1 << Q,
            max_ticks_per_vertex: 3,
        };
        let mut s = TrajectoryStepper::new(trajectory, config).unwrap();
        let (mut x, mut y) = s.start_references();
        // The axis needs 100 invocations but the bound is 3.
        for _ in 0..3 {
            assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Moving);
        }
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Stalled);
    }

    #[test]
    fn test_reset_rewinds_to_start() {
        let mut s = stepper(&[(0, 0), (10, 0)], 20);
        let (mut x, mut y) = s.start_references();
        assert_eq!(s.advance(&mut x, &mut y), StepOutcome::Finished);
        assert!(s.is_finished());

        s.reset();
        assert_eq!(s.current_step(), 0);
        assert!(!s.is_finished());
    }

    #[test]
    fn test_rejects_nonpositive_ramp() {
        let trajectory = Trajectory::new(vec![Vertex::new(0, 0)]).unwrap();
        let config = StepperConfig::default().with_max_step(0);
        assert!(TrajectoryStepper::new(trajectory, config).is_err());
    }
}
