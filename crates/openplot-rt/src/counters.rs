//! Atomic event counters for the real-time paths.
//!
//! Every hot-path context (encoder edges, conversion completions, the filter
//! step, the control tick) bumps counters here instead of logging. The idle
//! context or a supervising thread reads them back with [`Counters::snapshot`].
//!
//! # RT Safety
//!
//! All `inc_*` methods are a single relaxed fetch-add: no allocation, no
//! blocking, no syscalls. Snapshots are eventually consistent; there is no
//! atomic view across all counters.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter values captured by [`Counters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Control ticks processed
    pub control_ticks: u64,
    /// Trajectory ticks processed while a run was active
    pub trajectory_ticks: u64,
    /// Encoder edge interrupts observed (both axes)
    pub encoder_edges: u64,
    /// Quadrature transitions rejected as invalid (double-bit changes)
    pub invalid_transitions: u64,
    /// Tachometer conversions pushed into the velocity filters
    pub adc_samples: u64,
    /// Deferred filter executions completed
    pub filter_runs: u64,
    /// Servo commands computed and published
    pub control_updates: u64,
    /// Fixed-point operations that saturated
    pub saturation_events: u64,
    /// Periodic contexts that overran a full period
    pub missed_deadlines: u64,
    /// Trajectory segments abandoned after exceeding the per-vertex tick bound
    pub vertex_stalls: u64,
}

/// Lock-free counters shared between the real-time contexts and observers.
#[derive(Debug)]
pub struct Counters {
    control_ticks: AtomicU64,
    trajectory_ticks: AtomicU64,
    encoder_edges: AtomicU64,
    invalid_transitions: AtomicU64,
    adc_samples: AtomicU64,
    filter_runs: AtomicU64,
    control_updates: AtomicU64,
    saturation_events: AtomicU64,
    missed_deadlines: AtomicU64,
    vertex_stalls: AtomicU64,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

impl Counters {
    /// All counters start at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            control_ticks: AtomicU64::new(0),
            trajectory_ticks: AtomicU64::new(0),
            encoder_edges: AtomicU64::new(0),
            invalid_transitions: AtomicU64::new(0),
            adc_samples: AtomicU64::new(0),
            filter_runs: AtomicU64::new(0),
            control_updates: AtomicU64::new(0),
            saturation_events: AtomicU64::new(0),
            missed_deadlines: AtomicU64::new(0),
            vertex_stalls: AtomicU64::new(0),
        }
    }

    /// Count one control tick.
    #[inline]
    pub fn inc_control_tick(&self) {
        self.control_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one trajectory tick.
    #[inline]
    pub fn inc_trajectory_tick(&self) {
        self.trajectory_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one encoder edge interrupt.
    #[inline]
    pub fn inc_encoder_edge(&self) {
        self.encoder_edges.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one rejected quadrature transition.
    #[inline]
    pub fn inc_invalid_transition(&self) {
        self.invalid_transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one tachometer conversion.
    #[inline]
    pub fn inc_adc_sample(&self) {
        self.adc_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one deferred filter execution.
    #[inline]
    pub fn inc_filter_run(&self) {
        self.filter_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one published servo command.
    #[inline]
    pub fn inc_control_update(&self) {
        self.control_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one saturating fixed-point operation.
    #[inline]
    pub fn inc_saturation_event(&self) {
        self.saturation_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one full-period overrun.
    #[inline]
    pub fn inc_missed_deadline(&self) {
        self.missed_deadlines.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one abandoned trajectory segment.
    #[inline]
    pub fn inc_vertex_stall(&self) {
        self.vertex_stalls.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter without resetting.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            control_ticks: self.control_ticks.load(Ordering::Relaxed),
            trajectory_ticks: self.trajectory_ticks.load(Ordering::Relaxed),
            encoder_edges: self.encoder_edges.load(Ordering::Relaxed),
            invalid_transitions: self.invalid_transitions.load(Ordering::Relaxed),
            adc_samples: self.adc_samples.load(Ordering::Relaxed),
            filter_runs: self.filter_runs.load(Ordering::Relaxed),
            control_updates: self.control_updates.load(Ordering::Relaxed),
            saturation_events: self.saturation_events.load(Ordering::Relaxed),
            missed_deadlines: self.missed_deadlines.load(Ordering::Relaxed),
            vertex_stalls: self.vertex_stalls.load(Ordering::Relaxed),
        }
    }

    /// Capture and zero every counter. Collection-interval use only, not for
    /// the RT path.
    #[inline]
    #[must_use]
    pub fn snapshot_and_reset(&self) -> CounterSnapshot {
        CounterSnapshot {
            control_ticks: self.control_ticks.swap(0, Ordering::Relaxed),
            trajectory_ticks: self.trajectory_ticks.swap(0, Ordering::Relaxed),
            encoder_edges: self.encoder_edges.swap(0, Ordering::Relaxed),
            invalid_transitions: self.invalid_transitions.swap(0, Ordering::Relaxed),
            adc_samples: self.adc_samples.swap(0, Ordering::Relaxed),
            filter_runs: self.filter_runs.swap(0, Ordering::Relaxed),
            control_updates: self.control_updates.swap(0, Ordering::Relaxed),
            saturation_events: self.saturation_events.swap(0, Ordering::Relaxed),
            missed_deadlines: self.missed_deadlines.swap(0, Ordering::Relaxed),
            vertex_stalls: self.vertex_stalls.swap(0, Ordering::Relaxed),
        }
    }

    /// Current control tick count.
    #[inline]
    #[must_use]
    pub fn control_ticks(&self) -> u64 {
        self.control_ticks.load(Ordering::Relaxed)
    }

    /// Current saturation event count.
    #[inline]
    #[must_use]
    pub fn saturation_events(&self) -> u64 {
        self.saturation_events.load(Ordering::Relaxed)
    }

    /// Current rejected-transition count.
    #[inline]
    #[must_use]
    pub fn invalid_transitions(&self) -> u64 {
        self.invalid_transitions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counters_are_zero() {
        let counters = Counters::new();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_increments_are_independent() {
        let counters = Counters::new();
        counters.inc_control_tick();
        counters.inc_control_tick();
        counters.inc_encoder_edge();
        counters.inc_invalid_transition();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.control_ticks, 2);
        assert_eq!(snapshot.encoder_edges, 1);
        assert_eq!(snapshot.invalid_transitions, 1);
        assert_eq!(snapshot.filter_runs, 0);
    }

    #[test]
    fn test_snapshot_and_reset() {
        let counters = Counters::new();
        counters.inc_adc_sample();
        counters.inc_filter_run();
        counters.inc_saturation_event();

        let snapshot = counters.snapshot_and_reset();
        assert_eq!(snapshot.adc_samples, 1);
        assert_eq!(snapshot.filter_runs, 1);
        assert_eq!(snapshot.saturation_events, 1);

        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
