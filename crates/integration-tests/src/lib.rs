//! Shared fixtures for the OpenPlot integration tests.
//!
//! No real hardware is involved anywhere: the quadrature emitter plays the
//! phase sequence a spinning encoder would produce, and the scripted plant
//! stands in for the converter and the output stage behind the
//! [`Platform`] seam.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use openplot_rt::{AxisId, Platform, PlotterCore};

/// Replay the quadrature phase sequence for a simulated shaft.
///
/// Tracks the emitted tick count so a plant model can say "the shaft is now
/// at tick N" and get exactly the edges a real encoder would have produced
/// on the way there, in either direction.
#[derive(Debug, Default)]
pub struct QuadratureEmitter {
    ticks: i64,
}

impl QuadratureEmitter {
    /// Emitter at tick zero, phase AB = 00.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated shaft tick.
    #[must_use]
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Channel levels for an absolute tick count.
    fn phase(ticks: i64) -> (bool, bool) {
        // Forward sequence 00 -> 01 -> 11 -> 10, gray-coded on (A, B).
        match ticks.rem_euclid(4) {
            0 => (false, false),
            1 => (true, false),
            2 => (true, true),
            _ => (false, true),
        }
    }

    /// Emit every edge between the current tick and `target`, one
    /// transition at a time, into `core`.
    pub fn advance_to(&mut self, core: &PlotterCore, axis: AxisId, target: i64) {
        while self.ticks != target {
            self.ticks += if target > self.ticks { 1 } else { -1 };
            let (a, b) = Self::phase(self.ticks);
            core.on_encoder_edge(axis, a, b);
        }
    }

    /// Emit one glitch: a double-bit jump that a decoder must reject.
    pub fn glitch(&self, core: &PlotterCore, axis: AxisId) {
        let (a, b) = Self::phase(self.ticks + 2);
        core.on_encoder_edge(axis, a, b);
    }
}

/// Scripted converter and output stage.
///
/// ADC reads drain a per-axis sample queue, falling back to mid-scale when
/// the script runs dry; every transmitted word is retained for inspection.
#[derive(Debug, Default)]
pub struct ScriptedPlant {
    samples: [Mutex<VecDeque<u16>>; 2],
    outputs: Mutex<Vec<u16>>,
    writes: AtomicU64,
}

/// Mid-scale converter reading for a motionless tachometer.
pub const ADC_MIDSCALE: u16 = 2048;

impl ScriptedPlant {
    /// Plant with empty scripts: motionless axes, nothing transmitted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw samples for one axis, drained in order.
    pub fn script_samples(&self, axis: AxisId, raw: impl IntoIterator<Item = u16>) {
        self.samples[axis.index()].lock().extend(raw);
    }

    /// Every word transmitted so far, oldest first.
    #[must_use]
    pub fn outputs(&self) -> Vec<u16> {
        self.outputs.lock().clone()
    }

    /// Number of output writes so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Platform for ScriptedPlant {
    fn sample_adc(&self, axis: AxisId) -> u16 {
        self.samples[axis.index()]
            .lock()
            .pop_front()
            .unwrap_or(ADC_MIDSCALE)
    }

    fn write_output(&self, word: u16) {
        self.outputs.lock().push(word);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Install a compact tracing subscriber once per test binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}
