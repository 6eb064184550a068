//! Plotter core: the handlers behind every real-time context.
//!
//! The core owns no threads and performs no I/O. Each method is the body of
//! one dispatch context (encoder edge, conversion complete, deferred filter,
//! control tick, control task, trajectory tick) and the host or firmware
//! dispatcher decides when and at what priority each one runs. The control
//! tick returns the words to move on the wire instead of touching hardware,
//! which keeps every handler testable in isolation.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use openplot_control::{servo_command, ServoGains, VelocityFilter};
use openplot_trajectory::{RunState, StepOutcome, Trajectory, TrajectoryStepper};

use crate::config::{OverflowPolicy, PlotterConfig};
use crate::counters::Counters;
use crate::deferred::{DeferredExecutor, DeferredWork};
use crate::error::{ConfigError, RtError, RtResult};
use crate::signal::DataReady;
use crate::state::{AxisId, SharedState};

/// Per-axis runtime owned by the core.
#[derive(Debug)]
struct AxisRuntime {
    /// Last accepted quadrature phase code, written only by the edge handler.
    prev_code: AtomicU8,
    /// Q16 position change per accepted encoder tick.
    angle_per_tick: i32,
    /// Velocity filter ring. Contended only between the conversion handler
    /// and the deferred step, which a dispatcher never runs concurrently.
    filter: Mutex<VelocityFilter>,
    gains: ServoGains,
    data_ready: DataReady,
}

/// One control tick's hardware actions, returned for the dispatcher to carry
/// out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ControlTickIo {
    /// Axis whose actuator word goes out this tick.
    pub output_axis: AxisId,
    /// The word to write. The 16-bit output stage moves one word per tick,
    /// so commands alternate between the axes.
    pub output_word: u16,
}

/// State machine and signal plumbing for the whole plotter.
#[derive(Debug)]
pub struct PlotterCore {
    shared: SharedState,
    counters: Counters,
    axes: [AxisRuntime; 2],
    stepper: Mutex<TrajectoryStepper>,
    overflow_policy: OverflowPolicy,
    /// Alternation state for the output stage. Toggled only on the control
    /// tick.
    output_select: AtomicU8,
    /// Latched fatal error code, zero when healthy.
    fault: AtomicU8,
}

impl PlotterCore {
    /// Build a core for `trajectory` under `config`. Validates everything up
    /// front so the RT handlers never re-check tunables.
    pub fn new(config: &PlotterConfig, trajectory: Trajectory) -> Result<Self, ConfigError> {
        config.validate()?;
        let stepper = TrajectoryStepper::new(trajectory, config.stepper)?;

        let make_axis = |axis: &crate::config::AxisConfig| -> Result<AxisRuntime, ConfigError> {
            Ok(AxisRuntime {
                prev_code: AtomicU8::new(0),
                angle_per_tick: axis.encoder.angle_per_tick,
                filter: Mutex::new(VelocityFilter::new(&axis.tacho)?),
                gains: axis.servo,
                data_ready: DataReady::new(),
            })
        };

        Ok(Self {
            shared: SharedState::new(),
            counters: Counters::new(),
            axes: [make_axis(&config.x)?, make_axis(&config.y)?],
            stepper: Mutex::new(stepper),
            overflow_policy: config.overflow_policy,
            output_select: AtomicU8::new(0),
            fault: AtomicU8::new(0),
        })
    }

    /// Published axis state.
    #[must_use]
    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    /// Event counters for the idle observer.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// The latched fatal error, if any context has faulted.
    #[must_use]
    pub fn fault(&self) -> Option<RtError> {
        RtError::from_code(self.fault.load(Ordering::Acquire))
    }

    /// Latch `err`, stop the run and keep the first fault if two race.
    pub fn fail(&self, err: RtError) {
        self.shared.set_run_state(RunState::Stopped);
        self.fault
            .compare_exchange(0, err.as_code(), Ordering::AcqRel, Ordering::Acquire)
            .ok();
        error!(error = %err, "plotter fault, run stopped");
    }

    /// Begin plotting the loaded trajectory from its first vertex.
    ///
    /// Rewinds the stepper, seeds both position references from vertex zero
    /// and arms the run flag. Fails with [`RtError::AlreadyPlotting`] when a
    /// run is active.
    pub fn start(&self) -> RtResult {
        if !self.shared.try_start() {
            return Err(RtError::AlreadyPlotting);
        }
        self.fault.store(0, Ordering::Release);

        let mut stepper = self.stepper.lock();
        stepper.reset();
        let (x, y) = stepper.start_references();
        self.shared.axis(AxisId::X).publish_reference(x);
        self.shared.axis(AxisId::Y).publish_reference(y);

        info!(x_ref = x, y_ref = y, "plot run started");
        Ok(())
    }

    /// Stop an active run, holding the axes at their current references.
    pub fn stop(&self) -> RtResult {
        if !self.shared.run_state().is_plotting() {
            return Err(RtError::NotPlotting);
        }
        self.shared.set_run_state(RunState::Stopped);
        info!("plot run stopped");
        Ok(())
    }

    /// Encoder edge handler. Highest priority, both edge polarities of both
    /// channels.
    ///
    /// # RT Safety
    ///
    /// Lock-free: a table lookup and at most two relaxed atomic operations.
    pub fn on_encoder_edge(&self, axis: AxisId, channel_a: bool, channel_b: bool) {
        let runtime = &self.axes[axis.index()];
        let code = openplot_control::phase_code(channel_a, channel_b);
        let prev = runtime.prev_code.load(Ordering::Relaxed);
        let (delta, next) = openplot_control::decode(prev, code);
        runtime.prev_code.store(next, Ordering::Relaxed);

        self.counters.inc_encoder_edge();
        if delta == 0 {
            if code != prev {
                self.counters.inc_invalid_transition();
            }
            return;
        }
        self.shared
            .axis(axis)
            .add_position(i32::from(delta) * runtime.angle_per_tick);
    }

    /// Conversion-complete handler: push the raw tachometer sample and hand
    /// the filter math to the deferred context.
    pub fn on_adc_complete(&self, axis: AxisId, raw: u16, deferred: &dyn DeferredExecutor) {
        self.axes[axis.index()].filter.lock().push(raw);
        self.counters.inc_adc_sample();
        deferred.post(DeferredWork::Filter(axis));
    }

    /// Deferred context body.
    pub fn run_deferred(&self, work: DeferredWork) -> RtResult {
        match work {
            DeferredWork::Filter(axis) => self.run_filter_step(axis),
        }
    }

    /// Compute and publish one axis velocity, then wake that axis's control
    /// task when a run is active. While stopped the estimate is still
    /// published so observers see live velocity, but no wakeup is sent and
    /// the actuator command stays untouched.
    pub fn run_filter_step(&self, axis: AxisId) -> RtResult {
        let runtime = &self.axes[axis.index()];
        let velocity = runtime.filter.lock().output();
        if velocity.saturated {
            self.note_saturation("velocity filter")?;
        }
        self.shared.axis(axis).publish_velocity(velocity.value);
        self.counters.inc_filter_run();

        if self.shared.run_state().is_plotting() {
            runtime.data_ready.notify();
        }
        Ok(())
    }

    /// Control tick handler. Alternates the shared 16-bit output stage
    /// between the axes and reports which word to transmit; the dispatcher
    /// then triggers both tachometer conversions for the next cycle.
    pub fn on_control_tick(&self) -> ControlTickIo {
        self.counters.inc_control_tick();
        let select = self.output_select.fetch_xor(1, Ordering::Relaxed);
        let axis = if select == 0 { AxisId::X } else { AxisId::Y };
        ControlTickIo {
            output_axis: axis,
            output_word: self.shared.axis(axis).command(),
        }
    }

    /// Run one axis's servo update from the currently published state.
    fn update_axis_command(&self, axis: AxisId) -> RtResult {
        let runtime = &self.axes[axis.index()];
        let cell = self.shared.axis(axis);
        let command = servo_command(
            &runtime.gains,
            cell.reference(),
            cell.position(),
            cell.velocity(),
        );
        if command.saturated {
            self.note_saturation("servo law")?;
        }
        cell.publish_command(command.command);
        self.counters.inc_control_update();
        Ok(())
    }

    /// Blocking control task body: wait for a fresh velocity estimate, then
    /// recompute this axis's actuator command once.
    pub fn control_cycle(&self, axis: AxisId) -> RtResult {
        self.axes[axis.index()].data_ready.wait();
        self.update_axis_command(axis)
    }

    /// Control task loop for hosted dispatch. Uses a bounded wait so the
    /// shutdown flag is observed even while no samples arrive.
    pub fn run_control_loop(&self, axis: AxisId, shutdown: &AtomicBool) -> RtResult {
        const SHUTDOWN_POLL: Duration = Duration::from_millis(10);
        while !shutdown.load(Ordering::Acquire) {
            if self.axes[axis.index()].data_ready.wait_timeout(SHUTDOWN_POLL) {
                self.update_axis_command(axis)?;
            }
        }
        Ok(())
    }

    /// Trajectory tick handler: advance both references one ramp step.
    ///
    /// No-op while stopped. A finished trajectory stops the run; exceeding
    /// the per-vertex tick bound latches [`RtError::VertexStall`].
    pub fn on_trajectory_tick(&self) -> RtResult {
        if !self.shared.run_state().is_plotting() {
            return Ok(());
        }
        self.counters.inc_trajectory_tick();

        let mut stepper = self.stepper.lock();
        let mut x = self.shared.axis(AxisId::X).reference();
        let mut y = self.shared.axis(AxisId::Y).reference();
        let outcome = stepper.advance(&mut x, &mut y);
        self.shared.axis(AxisId::X).publish_reference(x);
        self.shared.axis(AxisId::Y).publish_reference(y);

        match outcome {
            StepOutcome::Moving => {}
            StepOutcome::VertexReached(index) => {
                debug!(vertex = index, "vertex reached");
            }
            StepOutcome::Finished => {
                self.shared.set_run_state(RunState::Stopped);
                info!(
                    control_updates = self.counters.snapshot().control_updates,
                    "trajectory complete, run stopped"
                );
            }
            StepOutcome::Stalled => {
                self.counters.inc_vertex_stall();
                self.fail(RtError::VertexStall);
                return Err(RtError::VertexStall);
            }
        }
        Ok(())
    }

    /// Record a saturation event and apply the configured overflow policy.
    fn note_saturation(&self, stage: &'static str) -> RtResult {
        self.counters.inc_saturation_event();
        match self.overflow_policy {
            OverflowPolicy::Saturate => {
                warn!(stage, "fixed-point saturation, continuing on clamped value");
                Ok(())
            }
            OverflowPolicy::Fault => {
                self.fail(RtError::Overflow);
                Err(RtError::Overflow)
            }
        }
    }
}
