//! Hosted dispatcher: threads standing in for the firmware priority levels.
//!
//! On the bench target the contexts are interrupt and task priorities; here
//! each context gets a thread, highest-rate first. The mapping is
//!
//! - control tick thread: output word out, both conversions in, every period
//! - deferred worker: velocity filter steps posted by the conversion path
//! - one control task thread per axis, woken by the filter step
//! - trajectory tick thread at the slow cadence
//!
//! Any context that faults latches the error on the core and stops the run;
//! the other threads keep servicing state so the axes hold position until
//! [`HostDispatcher::shutdown`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::RecvTimeoutError;
use tracing::{debug, error};

use crate::clock::TickClock;
use crate::config::PlotterConfig;
use crate::core::PlotterCore;
use crate::deferred::ChannelExecutor;
use crate::error::RtError;
use crate::state::AxisId;

/// Hardware the dispatcher drives on behalf of the core.
///
/// Hosted tests implement this over a simulated plant; the bench target
/// wires it to the converter and the output stage.
pub trait Platform: Send + Sync + 'static {
    /// Trigger and read one tachometer conversion for `axis`.
    fn sample_adc(&self, axis: AxisId) -> u16;
    /// Transmit one 16-bit actuator word.
    fn write_output(&self, word: u16);
}

/// Thread set running a [`PlotterCore`] against a [`Platform`].
#[derive(Debug)]
pub struct HostDispatcher {
    core: Arc<PlotterCore>,
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl HostDispatcher {
    /// Spawn every context thread. The run itself still starts via
    /// [`PlotterCore::start`]; until then the threads tick but hold state.
    #[must_use]
    pub fn spawn(core: Arc<PlotterCore>, platform: Arc<dyn Platform>, config: &PlotterConfig) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (executor, deferred_rx) = ChannelExecutor::new();
        let mut handles = Vec::with_capacity(5);

        {
            let core = Arc::clone(&core);
            let platform = Arc::clone(&platform);
            let shutdown = Arc::clone(&shutdown);
            let period = config.control_period;
            handles.push(thread::spawn(move || {
                let mut clock = TickClock::new(period);
                while !shutdown.load(Ordering::Acquire) {
                    match clock.wait_for_tick() {
                        Ok(_) => {}
                        Err(err) => {
                            core.counters().inc_missed_deadline();
                            core.fail(err);
                            break;
                        }
                    }
                    let io = core.on_control_tick();
                    platform.write_output(io.output_word);
                    for axis in AxisId::BOTH {
                        let raw = platform.sample_adc(axis);
                        core.on_adc_complete(axis, raw, &executor);
                    }
                }
                debug!("control tick thread exited");
            }));
        }

        {
            let core = Arc::clone(&core);
            let shutdown = Arc::clone(&shutdown);
            handles.push(thread::spawn(move || {
                loop {
                    match deferred_rx.recv_timeout(Duration::from_millis(10)) {
                        Ok(work) => {
                            if let Err(err) = core.run_deferred(work) {
                                error!(error = %err, "deferred context fault");
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            if shutdown.load(Ordering::Acquire) {
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("deferred worker exited");
            }));
        }

        for axis in AxisId::BOTH {
            let core = Arc::clone(&core);
            let shutdown = Arc::clone(&shutdown);
            handles.push(thread::spawn(move || {
                if let Err(err) = core.run_control_loop(axis, &shutdown) {
                    error!(axis = axis.name(), error = %err, "control task fault");
                }
                debug!(axis = axis.name(), "control task exited");
            }));
        }

        {
            let core = Arc::clone(&core);
            let shutdown = Arc::clone(&shutdown);
            let period = config.trajectory_period;
            handles.push(thread::spawn(move || {
                let mut clock = TickClock::new(period);
                while !shutdown.load(Ordering::Acquire) {
                    match clock.wait_for_tick() {
                        Ok(_) => {}
                        Err(err) => {
                            core.counters().inc_missed_deadline();
                            core.fail(err);
                            break;
                        }
                    }
                    if let Err(RtError::VertexStall) = core.on_trajectory_tick() {
                        // Fault is latched; stop stepping but keep holding.
                        break;
                    }
                }
                debug!("trajectory tick thread exited");
            }));
        }

        Self {
            core,
            shutdown,
            handles,
        }
    }

    /// The core the threads are driving.
    #[must_use]
    pub fn core(&self) -> &Arc<PlotterCore> {
        &self.core
    }

    /// Ask every thread to exit and join them.
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Release);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("dispatch thread panicked");
            }
        }
    }
}
