//! Binary wakeup signal between the deferred filter step and a control task.
//!
//! Semantics match a non-queuing semaphore pegged at one: repeated notifies
//! while the flag is already raised collapse into a single pending wakeup,
//! and a wait consumes the flag. If the consumer falls behind it processes
//! the latest published state once, not once per missed notify.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// One-slot wakeup flag.
#[derive(Debug, Default)]
pub struct DataReady {
    flag: Mutex<bool>,
    condvar: Condvar,
}

impl DataReady {
    /// Signal with the flag lowered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake one waiter. Idempotent while already raised.
    pub fn notify(&self) {
        let mut raised = self.flag.lock();
        if !*raised {
            *raised = true;
            self.condvar.notify_one();
        }
    }

    /// Block until the flag is raised, then consume it.
    pub fn wait(&self) {
        let mut raised = self.flag.lock();
        while !*raised {
            self.condvar.wait(&mut raised);
        }
        *raised = false;
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`. Returns true
    /// when the flag was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut raised = self.flag.lock();
        if !*raised {
            let result = self.condvar.wait_for(&mut raised, timeout);
            if result.timed_out() && !*raised {
                return false;
            }
        }
        let consumed = *raised;
        *raised = false;
        consumed
    }

    /// Consume the flag if it is raised, without blocking.
    pub fn try_take(&self) -> bool {
        let mut raised = self.flag.lock();
        let consumed = *raised;
        *raised = false;
        consumed
    }
}
