use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Shared stop flag the worker loops sleep against, so a shutdown request
/// interrupts a wait instead of having to ride it out
pub struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub fn new() -> StopSignal {
        StopSignal {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Raises the stop flag and wakes every waiting thread
    pub fn signal(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        self.condvar.notify_all();
    }

    pub fn is_signalled(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Waits until the timeout elapses or the stop flag is raised, whichever
    /// comes first. Returns true when stopped.
    ///
    /// # Arguments
    ///
    /// * 'timeout' - how long to wait at most
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.stopped.lock().unwrap_or_else(|e| e.into_inner());

        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            let (guard, _) = self
                .condvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            stopped = guard;
        }

        true
    }
}
