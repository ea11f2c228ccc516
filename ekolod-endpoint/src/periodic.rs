//! Wait-then-fire repeat timer.
//!
//! The timer waits one full interval before the first invocation; there is
//! no immediate fire. Cancellation wakes the timer thread and joins it, so
//! no invocation is ever observed after `cancel()` returns.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct TimerState {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// A periodic callback runner on a dedicated timer thread.
///
/// Callers with `interval == 0` must not construct a sender at all; the
/// worker treats a zero interval as "sending disabled".
pub struct PeriodicSender {
    state: Arc<TimerState>,
    thread: Option<JoinHandle<()>>,
}

impl PeriodicSender {
    /// Starts invoking `tick` every `interval`, beginning one full interval
    /// from now.
    pub fn start<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let state = Arc::new(TimerState {
            cancelled: Mutex::new(false),
            wakeup: Condvar::new(),
        });

        let timer_state = Arc::clone(&state);
        let thread = thread::Builder::new()
            .name("periodic-sender".into())
            .spawn(move || loop {
                let deadline = Instant::now() + interval;
                let mut cancelled = timer_state.cancelled.lock();
                while !*cancelled {
                    if timer_state
                        .wakeup
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                if *cancelled {
                    return;
                }
                drop(cancelled);
                tick();
            })
            .expect("failed to spawn periodic sender thread");

        Self {
            state,
            thread: Some(thread),
        }
    }

    /// Stops the timer and joins its thread. Returns once no further `tick`
    /// can be observed; never blocks longer than the time left in the
    /// current interval plus one in-flight invocation.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        {
            let mut cancelled = self.state.cancelled.lock();
            *cancelled = true;
        }
        self.state.wakeup.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PeriodicSender {
    fn drop(&mut self) {
        self.shutdown();
    }
}
