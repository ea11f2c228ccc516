//! External process monitor.
//!
//! Watches the simulator by name lookup only. Two independent concerns per
//! poll: if the run has lasted twice the configured run time, every
//! matching instance gets one graceful terminate signal and the elapsed
//! baseline resets (so the signal is not repeated every poll); if no
//! instance is found at all, the simulation is considered finished and the
//! harness-wide stop is set. Propagating that stop to the individual
//! workers is the controller's job, not this component's.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use ekolod_core::signal::StopSignal;
use ekolod_sim::ProcessSupervisor;

pub struct ProcessMonitor<S: ProcessSupervisor> {
    supervisor: S,
    process_name: String,
    run_time: Duration,
    baseline: Instant,
    harness_stop: StopSignal,
}

impl<S: ProcessSupervisor> ProcessMonitor<S> {
    pub fn new(
        supervisor: S,
        process_name: impl Into<String>,
        run_time: Duration,
        harness_stop: StopSignal,
    ) -> Self {
        Self {
            supervisor,
            process_name: process_name.into(),
            run_time,
            baseline: Instant::now(),
            harness_stop,
        }
    }

    /// One supervisory check against the current wall clock.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    fn poll_at(&mut self, now: Instant) {
        if now.duration_since(self.baseline) > 2 * self.run_time {
            info!(
                "Double of run time is over, stopping {}",
                self.process_name
            );
            for process in self.supervisor.list_processes_by_name(&self.process_name) {
                if let Err(error) = self.supervisor.terminate(&process) {
                    warn!("Failed to signal pid {}: {error}", process.pid);
                }
            }
            // Restart the window so the signal is not repeated next poll.
            self.baseline = now;
        }

        if self
            .supervisor
            .list_processes_by_name(&self.process_name)
            .is_empty()
        {
            info!("{} is no longer running, requesting harness stop", self.process_name);
            self.harness_stop.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use ekolod_sim::ProcessHandle;

    #[derive(Clone, Default)]
    struct FakeSupervisor {
        alive: Arc<AtomicBool>,
        terminations: Arc<AtomicUsize>,
    }

    impl ProcessSupervisor for FakeSupervisor {
        fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHandle> {
            if self.alive.load(Ordering::SeqCst) {
                vec![ProcessHandle {
                    pid: 4321,
                    name: name.to_string(),
                }]
            } else {
                Vec::new()
            }
        }

        fn terminate(&self, _process: &ProcessHandle) -> io::Result<()> {
            self.terminations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn monitor_with_fake(
        run_time: Duration,
    ) -> (ProcessMonitor<FakeSupervisor>, FakeSupervisor, StopSignal) {
        let fake = FakeSupervisor::default();
        fake.alive.store(true, Ordering::SeqCst);
        let stop = StopSignal::new();
        let monitor = ProcessMonitor::new(fake.clone(), "ns", run_time, stop.clone());
        (monitor, fake, stop)
    }

    #[test]
    fn termination_fires_once_per_window() {
        let (mut monitor, fake, _stop) = monitor_with_fake(Duration::from_secs(10));
        let start = monitor.baseline;

        monitor.poll_at(start + Duration::from_secs(19));
        assert_eq!(fake.terminations.load(Ordering::SeqCst), 0);

        monitor.poll_at(start + Duration::from_secs(21));
        assert_eq!(fake.terminations.load(Ordering::SeqCst), 1);

        // Within the next 20s window the signal must not repeat.
        monitor.poll_at(start + Duration::from_secs(25));
        monitor.poll_at(start + Duration::from_secs(40));
        assert_eq!(fake.terminations.load(Ordering::SeqCst), 1);

        // A full window after the reset it fires again.
        monitor.poll_at(start + Duration::from_secs(42));
        assert_eq!(fake.terminations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn vanished_process_requests_harness_stop() {
        let (mut monitor, fake, stop) = monitor_with_fake(Duration::from_secs(10));
        let start = monitor.baseline;

        monitor.poll_at(start + Duration::from_secs(1));
        assert!(!stop.is_triggered());

        fake.alive.store(false, Ordering::SeqCst);
        monitor.poll_at(start + Duration::from_secs(2));
        assert!(stop.is_triggered());
    }
}
