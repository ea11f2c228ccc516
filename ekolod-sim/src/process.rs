//! External simulator process supervision.
//!
//! Spawning with piped output capture, discovery of live instances by
//! process name, and graceful termination signalling. Discovery is a name
//! match only; there is no PID file and no IPC handshake with the
//! simulator.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::ansi::strip_ansi;
use crate::error::SimulatorError;

/// A live external process found by name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: i32,
    pub name: String,
}

impl ProcessHandle {
    /// Sends SIGTERM. A process that exited between lookup and signal is
    /// not an error.
    pub fn terminate(&self) -> io::Result<()> {
        // SAFETY: kill with a valid signal number has no memory effects.
        let rc = unsafe { libc::kill(self.pid, libc::SIGTERM) };
        if rc == 0 {
            return Ok(());
        }
        let error = io::Error::last_os_error();
        if error.raw_os_error() == Some(libc::ESRCH) {
            Ok(())
        } else {
            Err(error)
        }
    }
}

/// Process discovery and termination, injectable so the monitor can be
/// driven deterministically under test.
pub trait ProcessSupervisor: Send {
    /// All live processes whose name matches exactly.
    fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHandle>;

    /// Delivers a graceful terminate signal to one discovered process.
    fn terminate(&self, process: &ProcessHandle) -> io::Result<()> {
        process.terminate()
    }
}

/// Name lookup against the real process table, via `pgrep -x`.
pub struct SystemProcesses;

impl ProcessSupervisor for SystemProcesses {
    fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHandle> {
        let output = match Command::new("pgrep").arg("-x").arg(name).output() {
            Ok(output) => output,
            Err(error) => {
                warn!("pgrep failed: {error}");
                return Vec::new();
            }
        };
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse::<i32>().ok())
            .map(|pid| ProcessHandle {
                pid,
                name: name.to_string(),
            })
            .collect()
    }
}

/// The spawned simulator run: the child process plus the capture threads
/// draining its stdout/stderr into log files.
pub struct SimulatorProcess {
    child: Child,
    capture: Vec<JoinHandle<()>>,
}

impl SimulatorProcess {
    /// Starts the simulator through its rendered launcher script and
    /// begins capturing output.
    ///
    /// Stdout lines are echoed to the harness's stdout and persisted
    /// ANSI-stripped to `stdout_log`; stderr lines are logged as errors
    /// and persisted raw to `stderr_log`.
    pub fn spawn(
        launcher: &Path,
        stdout_log: &Path,
        stderr_log: &Path,
    ) -> Result<Self, SimulatorError> {
        let mut child = Command::new("/bin/bash")
            .arg(launcher)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SimulatorError::Spawn)?;

        let stdout = child.stdout.take().expect("stdout was requested piped");
        let stderr = child.stderr.take().expect("stderr was requested piped");
        let out_file = File::create(stdout_log)?;
        let err_file = File::create(stderr_log)?;

        let capture = vec![
            spawn_capture_thread("sim-stdout", stdout, out_file, true),
            spawn_capture_thread("sim-stderr", stderr, err_file, false),
        ];

        info!("Simulator started (pid {})", child.id());
        Ok(Self { child, capture })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Sends SIGTERM to the launcher shell.
    pub fn terminate(&self) -> io::Result<()> {
        ProcessHandle {
            pid: self.child.id() as i32,
            name: String::new(),
        }
        .terminate()
    }

    /// Terminates the launcher, waits for it, and joins the capture
    /// threads once the pipes have drained.
    pub fn shutdown(mut self) -> Result<(), SimulatorError> {
        self.terminate()?;
        let status = self.child.wait()?;
        info!("Simulator exited with {status}");
        for handle in self.capture {
            let _ = handle.join();
        }
        Ok(())
    }
}

fn spawn_capture_thread<R>(
    name: &str,
    pipe: R,
    mut sink: File,
    strip: bool,
) -> JoinHandle<()>
where
    R: io::Read + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut reader = BufReader::new(pipe);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break, // pipe closed, process gone
                    Ok(_) => {
                        if strip {
                            let _ = io::stdout().write_all(&line);
                            let _ = io::stdout().flush();
                            let _ = sink.write_all(&strip_ansi(&line));
                        } else {
                            error!("simulator: {}", String::from_utf8_lossy(&line).trim_end());
                            let _ = sink.write_all(&line);
                        }
                    }
                    Err(error) => {
                        warn!("Capture of simulator output failed: {error}");
                        break;
                    }
                }
            }
            info!("Observed process terminated, closing capture");
        })
        .expect("failed to spawn capture thread")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminating_a_vanished_pid_is_not_an_error() {
        // Far beyond pid_max, so the kill can only report ESRCH.
        let handle = ProcessHandle {
            pid: i32::MAX,
            name: "ghost".into(),
        };
        assert!(handle.terminate().is_ok());
    }

    #[test]
    fn lookup_of_an_unlikely_name_is_empty() {
        let processes = SystemProcesses.list_processes_by_name("ekolod-no-such-process");
        assert!(processes.is_empty());
    }
}
