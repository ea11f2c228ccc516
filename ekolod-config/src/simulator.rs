//! External simulator configuration: process name, script and log paths.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Where the simulator lives and how its run is materialized on disk.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SimulatorConfig {
    /// Process name used for liveness lookup and termination signalling.
    #[serde(default = "default_process_name")]
    #[validate(length(min = 1, max = 32))]
    pub process_name: String,

    /// Simulation script template with `%$%{NAME}` placeholders.
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Rendered simulation script handed to the simulator.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Rendered launcher script that sources the simulator environment.
    #[serde(default = "default_launcher_path")]
    pub launcher_path: PathBuf,

    /// Captured simulator stdout, ANSI-stripped.
    #[serde(default = "default_stdout_log")]
    pub stdout_log: PathBuf,

    /// Captured simulator stderr.
    #[serde(default = "default_stderr_log")]
    pub stderr_log: PathBuf,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            process_name: default_process_name(),
            template_path: default_template_path(),
            script_path: default_script_path(),
            launcher_path: default_launcher_path(),
            stdout_log: default_stdout_log(),
            stderr_log: default_stderr_log(),
        }
    }
}

fn default_process_name() -> String {
    "ns".into()
}

fn default_template_path() -> PathBuf {
    "uwAppPos_UDP.tmpl".into()
}

fn default_script_path() -> PathBuf {
    "uwAppPos_UDP.tcl".into()
}

fn default_launcher_path() -> PathBuf {
    "run.sh".into()
}

fn default_stdout_log() -> PathBuf {
    "ns_run.log".into()
}

fn default_stderr_log() -> PathBuf {
    "ns_run.err".into()
}
