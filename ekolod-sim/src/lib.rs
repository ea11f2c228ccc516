//! # ekolod-sim
//!
//! Collaborator surfaces around the external acoustic-network simulator:
//! rendering its run scripts from templates, spawning and capturing the
//! process, and discovering live instances by name for the monitor.

pub mod ansi;
mod error;
pub mod process;
pub mod script;

pub use error::SimulatorError;
pub use process::{ProcessHandle, ProcessSupervisor, SimulatorProcess, SystemProcesses};
pub use script::{generate_launcher, generate_simulation_script, ScriptParams};
