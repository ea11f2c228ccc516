//! # ekolod-engine
//!
//! Harness orchestration: composes the per-node endpoint workers, the
//! position broadcaster and the external process monitor into one run,
//! supervises them on a fixed cadence and joins everything on shutdown.

mod controller;
mod error;
mod monitor;

pub use controller::{run_harness, HarnessController, HarnessOptions};
pub use error::EngineError;
pub use monitor::ProcessMonitor;
