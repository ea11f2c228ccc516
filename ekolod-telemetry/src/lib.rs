//! # Ekolod Telemetry
//!
//! Logging initialization for the harness binaries and tests.

pub mod logging;

pub use logging::EventLogger;
