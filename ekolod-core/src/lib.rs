//! # ekolod-core
//!
//! Foundation layer for the Ekolod acoustic-network test harness.
//! Holds the pieces every other crate agrees on: cooperative stop
//! signalling, the constant-velocity position model, and the wire
//! codecs shared with the external simulator.
//!
//! ### Key Submodules:
//! - `signal`: sticky atomic stop flags for cooperative cancellation
//! - `kinematics`: constant-velocity position integration
//! - `packet`: position packet and control-channel frame codecs

pub mod kinematics;
pub mod packet;
pub mod signal;

pub mod prelude {
    pub use crate::kinematics::*;
    pub use crate::packet::*;
    pub use crate::signal::*;
}

pub use signal::StopSignal;
