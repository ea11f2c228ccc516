//! # ekolod-endpoint
//!
//! Per-node endpoint workers for the acoustic-network test harness.
//!
//! Each simulated sensor node owns exactly one control-channel socket and
//! runs on its own thread: a timeout-bounded receive loop, an optional
//! periodic sender sharing the same OS socket, and a cooperative stop
//! signal. The position broadcaster is a specialized periodic sender that
//! integrates a constant-velocity model between ticks.
//!
//! ### Key Submodules:
//! - `connector`: bounded-retry TCP connect and UDP bind
//! - `periodic`: wait-then-fire repeat timer with join-on-cancel
//! - `worker`: the control-channel endpoint loop
//! - `broadcaster`: UDP position broadcasting

pub mod broadcaster;
pub mod connector;
mod error;
pub mod node;
pub mod periodic;
pub mod worker;

pub use broadcaster::PositionBroadcaster;
pub use error::EndpointError;
pub use node::{EndpointConfig, NodeIdentity, Role, Transport};
pub use periodic::PeriodicSender;
pub use worker::EndpointWorker;
