use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that end a single endpoint worker. None of these are fatal to the
/// harness as a whole; the controller reaps the worker and carries on.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// All connection attempts to the simulator were exhausted.
    #[error("Connection to {address} failed after {attempts} attempts")]
    ConnectFailure { address: SocketAddr, attempts: u32 },

    /// A UDP bind failed; never retried.
    #[error("Failed to bind UDP socket at {address}: {source}")]
    BindFailure {
        address: SocketAddr,
        source: io::Error,
    },

    /// A control-channel send failed with something other than a transient
    /// would-block condition.
    #[error("Control channel send failed: {0}")]
    SendFailure(io::Error),

    /// Any other socket error observed by the worker's loop.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
