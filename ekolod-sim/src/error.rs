use std::io;

use thiserror::Error;

/// Errors from the simulator collaborators.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A template referenced a placeholder no value was supplied for.
    #[error("No value for template placeholder '{0}'")]
    Template(String),

    /// The simulator process could not be started.
    #[error("Failed to spawn simulator process: {0}")]
    Spawn(io::Error),

    /// I/O error while rendering scripts or capturing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
