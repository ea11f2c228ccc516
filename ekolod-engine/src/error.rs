use thiserror::Error;

use ekolod_config::ConfigError;
use ekolod_endpoint::EndpointError;
use ekolod_sim::SimulatorError;

/// Errors surfaced by the harness engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
