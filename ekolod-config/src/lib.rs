//! # Ekolod Configuration System
//!
//! Layered configuration for the acoustic-network test harness.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth for all crates
//! - **Validation**: runtime validation of ports, intervals and counts
//! - **Environment Awareness**: `EKOLOD_*` variables override file values

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod network;
mod position;
mod run;
mod simulator;
mod validation;

pub use error::ConfigError;
pub use network::NetworkConfig;
pub use position::PositionConfig;
pub use run::RunConfig;
pub use simulator::SimulatorConfig;

/// Top-level configuration container for the harness.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct EkolodConfig {
    /// Control/position channel addressing.
    #[validate(nested)]
    pub network: NetworkConfig,

    /// Node counts, intervals and timeouts for one run.
    #[validate(nested)]
    pub run: RunConfig,

    /// Initial fix and velocity of the broadcast position.
    #[validate(nested)]
    pub position: PositionConfig,

    /// External simulator process and script locations.
    #[validate(nested)]
    pub simulator: SimulatorConfig,
}

impl EkolodConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/ekolod.yaml` - base settings. If missing, defaults are used.
    /// 3. `EKOLOD_*` environment variables (`__` separates nesting levels).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(EkolodConfig::default()));

        if Path::new("config/ekolod.yaml").exists() {
            figment = figment.merge(Yaml::file("config/ekolod.yaml"));
        }

        figment
            .merge(Env::prefixed("EKOLOD_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path, still honoring env overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(EkolodConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("EKOLOD_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = EkolodConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn environment_override() {
        std::env::set_var("EKOLOD_RUN__NUM_NODES", "7");
        let config = EkolodConfig::load().unwrap();
        assert_eq!(config.run.num_nodes, 7);
        std::env::remove_var("EKOLOD_RUN__NUM_NODES");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = EkolodConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn rejects_invalid_port_base() {
        let mut config = EkolodConfig::default();
        config.network.control_port_base = 80;
        assert!(config.validate().is_err());
    }
}
