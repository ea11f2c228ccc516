//! Network endpoint configuration.
//!
//! Port derivation follows the simulator convention: node `id` talks on
//! `base + id` for both the control channel and the position channel.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Addressing for the control and position channels.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct NetworkConfig {
    /// Host the simulator listens on (loopback for local runs).
    #[serde(default = "default_host")]
    #[validate(custom(function = validation::validate_host))]
    pub host: String,

    /// Port base of the control channel; node `id` uses `base + id`.
    #[serde(default = "default_control_port_base")]
    #[validate(custom(function = validation::validate_port_base))]
    pub control_port_base: u16,

    /// Port base of the UDP position channel; node `id` uses `base + id`.
    #[serde(default = "default_position_port_base")]
    #[validate(custom(function = validation::validate_port_base))]
    pub position_port_base: u16,

    /// Local bind port base for UDP responder sockets.
    #[serde(default = "default_local_port_base")]
    #[validate(custom(function = validation::validate_port_base))]
    pub local_port_base: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            control_port_base: default_control_port_base(),
            position_port_base: default_position_port_base(),
            local_port_base: default_local_port_base(),
        }
    }
}

impl NetworkConfig {
    /// Control-channel address of the given node on the simulator side.
    pub fn control_address(&self, node_id: u16) -> String {
        format!("{}:{}", self.host, self.control_port_base + node_id)
    }

    /// Position-channel address of the given node on the simulator side.
    pub fn position_address(&self, node_id: u16) -> String {
        format!("{}:{}", self.host, self.position_port_base + node_id)
    }

    /// Local UDP bind address for the given node.
    pub fn local_address(&self, node_id: u16) -> String {
        format!("{}:{}", self.host, self.local_port_base + node_id)
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_control_port_base() -> u16 {
    4000
}

fn default_position_port_base() -> u16 {
    5000
}

fn default_local_port_base() -> u16 {
    6000
}
