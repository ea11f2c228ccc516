//! Position broadcast configuration: initial fix and velocity.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Initial fix and constant velocity of the broadcast position.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PositionConfig {
    /// If true, x/y are latitude/longitude in degrees instead of meters.
    #[serde(default)]
    pub geodetic: bool,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_z")]
    pub z: f64,

    /// Velocity vector in m/s applied between broadcast ticks.
    #[serde(default = "default_vx")]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default = "default_vz")]
    pub vz: f64,

    /// Interval between position broadcasts in seconds.
    #[serde(default = "default_broadcast_interval_secs")]
    #[validate(range(min = 0.1, max = 3600.0))]
    pub broadcast_interval_secs: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            geodetic: false,
            x: 0.0,
            y: 0.0,
            z: default_z(),
            vx: default_vx(),
            vy: 0.0,
            vz: default_vz(),
            broadcast_interval_secs: default_broadcast_interval_secs(),
        }
    }
}

fn default_z() -> f64 {
    1000.0
}

fn default_vx() -> f64 {
    1.0
}

fn default_vz() -> f64 {
    1.5
}

fn default_broadcast_interval_secs() -> f64 {
    5.0
}
