//! Run parameters: node counts, intervals, timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Parameters of one harness run.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RunConfig {
    /// Number of sending (initiator) nodes; one receiving node is always
    /// created in addition.
    #[serde(default = "default_num_nodes")]
    #[validate(range(min = 1, max = 250))]
    pub num_nodes: u16,

    /// Configured simulation run time in seconds. The external process is
    /// signalled once the doubled duration elapses.
    #[serde(default = "default_run_time_secs")]
    #[validate(range(min = 1))]
    pub run_time_secs: u64,

    /// Interval between periodic control messages; 0 disables sending.
    #[serde(default = "default_send_interval_secs")]
    pub send_interval_secs: f64,

    /// Connection attempts before a TCP worker gives up.
    #[serde(default = "default_connect_retries")]
    #[validate(range(min = 1, max = 60))]
    pub connect_retries: u32,

    /// Receive poll timeout for TCP control sockets, in milliseconds.
    #[serde(default = "default_tcp_poll_timeout_ms")]
    #[validate(range(min = 10, max = 30_000))]
    pub tcp_poll_timeout_ms: u64,

    /// Receive poll timeout for UDP control sockets, in milliseconds.
    #[serde(default = "default_udp_poll_timeout_ms")]
    #[validate(range(min = 10, max = 30_000))]
    pub udp_poll_timeout_ms: u64,

    /// Cadence of the controller's supervisory loop, in milliseconds.
    #[serde(default = "default_supervision_interval_ms")]
    #[validate(range(min = 10, max = 10_000))]
    pub supervision_interval_ms: u64,

    /// The whole harness is stopped after `run_time_secs` times this factor,
    /// whatever the external process is doing.
    #[serde(default = "default_overall_timeout_factor")]
    #[validate(range(min = 3, max = 100))]
    pub overall_timeout_factor: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_nodes: default_num_nodes(),
            run_time_secs: default_run_time_secs(),
            send_interval_secs: default_send_interval_secs(),
            connect_retries: default_connect_retries(),
            tcp_poll_timeout_ms: default_tcp_poll_timeout_ms(),
            udp_poll_timeout_ms: default_udp_poll_timeout_ms(),
            supervision_interval_ms: default_supervision_interval_ms(),
            overall_timeout_factor: default_overall_timeout_factor(),
        }
    }
}

impl RunConfig {
    pub fn run_time(&self) -> Duration {
        Duration::from_secs(self.run_time_secs)
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_secs_f64(self.send_interval_secs.max(0.0))
    }

    pub fn tcp_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_poll_timeout_ms)
    }

    pub fn udp_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.udp_poll_timeout_ms)
    }

    pub fn supervision_interval(&self) -> Duration {
        Duration::from_millis(self.supervision_interval_ms)
    }

    /// Hard deadline for the whole harness run.
    pub fn overall_deadline(&self) -> Duration {
        self.run_time() * self.overall_timeout_factor
    }
}

fn default_num_nodes() -> u16 {
    2
}

fn default_run_time_secs() -> u64 {
    15
}

fn default_send_interval_secs() -> f64 {
    5.0
}

fn default_connect_retries() -> u32 {
    5
}

fn default_tcp_poll_timeout_ms() -> u64 {
    5000
}

fn default_udp_poll_timeout_ms() -> u64 {
    200
}

fn default_supervision_interval_ms() -> u64 {
    1000
}

fn default_overall_timeout_factor() -> u32 {
    4
}
