//! Node identity and per-endpoint configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// A simulated sensor node, identified by an integer id (>= 1).
///
/// The id determines the derived port numbers on both the control channel
/// and the position channel (`base + id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeIdentity {
    pub id: u16,
}

impl NodeIdentity {
    pub fn new(id: u16) -> Self {
        debug_assert!(id >= 1, "node ids start at 1");
        Self { id }
    }
}

/// Control-channel transport of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Messaging role of a node on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends periodic test messages and receives responses.
    Initiator,
    /// Receive-only.
    Responder,
}

/// Immutable configuration of one endpoint worker, created at harness start.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub node: NodeIdentity,
    pub transport: Transport,
    pub role: Role,
    /// Interval between periodic sends; zero disables sending.
    pub send_interval: Duration,
    /// Simulator-side address of this node's control channel.
    pub peer_address: SocketAddr,
    /// Local bind address; required for UDP, unused for TCP.
    pub bind_address: Option<SocketAddr>,
    /// Bounded receive timeout of the worker's poll loop.
    pub poll_timeout: Duration,
    /// Connection attempts before a TCP worker gives up.
    pub connect_retries: u32,
}

impl EndpointConfig {
    /// The periodic test payload this node sends on the control channel.
    pub fn message_payload(&self) -> Vec<u8> {
        format!("Message from node {}", self.node.id).into_bytes()
    }

    /// Whether this endpoint drives a periodic sender at all.
    pub fn sending_enabled(&self) -> bool {
        self.role == Role::Initiator && !self.send_interval.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(role: Role, send_interval: Duration) -> EndpointConfig {
        EndpointConfig {
            node: NodeIdentity::new(3),
            transport: Transport::Tcp,
            role,
            send_interval,
            peer_address: "127.0.0.1:4003".parse().unwrap(),
            bind_address: None,
            poll_timeout: Duration::from_millis(200),
            connect_retries: 5,
        }
    }

    #[test]
    fn payload_names_the_node() {
        let config = config(Role::Initiator, Duration::from_secs(5));
        assert_eq!(config.message_payload(), b"Message from node 3");
    }

    #[test]
    fn zero_interval_disables_sending() {
        assert!(!config(Role::Initiator, Duration::ZERO).sending_enabled());
        assert!(!config(Role::Responder, Duration::from_secs(5)).sending_enabled());
        assert!(config(Role::Initiator, Duration::from_secs(5)).sending_enabled());
    }
}
