//! UDP position broadcasting.
//!
//! A specialized periodic sender with a stateful payload: every tick the
//! position advances along a constant-velocity vector by the wall-clock
//! time elapsed since the previous tick, then goes out as the fixed
//! 25-byte packet. A failed transmission skips the tick but still advances
//! the elapsed-time baseline.

use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use ekolod_core::kinematics::{PositionState, Velocity};
use ekolod_core::packet::encode_position;
use ekolod_core::signal::StopSignal;

use crate::error::EndpointError;
use crate::node::NodeIdentity;
use crate::periodic::PeriodicSender;

/// Broadcasts one node's moving position over UDP until stopped.
pub struct PositionBroadcaster {
    node: NodeIdentity,
    destination: SocketAddr,
    interval: Duration,
    poll_interval: Duration,
    position: PositionState,
    velocity: Velocity,
    stop: StopSignal,
}

impl PositionBroadcaster {
    pub fn new(
        node: NodeIdentity,
        destination: SocketAddr,
        interval: Duration,
        position: PositionState,
        velocity: Velocity,
        stop: StopSignal,
    ) -> Self {
        Self {
            node,
            destination,
            interval,
            poll_interval: Duration::from_millis(200),
            position,
            velocity,
            stop,
        }
    }

    /// Handle to this broadcaster's stop flag.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs until the stop signal is set; the timer is cancelled and the
    /// socket released before this returns.
    pub fn run(self) -> Result<(), EndpointError> {
        let node = self.node.id;
        let destination = self.destination;
        let socket = UdpSocket::bind("0.0.0.0:0")?;

        info!("Sending position data for node {node} to {destination}");

        let velocity = self.velocity;
        let mut position = self.position;
        let mut last_update = Instant::now();
        let ticker = PeriodicSender::start(self.interval, move || {
            let now = Instant::now();
            let dt = now.duration_since(last_update).as_secs_f64();
            last_update = now;
            position.advance(velocity, dt);

            debug!("Sending position for node {node}: {position:?}");
            let packed = encode_position(&position);
            if let Err(error) = socket.send_to(&packed, destination) {
                // Skip this tick; the next one carries the advanced state.
                warn!("Error sending position data for node {node}: {error}");
            }
        });

        while !self.stop.is_triggered() {
            thread::sleep(self.poll_interval);
        }

        ticker.cancel();
        info!("Sending position data for node {node} stopped");
        Ok(())
    }
}
