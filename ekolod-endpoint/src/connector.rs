//! Socket establishment with bounded retries.
//!
//! TCP connects are retried a fixed number of times with a fixed backoff;
//! no exponential backoff. UDP binds are never retried.

use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::EndpointError;

/// Fixed pause between connection attempts.
pub const CONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Attempts a blocking connect to `address`, retrying up to `max_retries`
/// times with a fixed `backoff` between attempts.
pub fn connect(
    address: SocketAddr,
    max_retries: u32,
    backoff: Duration,
) -> Result<TcpStream, EndpointError> {
    let mut attempts = 0;
    while attempts < max_retries {
        match TcpStream::connect(address) {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                attempts += 1;
                warn!("Connection to {address} failed, reason: {error}");
                debug!("Attempt {attempts} of {max_retries}");
            }
        }
        thread::sleep(backoff);
    }
    Err(EndpointError::ConnectFailure { address, attempts })
}

/// Binds a UDP socket at `address`. A bind failure is immediately fatal to
/// the calling worker.
pub fn bind_udp(address: SocketAddr) -> Result<UdpSocket, EndpointError> {
    UdpSocket::bind(address).map_err(|source| EndpointError::BindFailure { address, source })
}
