//! Control-channel endpoint worker.
//!
//! One worker owns one socket for one node and runs a timeout-bounded
//! receive loop: `CONNECTING -> RUNNING -> STOPPING -> STOPPED`. The stop
//! signal is observed at least once per poll timeout, and the socket is
//! released on every exit path by drop.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

use tracing::{debug, error, info, trace, warn};

use ekolod_core::packet;
use ekolod_core::signal::StopSignal;

use crate::connector;
use crate::error::EndpointError;
use crate::node::{EndpointConfig, Transport};
use crate::periodic::PeriodicSender;

/// Receive buffer size for UDP control datagrams.
const MAX_DATAGRAM_LEN: usize = 1024;

/// A per-node endpoint worker. Runs to completion on its own thread.
pub struct EndpointWorker {
    config: EndpointConfig,
    stop: StopSignal,
}

impl EndpointWorker {
    pub fn new(config: EndpointConfig, stop: StopSignal) -> Self {
        Self { config, stop }
    }

    /// Handle to this worker's stop flag.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs the worker until its stop signal is set, the peer disconnects,
    /// or a socket error ends the loop. Consumes the worker; the socket is
    /// released before this returns.
    pub fn run(self) -> Result<(), EndpointError> {
        match self.config.transport {
            Transport::Tcp => run_tcp(&self.config, &self.stop),
            Transport::Udp => run_udp(&self.config, &self.stop),
        }
    }
}

fn run_tcp(config: &EndpointConfig, stop: &StopSignal) -> Result<(), EndpointError> {
    let node = config.node.id;
    let peer = config.peer_address;

    info!("Node {node}: connecting to {peer}");
    let mut stream = connector::connect(peer, config.connect_retries, connector::CONNECT_BACKOFF)?;
    debug!("Node {node} connected to {peer}");
    stream.set_read_timeout(Some(config.poll_timeout))?;

    let sender = if config.sending_enabled() {
        let send_stream = stream.try_clone()?;
        send_stream.set_write_timeout(Some(config.poll_timeout))?;
        let payload = config.message_payload();
        let sender_stop = stop.clone();
        Some(PeriodicSender::start(config.send_interval, move || {
            match write_all_retrying(&send_stream, &payload, &sender_stop) {
                Ok(true) => {
                    info!(
                        "Node {node} sent message '{}'",
                        String::from_utf8_lossy(&payload)
                    );
                }
                Ok(false) => {}
                Err(error) => {
                    error!("Node {node}: send failed: {error}");
                    sender_stop.trigger();
                }
            }
        }))
    } else {
        None
    };

    let result = tcp_receive_loop(&mut stream, node, peer, stop);

    if let Some(sender) = sender {
        sender.cancel();
    }
    info!("Node {node}: stopped");
    result
}

fn tcp_receive_loop(
    stream: &mut TcpStream,
    node: u16,
    peer: SocketAddr,
    stop: &StopSignal,
) -> Result<(), EndpointError> {
    while !stop.is_triggered() {
        match read_frame(stream, stop)? {
            FrameRead::Data(payload) => {
                info!(
                    "Node {node} received message: {}",
                    String::from_utf8_lossy(&payload)
                );
            }
            FrameRead::Idle => {}
            FrameRead::Closed => {
                // Peer-initiated close is a normal end of this worker, not
                // an error.
                warn!("Node {node}: disconnected from {peer}");
                break;
            }
        }
    }
    Ok(())
}

fn run_udp(config: &EndpointConfig, stop: &StopSignal) -> Result<(), EndpointError> {
    let node = config.node.id;
    let bind_address = config.bind_address.ok_or_else(|| {
        EndpointError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "UDP endpoint requires a bind address",
        ))
    })?;

    info!("Node {node}: UDP socket binding to {bind_address}");
    let socket = connector::bind_udp(bind_address)?;
    socket.set_read_timeout(Some(config.poll_timeout))?;

    let sender = if config.sending_enabled() {
        let send_socket = socket.try_clone()?;
        let payload = config.message_payload();
        let peer = config.peer_address;
        let sender_stop = stop.clone();
        Some(PeriodicSender::start(config.send_interval, move || {
            info!(
                "Node {node}: sending '{}' to {peer}",
                String::from_utf8_lossy(&payload)
            );
            if let Err(error) = send_socket.send_to(&payload, peer) {
                error!("Node {node}: send failed: {error}");
                sender_stop.trigger();
            }
        }))
    } else {
        None
    };

    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    let result = loop {
        if stop.is_triggered() {
            break Ok(());
        }
        match socket.recv_from(&mut buf) {
            Ok((len, _source)) if len > 0 => {
                // One datagram is one message; no framing on UDP.
                info!(
                    "Node {node} received message: {}",
                    String::from_utf8_lossy(&buf[..len])
                );
            }
            Ok(_) => {}
            Err(error) if is_transient(&error) => {}
            Err(error) => break Err(EndpointError::Io(error)),
        }
    };

    if let Some(sender) = sender {
        sender.cancel();
    }
    info!("Node {node}: stopped");
    result
}

enum FrameRead {
    /// A complete data frame payload.
    Data(Vec<u8>),
    /// Poll timeout or an ignorable frame; re-check the stop signal.
    Idle,
    /// Zero-length read: the peer closed the connection.
    Closed,
}

/// Reads one framed control message: a 2-byte `{type_tag, payload_length}`
/// header followed by the payload.
fn read_frame(stream: &mut TcpStream, stop: &StopSignal) -> Result<FrameRead, EndpointError> {
    let mut header = [0u8; packet::FRAME_HEADER_LEN];
    let first = match stream.read(&mut header) {
        Ok(0) => return Ok(FrameRead::Closed),
        Ok(n) => n,
        Err(error) if is_transient(&error) => return Ok(FrameRead::Idle),
        Err(error) => return Err(error.into()),
    };
    if first < header.len() && !fill_retrying(stream, &mut header[first..], stop)? {
        return Ok(FrameRead::Idle);
    }

    let (type_tag, payload_length) = packet::decode_frame_header(header);
    if type_tag != packet::DATA_FRAME_TAG {
        trace!("Ignoring frame with type tag {type_tag:#04x}");
        return Ok(FrameRead::Idle);
    }

    let mut payload = vec![0u8; payload_length];
    if !fill_retrying(stream, &mut payload, stop)? {
        return Ok(FrameRead::Idle);
    }
    Ok(FrameRead::Data(payload))
}

/// Reads exactly `buf.len()` bytes, retrying transient would-block
/// conditions. Returns false if a stop was requested before the buffer
/// filled.
fn fill_retrying(
    stream: &mut TcpStream,
    buf: &mut [u8],
    stop: &StopSignal,
) -> Result<bool, EndpointError> {
    let mut filled = 0;
    while filled < buf.len() {
        if stop.is_triggered() {
            return Ok(false);
        }
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(EndpointError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "peer closed mid-frame",
                )))
            }
            Ok(n) => filled += n,
            Err(error) if is_transient(&error) => {}
            Err(error) => return Err(error.into()),
        }
    }
    Ok(true)
}

/// Writes the whole payload, retrying transient would-block conditions and
/// surfacing every other error. Returns false if a stop was requested
/// before the write completed.
fn write_all_retrying(
    mut stream: &TcpStream,
    payload: &[u8],
    stop: &StopSignal,
) -> io::Result<bool> {
    let mut written = 0;
    while written < payload.len() {
        if stop.is_triggered() {
            return Ok(false);
        }
        match stream.write(&payload[written..]) {
            Ok(n) => written += n,
            Err(error) if is_transient(&error) => {}
            Err(error) => return Err(error),
        }
    }
    Ok(true)
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use tracing_test::traced_test;

    use crate::node::{NodeIdentity, Role};

    fn run_in_thread(worker: EndpointWorker) -> mpsc::Receiver<Result<(), EndpointError>> {
        let (done, result) = mpsc::channel();
        // Propagate the current tracing span into the worker thread so that
        // `#[traced_test]`'s span-prefixed `logs_contain` filter can see logs
        // emitted from this spawned thread.
        let span = tracing::Span::current();
        thread::spawn(move || {
            let _guard = span.enter();
            let _ = done.send(worker.run());
        });
        result
    }

    fn udp_config(node_id: u16, poll_timeout: Duration) -> EndpointConfig {
        EndpointConfig {
            node: NodeIdentity::new(node_id),
            transport: Transport::Udp,
            role: Role::Responder,
            send_interval: Duration::ZERO,
            peer_address: "127.0.0.1:4000".parse().unwrap(),
            bind_address: Some("127.0.0.1:0".parse().unwrap()),
            poll_timeout,
            connect_retries: 1,
        }
    }

    #[test]
    fn udp_worker_stops_within_two_poll_timeouts() {
        let poll_timeout = Duration::from_millis(200);
        let worker = EndpointWorker::new(udp_config(1, poll_timeout), StopSignal::new());
        let stop = worker.stop_signal();
        let result = run_in_thread(worker);

        thread::sleep(Duration::from_millis(100));
        let triggered_at = Instant::now();
        stop.trigger();

        result
            .recv_timeout(2 * poll_timeout)
            .expect("worker should unwind within two poll timeouts")
            .expect("a stopped worker exits cleanly");
        assert!(triggered_at.elapsed() <= 2 * poll_timeout);
    }

    #[test]
    fn tcp_peer_close_ends_the_worker_cleanly() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let peer_address = listener.local_addr().unwrap();

        let worker = EndpointWorker::new(
            EndpointConfig {
                node: NodeIdentity::new(1),
                transport: Transport::Tcp,
                role: Role::Responder,
                send_interval: Duration::ZERO,
                peer_address,
                bind_address: None,
                poll_timeout: Duration::from_millis(200),
                connect_retries: 3,
            },
            StopSignal::new(),
        );
        let result = run_in_thread(worker);

        let (accepted, _) = listener.accept().unwrap();
        drop(accepted); // peer-initiated close

        result
            .recv_timeout(Duration::from_secs(2))
            .expect("worker should observe the disconnect")
            .expect("peer close is not an error");
    }

    #[traced_test]
    #[test]
    fn tcp_worker_receives_framed_messages() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let peer_address = listener.local_addr().unwrap();

        let worker = EndpointWorker::new(
            EndpointConfig {
                node: NodeIdentity::new(9),
                transport: Transport::Tcp,
                role: Role::Responder,
                send_interval: Duration::ZERO,
                peer_address,
                bind_address: None,
                poll_timeout: Duration::from_millis(100),
                connect_retries: 3,
            },
            StopSignal::new(),
        );
        let stop = worker.stop_signal();
        let result = run_in_thread(worker);

        let (mut accepted, _) = listener.accept().unwrap();
        let frame = packet::encode_frame(packet::DATA_FRAME_TAG, b"sim says hello").unwrap();
        accepted.write_all(&frame).unwrap();

        thread::sleep(Duration::from_millis(300));
        stop.trigger();
        result
            .recv_timeout(Duration::from_secs(2))
            .unwrap()
            .unwrap();

        assert!(logs_contain("Node 9 received message: sim says hello"));
    }
}
