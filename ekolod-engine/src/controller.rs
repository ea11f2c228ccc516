//! Harness controller.
//!
//! Creates sockets, workers, broadcaster and monitor in dependency order,
//! starts every worker concurrently, then supervises on a fixed cadence:
//! poll the monitor, propagate stops, reap finished workers. The loop ends
//! when the active set is empty; an interrupt is a normal shutdown
//! request, not an error.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use ekolod_config::EkolodConfig;
use ekolod_core::kinematics::{PositionState, Velocity};
use ekolod_core::signal::StopSignal;
use ekolod_endpoint::{
    EndpointConfig, EndpointError, EndpointWorker, NodeIdentity, PositionBroadcaster, Role,
    Transport,
};
use ekolod_sim::{
    generate_launcher, generate_simulation_script, ProcessSupervisor, ScriptParams,
    SimulatorProcess, SystemProcesses,
};

use crate::error::EngineError;
use crate::monitor::ProcessMonitor;

/// Per-invocation options coming from the CLI.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Simulator build directory, sourced by the generated launcher.
    pub build_dir: PathBuf,
    /// Start (and monitor) the simulator locally. Disabled for runs where
    /// the simulator is driven remotely.
    pub start_simulator: bool,
    /// Control-channel transport for all nodes.
    pub transport: Transport,
}

struct ActiveWorker {
    name: String,
    stop: StopSignal,
    handle: JoinHandle<Result<(), EndpointError>>,
}

/// Supervises one harness run: N endpoint workers, one position
/// broadcaster, one process monitor.
pub struct HarnessController {
    config: EkolodConfig,
    transport: Transport,
    harness_stop: StopSignal,
}

impl HarnessController {
    pub fn new(config: EkolodConfig, transport: Transport) -> Self {
        Self {
            config,
            transport,
            harness_stop: StopSignal::new(),
        }
    }

    /// Handle to the harness-wide stop flag.
    pub fn harness_stop(&self) -> StopSignal {
        self.harness_stop.clone()
    }

    /// Runs the harness to completion. With a supervisor, the external
    /// process is monitored and its disappearance stops the run; without
    /// one, only an interrupt or the overall deadline ends it.
    pub async fn run<S>(&self, supervisor: Option<S>) -> Result<(), EngineError>
    where
        S: ProcessSupervisor + 'static,
    {
        let mut workers = self.spawn_workers();
        let mut monitor = supervisor.map(|supervisor| {
            ProcessMonitor::new(
                supervisor,
                self.config.simulator.process_name.clone(),
                self.config.run.run_time(),
                self.harness_stop.clone(),
            )
        });

        let started = Instant::now();
        let deadline = self.config.run.overall_deadline();
        let cadence = self.config.run.supervision_interval();
        let mut interrupted = false;

        while !workers.is_empty() {
            tokio::select! {
                _ = sleep(cadence) => {}
                _ = tokio::signal::ctrl_c(), if !interrupted => {
                    interrupted = true;
                    info!("Interrupt received, shutting down");
                    self.harness_stop.trigger();
                }
            }

            if let Some(monitor) = monitor.as_mut() {
                monitor.poll();
            }

            if started.elapsed() > deadline {
                warn!(
                    "Harness deadline of {}s exceeded, forcing stop",
                    deadline.as_secs()
                );
                self.harness_stop.trigger();
            }

            if self.harness_stop.is_triggered() {
                for worker in &workers {
                    worker.stop.trigger();
                }
            }

            // Reap: join whatever terminated since the last pass.
            let mut active = Vec::with_capacity(workers.len());
            for worker in workers.drain(..) {
                if !worker.handle.is_finished() {
                    active.push(worker);
                    continue;
                }
                match worker.handle.await {
                    Ok(Ok(())) => debug!("{} finished", worker.name),
                    Ok(Err(error)) => error!("{} failed: {error}", worker.name),
                    Err(join_error) => error!("{} panicked: {join_error}", worker.name),
                }
            }
            workers = active;
        }

        info!("All workers joined");
        Ok(())
    }

    /// One receive-only node, `num_nodes` sending nodes, one broadcaster.
    fn spawn_workers(&self) -> Vec<ActiveWorker> {
        let mut workers = Vec::new();

        workers.push(self.spawn_endpoint(1, Role::Responder, Duration::ZERO));
        for index in 0..self.config.run.num_nodes {
            let node_id = index + 2;
            debug!("Creating send node {node_id}");
            workers.push(self.spawn_endpoint(
                node_id,
                Role::Initiator,
                self.config.run.send_interval(),
            ));
        }
        workers.push(self.spawn_broadcaster(1));

        workers
    }

    fn spawn_endpoint(&self, node_id: u16, role: Role, send_interval: Duration) -> ActiveWorker {
        let network = &self.config.network;
        let run = &self.config.run;

        let endpoint = EndpointConfig {
            node: NodeIdentity::new(node_id),
            transport: self.transport,
            role,
            send_interval,
            peer_address: network
                .control_address(node_id)
                .parse()
                .expect("derived control address must parse"),
            bind_address: match self.transport {
                Transport::Tcp => None,
                Transport::Udp => Some(
                    network
                        .local_address(node_id)
                        .parse()
                        .expect("derived local address must parse"),
                ),
            },
            poll_timeout: match self.transport {
                Transport::Tcp => run.tcp_poll_timeout(),
                Transport::Udp => run.udp_poll_timeout(),
            },
            connect_retries: run.connect_retries,
        };

        let worker = EndpointWorker::new(endpoint, StopSignal::new());
        let stop = worker.stop_signal();
        ActiveWorker {
            name: format!("node-{node_id}"),
            stop,
            handle: tokio::task::spawn_blocking(move || worker.run()),
        }
    }

    fn spawn_broadcaster(&self, node_id: u16) -> ActiveWorker {
        let position = &self.config.position;
        let broadcaster = PositionBroadcaster::new(
            NodeIdentity::new(node_id),
            self.config
                .network
                .position_address(node_id)
                .parse()
                .expect("derived position address must parse"),
            Duration::from_secs_f64(position.broadcast_interval_secs),
            PositionState::new(position.geodetic, position.x, position.y, position.z),
            Velocity::new(position.vx, position.vy, position.vz),
            StopSignal::new(),
        );
        let stop = broadcaster.stop_signal();
        ActiveWorker {
            name: format!("position-broadcaster-{node_id}"),
            stop,
            handle: tokio::task::spawn_blocking(move || broadcaster.run()),
        }
    }
}

/// Full harness run as invoked from the CLI: render the simulator scripts,
/// optionally start and capture the simulator, run the controller, then
/// shut the simulator down.
pub async fn run_harness(config: EkolodConfig, options: HarnessOptions) -> Result<(), EngineError> {
    let simulator_config = &config.simulator;

    let params = ScriptParams {
        num_nodes: config.run.num_nodes,
        run_time_secs: config.run.run_time_secs,
        protocol: match options.transport {
            Transport::Tcp => "tcp".into(),
            Transport::Udp => "udp".into(),
        },
        host: config.network.host.clone(),
        control_port_base: config.network.control_port_base,
        local_port_base: config.network.local_port_base,
        position_port_base: config.network.position_port_base,
    };
    generate_simulation_script(
        &simulator_config.template_path,
        &simulator_config.script_path,
        &params,
    )?;
    generate_launcher(
        &simulator_config.launcher_path,
        &options.build_dir,
        &simulator_config.script_path,
    )?;

    let simulator = if options.start_simulator {
        Some(SimulatorProcess::spawn(
            &simulator_config.launcher_path,
            &simulator_config.stdout_log,
            &simulator_config.stderr_log,
        )?)
    } else {
        None
    };

    let controller = HarnessController::new(config, options.transport);
    let supervisor = options.start_simulator.then_some(SystemProcesses);
    let result = controller.run(supervisor).await;

    if let Some(simulator) = simulator {
        // Stopping the launcher also ends the output capture threads.
        simulator.shutdown()?;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use ekolod_sim::ProcessHandle;

    #[derive(Clone)]
    struct FakeSupervisor {
        alive: Arc<AtomicBool>,
    }

    impl ProcessSupervisor for FakeSupervisor {
        fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHandle> {
            if self.alive.load(Ordering::SeqCst) {
                vec![ProcessHandle {
                    pid: 1234,
                    name: name.to_string(),
                }]
            } else {
                Vec::new()
            }
        }

        fn terminate(&self, _process: &ProcessHandle) -> io::Result<()> {
            Ok(())
        }
    }

    /// Plays the simulator side of the control channel: accepts every
    /// connection on the node's port and holds it open.
    fn accept_and_hold(port: u16) -> TcpListener {
        let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
        let acceptor = listener.try_clone().unwrap();
        thread::spawn(move || {
            let mut held = Vec::new();
            while let Ok((stream, _)) = acceptor.accept() {
                held.push(stream);
            }
        });
        listener
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn harness_stops_when_the_simulator_disappears() {
        let mut config = EkolodConfig::default();
        config.network.control_port_base = 47500;
        config.network.position_port_base = 47600;
        config.run.num_nodes = 2;
        config.run.run_time_secs = 60; // doubled deadline never reached here
        config.run.send_interval_secs = 1.0;
        config.run.tcp_poll_timeout_ms = 200;
        config.run.supervision_interval_ms = 200;

        // 1 responder + 2 initiators.
        let _listeners: Vec<_> = (1..=3)
            .map(|id| accept_and_hold(config.network.control_port_base + id))
            .collect();

        let alive = Arc::new(AtomicBool::new(true));
        let supervisor = FakeSupervisor {
            alive: Arc::clone(&alive),
        };

        let controller = HarnessController::new(config, Transport::Tcp);
        let run = tokio::spawn(async move { controller.run(Some(supervisor)).await });

        // Let everything connect, then let the "simulator" vanish.
        tokio::time::sleep(Duration::from_millis(800)).await;
        alive.store(false, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("controller should join all workers after the stop")
            .expect("controller task must not panic")
            .expect("run exits cleanly");
    }
}
