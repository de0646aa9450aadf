//! Agent side of the reverse connection.
//!
//! The agent cannot accept inbound connections, so it dials the controller's
//! loopback listener, serves requests until the peer goes away, waits a fixed
//! delay and dials again. At most one session exists at a time.

use std::io;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::net::Shutdown;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use ui_spy_common::mutex_lock_or_recover;
use ui_spy_ipc::FrameError;
use ui_spy_ipc::FrameReader;
use ui_spy_ipc::FrameWriter;
use ui_spy_ipc::JsonCodec;
use ui_spy_ipc::RpcRequest;
use ui_spy_ipc::RpcResponse;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::router;
use crate::service::AutomationService;

const CHANNEL_CAPACITY: usize = 128;
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);
/// Responses are serialized on worker threads; deep trees need the room.
const WORKER_STACK_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    Idle,
    Dialing,
    Paired,
}

struct Shared {
    state: Mutex<ConnectorState>,
    current: Mutex<Option<TcpStream>>,
    shutdown: AtomicBool,
    pairings: AtomicU64,
}

impl Shared {
    fn set_state(&self, state: ConnectorState) {
        *mutex_lock_or_recover(&self.state) = state;
    }

    fn close_current(&self) -> bool {
        match mutex_lock_or_recover(&self.current).as_ref() {
            Some(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
                true
            }
            None => false,
        }
    }
}

/// Cloneable control surface for a running connector.
#[derive(Clone)]
pub struct ConnectorHandle {
    shared: Arc<Shared>,
}

impl ConnectorHandle {
    pub fn state(&self) -> ConnectorState {
        *mutex_lock_or_recover(&self.shared.state)
    }

    pub fn pairings(&self) -> u64 {
        self.shared.pairings.load(Ordering::SeqCst)
    }

    /// Forces the current session closed; the connector re-dials after its delay.
    pub fn drop_session(&self) -> bool {
        self.shared.close_current()
    }

    /// Stops dialing and closes any live session.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.close_current();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }
}

pub struct ReverseConnector {
    config: AgentConfig,
    service: Arc<AutomationService>,
    codec: JsonCodec,
    shared: Arc<Shared>,
}

impl ReverseConnector {
    pub fn new(config: AgentConfig, service: Arc<AutomationService>) -> Self {
        let codec = JsonCodec::new(config.max_depth);
        Self {
            config,
            service,
            codec,
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectorState::Idle),
                current: Mutex::new(None),
                shutdown: AtomicBool::new(false),
                pairings: AtomicU64::new(0),
            }),
        }
    }

    pub fn handle(&self) -> ConnectorHandle {
        ConnectorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn endpoint(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.config.port))
    }

    /// Runs the dial loop on a background thread.
    pub fn spawn(self) -> Result<(ConnectorHandle, thread::JoinHandle<()>), AgentError> {
        let handle = self.handle();
        let join = thread::Builder::new()
            .name("spy-connector".to_string())
            .spawn(move || self.run())
            .map_err(|source| AgentError::Spawn {
                what: "connector thread",
                source,
            })?;
        Ok((handle, join))
    }

    /// Dials, serves, waits, repeats. Returns once shut down.
    pub fn run(&self) {
        let endpoint = self.endpoint();
        info!(endpoint = %endpoint, "Spy connector started (reverse connection mode)");

        while !self.is_shutdown() {
            self.shared.set_state(ConnectorState::Dialing);
            match self.dial(endpoint) {
                Ok(stream) => {
                    self.shared.set_state(ConnectorState::Paired);
                    self.shared.pairings.fetch_add(1, Ordering::SeqCst);
                    info!(endpoint = %endpoint, "Connected to controller");
                    if let Err(e) = self.host_session(stream) {
                        error!(error = %e, "Session ended abnormally");
                    }
                    info!("Controller disconnected");
                }
                Err(e) if is_expected_dial_failure(&e) => {
                    debug!(endpoint = %endpoint, error = %e, "Controller not listening yet");
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Dial failed");
                }
            }
            self.shared.set_state(ConnectorState::Idle);
            self.wait_before_redial();
        }

        info!("Spy connector stopped");
    }

    fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    fn dial(&self, endpoint: SocketAddr) -> io::Result<TcpStream> {
        let stream = TcpStream::connect_timeout(&endpoint, self.config.dial_timeout)?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn wait_before_redial(&self) {
        let deadline = Instant::now() + self.config.reconnect_delay;
        while !self.is_shutdown() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SHUTDOWN_POLL));
        }
    }

    /// Serves one paired connection until the peer leaves or I/O fails.
    fn host_session(&self, stream: TcpStream) -> Result<(), AgentError> {
        let read_half = stream.try_clone()?;
        let control = stream.try_clone()?;
        *mutex_lock_or_recover(&self.shared.current) = Some(control);
        if self.is_shutdown() {
            let _ = stream.shutdown(Shutdown::Both);
        }

        let writer = Arc::new(Mutex::new(FrameWriter::new(stream)));
        let pool = WorkerPool::new(
            self.config.request_workers,
            Arc::clone(&self.service),
            Arc::clone(&writer),
            self.codec,
        );

        let result = match pool {
            Ok(pool) => {
                self.read_requests(read_half, &writer, &pool);
                pool.shutdown();
                Ok(())
            }
            Err(e) => Err(e),
        };

        if let Some(stream) = mutex_lock_or_recover(&self.shared.current).take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        result
    }

    fn read_requests(
        &self,
        read_half: TcpStream,
        writer: &Arc<Mutex<FrameWriter<TcpStream>>>,
        pool: &WorkerPool,
    ) {
        let mut reader = FrameReader::new(BufReader::new(read_half), self.config.max_frame_bytes);
        loop {
            let frame = match reader.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(FrameError::TooLarge { len, max }) => {
                    warn!(len, max, "Request frame too large, closing session");
                    let message = format!("request of {} bytes exceeds {} byte limit", len, max);
                    write_response(writer, self.codec, &router::parse_error(&message));
                    break;
                }
                Err(FrameError::Io(e)) => {
                    debug!(error = %e, "Session read ended");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Malformed frame, closing session");
                    break;
                }
            };

            match self.codec.decode::<RpcRequest>(&frame) {
                Ok(request) => {
                    if pool.execute(request).is_err() {
                        warn!("Request workers gone, closing session");
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Undecodable request");
                    write_response(writer, self.codec, &router::parse_error(&e.to_string()));
                }
            }
        }
    }
}

fn is_expected_dial_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

fn write_response(
    writer: &Mutex<FrameWriter<TcpStream>>,
    codec: JsonCodec,
    response: &RpcResponse,
) {
    let body = match codec.encode(response) {
        Ok(body) => body,
        Err(e) => {
            warn!(id = response.id, error = %e, "Response could not be encoded");
            let fallback = RpcResponse::error(response.id, e.code(), &e.to_string());
            match codec.encode(&fallback) {
                Ok(body) => body,
                Err(_) => return,
            }
        }
    };
    if let Err(e) = mutex_lock_or_recover(writer).write_frame(&body) {
        debug!(id = response.id, error = %e, "Failed to write response");
    }
}

/// Fixed set of request workers for one session. Requests run concurrently
/// and each marshals its own unit of work onto the UI thread.
struct WorkerPool {
    workers: Vec<thread::JoinHandle<()>>,
    sender: Sender<RpcRequest>,
}

impl WorkerPool {
    fn new(
        size: usize,
        service: Arc<AutomationService>,
        writer: Arc<Mutex<FrameWriter<TcpStream>>>,
        codec: JsonCodec,
    ) -> Result<Self, AgentError> {
        let (sender, receiver) = crossbeam_channel::bounded::<RpcRequest>(CHANNEL_CAPACITY);
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let receiver: Receiver<RpcRequest> = receiver.clone();
            let service = Arc::clone(&service);
            let writer = Arc::clone(&writer);

            let spawned = thread::Builder::new()
                .name(format!("spy-worker-{}", id))
                .stack_size(WORKER_STACK_BYTES)
                .spawn(move || {
                    for request in receiver.iter() {
                        let response = router::handle_request(&service, request);
                        write_response(&writer, codec, &response);
                    }
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => warn!(worker = id, error = %e, "Failed to spawn request worker"),
            }
        }

        if workers.is_empty() {
            return Err(AgentError::WorkerPool(
                "no request worker could be spawned".to_string(),
            ));
        }
        if workers.len() < size {
            warn!(
                spawned = workers.len(),
                requested = size,
                "Running with fewer request workers"
            );
        }

        Ok(Self { workers, sender })
    }

    fn execute(&self, request: RpcRequest) -> Result<(), RpcRequest> {
        self.sender.send(request).map_err(|e| e.into_inner())
    }

    fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}
