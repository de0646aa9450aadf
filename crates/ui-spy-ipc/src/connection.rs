//! Client stub over one paired socket.
//!
//! Writes are serialized through a mutex; a dedicated reader thread routes
//! responses back to their callers by request id. The reader stops at EOF, on
//! a read error, or on a frame it cannot decode. Every outstanding call then
//! fails with [`ClientError::ConnectionLost`] and the connection is marked
//! closed.

use std::collections::HashMap;
use std::io::BufReader;
use std::net::Shutdown;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use serde_json::Value;
use tracing::debug;
use tracing::warn;
use ui_spy_common::mutex_lock_or_recover;

use crate::codec::JsonCodec;
use crate::error::ClientError;
use crate::framing::FrameReader;
use crate::framing::FrameWriter;
use crate::types::RpcRequest;
use crate::types::RpcResponse;

/// Deep trees are decoded on the reader thread, so it gets a generous stack.
pub const READER_STACK_BYTES: usize = 16 * 1024 * 1024;

type Reply = Result<Value, ClientError>;
type PendingMap = HashMap<u64, Sender<Reply>>;

struct Shared {
    pending: Mutex<PendingMap>,
    closed: AtomicBool,
}

impl Shared {
    fn fail_all(&self, reason: &str) {
        let drained: Vec<Sender<Reply>> = {
            let mut pending = mutex_lock_or_recover(&self.pending);
            pending.drain().map(|(_, tx)| tx).collect()
        };
        for tx in drained {
            let _ = tx.send(Err(ClientError::ConnectionLost(reason.to_string())));
        }
    }
}

pub struct RpcConnection {
    writer: Mutex<FrameWriter<TcpStream>>,
    shared: Arc<Shared>,
    next_id: AtomicU64,
    codec: JsonCodec,
    peer: Option<SocketAddr>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl RpcConnection {
    pub fn new(
        stream: TcpStream,
        codec: JsonCodec,
        max_frame_bytes: usize,
    ) -> Result<Self, ClientError> {
        let peer = stream.peer_addr().ok();
        let read_half = stream.try_clone()?;
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        });

        let reader_shared = Arc::clone(&shared);
        let reader = thread::Builder::new()
            .name("spy-rpc-reader".to_string())
            .stack_size(READER_STACK_BYTES)
            .spawn(move || read_loop(read_half, codec, max_frame_bytes, reader_shared))?;

        Ok(Self {
            writer: Mutex::new(FrameWriter::new(stream)),
            shared,
            next_id: AtomicU64::new(1),
            codec,
            peer,
            reader: Mutex::new(Some(reader)),
        })
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Issues one remote call and blocks until its response or a disconnect.
    pub fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        if self.is_closed() {
            return Err(ClientError::Disposed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        let body = self.codec.encode(&request)?;

        let (tx, rx) = crossbeam_channel::bounded(1);
        mutex_lock_or_recover(&self.shared.pending).insert(id, tx);

        // The reader may have drained the map between the check above and the insert.
        if self.is_closed() {
            mutex_lock_or_recover(&self.shared.pending).remove(&id);
            return Err(ClientError::Disposed);
        }

        debug!(id, method, bytes = body.len(), "Sending request");
        let written = mutex_lock_or_recover(&self.writer).write_frame(&body);
        if let Err(e) = written {
            mutex_lock_or_recover(&self.shared.pending).remove(&id);
            return Err(ClientError::Io(e));
        }

        match rx.recv() {
            Ok(reply) => reply,
            Err(_) => Err(ClientError::ConnectionLost(
                "reply channel closed before a response arrived".to_string(),
            )),
        }
    }

    /// Shuts the socket down and waits for the reader to drain.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        let _ = mutex_lock_or_recover(&self.writer)
            .get_ref()
            .shutdown(Shutdown::Both);
        let handle = mutex_lock_or_recover(&self.reader).take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        self.shared.fail_all("session disposed");
    }
}

impl Drop for RpcConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_loop(stream: TcpStream, codec: JsonCodec, max_frame_bytes: usize, shared: Arc<Shared>) {
    let mut reader = FrameReader::new(BufReader::new(stream), max_frame_bytes);

    let reason = loop {
        let frame = match reader.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break "agent closed the connection".to_string(),
            Err(e) => break e.to_string(),
        };

        // Without an id nothing can be routed, so the stream is treated as lost.
        let response: RpcResponse = match codec.decode(&frame) {
            Ok(response) => response,
            Err(e) => break format!("undecodable response: {}", e),
        };

        let id = response.id;
        let waiter = mutex_lock_or_recover(&shared.pending).remove(&id);
        match waiter {
            Some(tx) => {
                let reply = response.into_result().map_err(|e| ClientError::Rpc {
                    code: e.code,
                    message: e.message,
                    data: e.data,
                });
                let _ = tx.send(reply);
            }
            None => warn!(id, "Response for unknown request id"),
        }
    };

    shared.closed.store(true, Ordering::SeqCst);
    warn!(reason = %reason, "Spy disconnected");
    shared.fail_all(&reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use std::net::TcpListener;

    use serde_json::json;

    fn pair() -> (RpcConnection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let agent = TcpStream::connect(addr).unwrap();
        let (controller, _) = listener.accept().unwrap();
        let conn = RpcConnection::new(controller, JsonCodec::default(), 1 << 20).unwrap();
        (conn, agent)
    }

    fn answer_once(agent: TcpStream, reply: impl FnOnce(RpcRequest) -> Option<RpcResponse>) {
        let codec = JsonCodec::default();
        let mut reader = FrameReader::new(BufReader::new(agent.try_clone().unwrap()), 1 << 20);
        let mut writer = FrameWriter::new(agent);
        let frame = reader.read_frame().unwrap().unwrap();
        let request: RpcRequest = codec.decode(&frame).unwrap();
        if let Some(response) = reply(request) {
            writer.write_frame(&codec.encode(&response).unwrap()).unwrap();
        }
    }

    #[test]
    fn test_call_routes_response_by_id() {
        let (conn, agent) = pair();
        let server = thread::spawn(move || {
            answer_once(agent, |req| {
                assert_eq!(req.method, "GetNavigationAsync");
                Some(RpcResponse::success(req.id, json!({"currentPage": "Home"})))
            })
        });

        let value = conn.call("GetNavigationAsync", Value::Null).unwrap();
        assert_eq!(value["currentPage"], "Home");
        server.join().unwrap();
    }

    #[test]
    fn test_rpc_error_surfaces_code_and_message() {
        let (conn, agent) = pair();
        let server = thread::spawn(move || {
            answer_once(agent, |req| {
                Some(RpcResponse::error(req.id, -32601, "Method not found"))
            })
        });

        let err = conn.call("Nope", Value::Null).unwrap_err();
        match err {
            ClientError::Rpc { code, message, .. } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_peer_close_fails_pending_call() {
        let (conn, agent) = pair();
        let server = thread::spawn(move || answer_once(agent, |_| None));

        let err = conn.call("GetTreeAsync", Value::Null).unwrap_err();
        assert!(err.is_transport_fault(), "got {err:?}");
        server.join().unwrap();

        for _ in 0..100 {
            if conn.is_closed() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(conn.is_closed());
        assert!(matches!(
            conn.call("GetTreeAsync", Value::Null),
            Err(ClientError::Disposed)
        ));
    }

    #[test]
    fn test_undecodable_response_ends_the_connection() {
        let (conn, agent) = pair();
        let server = thread::spawn(move || {
            let mut reader =
                FrameReader::new(BufReader::new(agent.try_clone().unwrap()), 1 << 20);
            reader.read_frame().unwrap().unwrap();
            FrameWriter::new(agent)
                .write_frame(b"{\"jsonrpc\": \"2.0\", \"id\": ")
                .unwrap();
        });

        let err = conn.call("GetNavigationAsync", Value::Null).unwrap_err();
        server.join().unwrap();
        match &err {
            ClientError::ConnectionLost(reason) => {
                assert!(reason.contains("undecodable response"), "{reason}")
            }
            other => panic!("expected ConnectionLost, got {other:?}"),
        }
        assert!(err.is_transport_fault());
        assert!(conn.is_closed());
    }
}
