//! Scripted stand-in for the agent side of the reverse connection.
//!
//! A `MockAgent` dials the controller's listener from the test thread (so
//! backlog order is deterministic), then serves framed JSON-RPC on its own
//! thread, answering each method from a fixed table and recording requests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::BufReader;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use serde_json::Value;
use ui_spy_ipc::FrameReader;
use ui_spy_ipc::FrameWriter;
use ui_spy_ipc::JsonCodec;
use ui_spy_ipc::RpcRequest;
use ui_spy_ipc::RpcResponse;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(Value),
    Error { code: i32, message: String },
    /// Read the request, then close the socket without answering.
    Disconnect,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Option<Value>,
}

pub struct MockAgent {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockAgent {
    pub fn connect(addr: SocketAddr, responses: Vec<(&str, MockResponse)>) -> Self {
        let stream = TcpStream::connect(addr).expect("mock agent failed to dial controller");
        let table: HashMap<String, MockResponse> = responses
            .into_iter()
            .map(|(method, response)| (method.to_string(), response))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || serve(stream, table, recorded));
        Self {
            requests,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    /// Waits for the serving thread, which ends when either side closes.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("mock agent panicked");
        }
    }
}

fn serve(
    stream: TcpStream,
    table: HashMap<String, MockResponse>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let codec = JsonCodec::default();
    let mut reader = FrameReader::new(BufReader::new(stream.try_clone().unwrap()), 1 << 24);
    let mut writer = FrameWriter::new(stream);

    while let Ok(Some(frame)) = reader.read_frame() {
        let request: RpcRequest = codec.decode(&frame).expect("controller sent bad JSON");
        recorded.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            params: request.params.clone(),
        });

        let response = match table.get(&request.method) {
            Some(MockResponse::Success(value)) => RpcResponse::success(request.id, value.clone()),
            Some(MockResponse::Error { code, message }) => {
                RpcResponse::error(request.id, *code, message)
            }
            Some(MockResponse::Disconnect) => return,
            None => RpcResponse::error(request.id, -32601, "Method not found"),
        };
        let body = codec.encode(&response).unwrap();
        if writer.write_frame(&body).is_err() {
            return;
        }
    }
}
