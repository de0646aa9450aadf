#![deny(clippy::all)]

mod client;
pub mod codec;
pub mod config;
mod connection;
mod error;
pub mod framing;
mod session;
mod types;

pub use ui_spy_common::error_codes;

pub use client::SpyClient;
pub use codec::CodecError;
pub use codec::JsonCodec;
pub use config::SessionConfig;
pub use connection::RpcConnection;
pub use error::ClientError;
pub use framing::FrameError;
pub use framing::FrameReader;
pub use framing::FrameWriter;
pub use session::ControllerSession;
pub use session::SessionStats;
pub use types::methods;
pub use types::RpcErrorObject;
pub use types::RpcRequest;
pub use types::RpcResponse;

pub type Result<T> = std::result::Result<T, ClientError>;
