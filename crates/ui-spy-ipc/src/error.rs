//! Controller-side errors.

use std::io;

use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use ui_spy_common::error_codes;
use ui_spy_common::error_codes::ErrorCategory;

use crate::codec::CodecError;
use crate::framing::FrameError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("no Spy connected within {timeout_ms}ms. Is the target app running and configured for remote inspection?")]
    PairingTimeout { timeout_ms: u64, port: u16 },

    #[error("Failed to listen on 127.0.0.1:{port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Connection to Spy lost: {0}")]
    ConnectionLost(String),

    #[error("Spy session already disposed")]
    Disposed,

    #[error("Socket error: {0}")]
    Io(#[from] io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("RPC error ({code}): {message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    #[error("Invalid response from Spy: {0}")]
    InvalidResponse(String),
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(io) => ClientError::Io(io),
            other => ClientError::ConnectionLost(other.to_string()),
        }
    }
}

impl ClientError {
    /// Faults that tear down the session and earn one retry after re-pairing.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionLost(_) | ClientError::Disposed | ClientError::Io(_)
        )
    }

    pub fn is_pairing_timeout(&self) -> bool {
        matches!(self, ClientError::PairingTimeout { .. })
    }

    pub fn code(&self) -> i32 {
        match self {
            ClientError::PairingTimeout { .. } => error_codes::PAIRING_TIMEOUT,
            ClientError::Listen { .. }
            | ClientError::ConnectionLost(_)
            | ClientError::Disposed
            | ClientError::Io(_) => error_codes::TRANSPORT_FAULT,
            ClientError::Codec(e) => e.code(),
            ClientError::Rpc { code, .. } => *code,
            ClientError::InvalidResponse(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ClientError::PairingTimeout { timeout_ms, port } => {
                json!({ "timeout_ms": timeout_ms, "port": port })
            }
            ClientError::Listen { port, source } => {
                json!({ "operation": "listen", "port": port, "reason": source.to_string() })
            }
            ClientError::ConnectionLost(reason) => json!({ "reason": reason }),
            ClientError::Disposed => json!({}),
            ClientError::Io(e) => json!({ "kind": format!("{:?}", e.kind()) }),
            ClientError::Codec(e) => json!({ "reason": e.to_string() }),
            ClientError::Rpc { code, data, .. } => {
                json!({ "code": code, "data": data.clone().unwrap_or(Value::Null) })
            }
            ClientError::InvalidResponse(reason) => json!({ "reason": reason }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ClientError::PairingTimeout { port, .. } => format!(
                "Start the target app with the spy agent enabled; it dials tcp://127.0.0.1:{} every few seconds.",
                port
            ),
            ClientError::Listen { .. } => {
                "Another controller may already own the port. Stop it or set UI_SPY_PORT.".to_string()
            }
            ClientError::ConnectionLost(_) | ClientError::Disposed | ClientError::Io(_) => {
                "The agent disconnected. Retry once it has reconnected.".to_string()
            }
            ClientError::Codec(CodecError::DepthExceeded { .. }) => {
                "Request a shallower tree or raise UI_SPY_MAX_DEPTH.".to_string()
            }
            ClientError::Codec(_) | ClientError::InvalidResponse(_) => {
                "Check that the agent and controller versions match.".to_string()
            }
            ClientError::Rpc { .. } => "Inspect the error message returned by the agent.".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        error_codes::is_retryable(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_fault_classes() {
        assert!(ClientError::ConnectionLost("eof".to_string()).is_transport_fault());
        assert!(ClientError::Disposed.is_transport_fault());
        assert!(ClientError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_transport_fault());

        assert!(!ClientError::PairingTimeout {
            timeout_ms: 1000,
            port: 54321
        }
        .is_transport_fault());
        assert!(!ClientError::Rpc {
            code: -32601,
            message: "nope".to_string(),
            data: None
        }
        .is_transport_fault());
    }

    #[test]
    fn test_pairing_timeout_message_is_actionable() {
        let err = ClientError::PairingTimeout {
            timeout_ms: 1000,
            port: 54321,
        };
        assert!(err.to_string().starts_with("no Spy connected within 1000ms."));
        assert!(err.to_string().contains("Is the target app running"));
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert!(err.is_retryable());
        assert!(err.suggestion().contains("54321"));
    }

    #[test]
    fn test_frame_errors_map_to_faults() {
        let lost: ClientError = FrameError::MissingContentLength.into();
        assert!(lost.is_transport_fault());
        let io: ClientError = FrameError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)).into();
        assert!(matches!(io, ClientError::Io(_)));
    }
}
