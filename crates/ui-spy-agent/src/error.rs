//! Agent-side errors.
//!
//! Service errors cross the wire as JSON-RPC errors carrying category,
//! context and suggestion in `data`.

use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use ui_spy_common::error_codes;
use ui_spy_common::error_codes::ErrorCategory;
use ui_spy_core::DispatchError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("UI thread unavailable: {0}")]
    Ui(#[from] DispatchError),
    #[error("Invalid snapshot name '{0}'")]
    InvalidSnapshotName(String),
    #[error("Persistence error during {operation}: {reason}")]
    Persistence { operation: String, reason: String },
}

impl ServiceError {
    pub fn persistence(operation: &str, reason: impl std::fmt::Display) -> Self {
        ServiceError::Persistence {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ServiceError::Ui(_) => error_codes::UI_UNAVAILABLE,
            ServiceError::InvalidSnapshotName(_) => error_codes::INVALID_PARAMS,
            ServiceError::Persistence { .. } => error_codes::PERSISTENCE_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ServiceError::Ui(e) => json!({ "reason": e.to_string() }),
            ServiceError::InvalidSnapshotName(name) => json!({ "name": name }),
            ServiceError::Persistence { operation, reason } => {
                json!({ "operation": operation, "reason": reason })
            }
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ServiceError::Ui(_) => {
                "The target app's UI thread has stopped. Restart the app.".to_string()
            }
            ServiceError::InvalidSnapshotName(_) => {
                "Snapshot names and phases must not contain path separators or '..'.".to_string()
            }
            ServiceError::Persistence { .. } => {
                "Check that the snapshot directory exists and is writable (UI_SPY_SNAPSHOT_DIR)."
                    .to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        error_codes::is_retryable(self.code())
    }

    /// Structured `data` member for the JSON-RPC error object.
    pub fn to_error_data(&self) -> Value {
        json!({
            "category": self.category().as_str(),
            "retryable": self.is_retryable(),
            "context": self.context(),
            "suggestion": self.suggestion(),
        })
    }
}

/// Errors starting or running the reverse connector.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to spawn {what}: {source}")]
    Spawn {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create request worker pool: {0}")]
    WorkerPool(String),
    #[error("Session socket error: {0}")]
    Socket(#[from] std::io::Error),
}

impl AgentError {
    pub fn code(&self) -> i32 {
        match self {
            AgentError::Socket(_) => error_codes::TRANSPORT_FAULT,
            _ => error_codes::GENERIC_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            AgentError::Spawn { what, source } => {
                json!({ "thread": what, "reason": source.to_string() })
            }
            AgentError::WorkerPool(reason) => json!({ "reason": reason }),
            AgentError::Socket(e) => json!({ "kind": format!("{:?}", e.kind()) }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            AgentError::Socket(_) => "The connector re-dials on its own.".to_string(),
            _ => "The process may be out of threads or memory. Lower UI_SPY_REQUEST_WORKERS."
                .to_string(),
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
    fn test_ui_unavailable_is_retryable() {
        let err = ServiceError::from(DispatchError::Closed);
        assert_eq!(err.code(), error_codes::UI_UNAVAILABLE);
        assert_eq!(err.category(), ErrorCategory::Busy);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_data_shape() {
        let err = ServiceError::persistence("write", "disk full");
        let data = err.to_error_data();
        assert_eq!(data["category"], "external");
        assert_eq!(data["context"]["operation"], "write");
        assert_eq!(data["retryable"], false);
        assert!(data["suggestion"].as_str().unwrap().contains("UI_SPY_SNAPSHOT_DIR"));
    }

    #[test]
    fn test_invalid_name_is_invalid_params() {
        let err = ServiceError::InvalidSnapshotName("../x".to_string());
        assert_eq!(err.code(), error_codes::INVALID_PARAMS);
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
    }
}
