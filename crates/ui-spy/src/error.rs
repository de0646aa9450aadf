//! Errors raised by the CLI itself, outside of tool calls.

use std::io;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use ui_spy_agent::AgentError;
use ui_spy_common::error_codes;
use ui_spy_common::error_codes::ErrorCategory;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read flow file '{}': {source}", .path.display())]
    FlowRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid flow file '{}': {source}", .path.display())]
    FlowParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to start UI thread: {0}")]
    UiThread(#[source] io::Error),

    #[error("Failed to install signal handler: {0}")]
    SignalSetup(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    pub fn code(&self) -> i32 {
        match self {
            CliError::FlowRead { .. } | CliError::FlowParse { .. } => error_codes::INVALID_PARAMS,
            CliError::Agent(e) => e.code(),
            _ => error_codes::GENERIC_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CliError::FlowRead { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ErrorCategory::NotFound
            }
            CliError::Io(_) => ErrorCategory::External,
            _ => error_codes::category_for_code(self.code()),
        }
    }

    pub fn context(&self) -> Value {
        match self {
            CliError::FlowRead { path, source } => json!({
                "path": path.display().to_string(),
                "reason": source.to_string()
            }),
            CliError::FlowParse { path, source } => json!({
                "path": path.display().to_string(),
                "line": source.line(),
                "column": source.column()
            }),
            CliError::Agent(e) => e.context(),
            other => json!({ "reason": other.to_string() }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            CliError::FlowRead { .. } => "Check the flow file path.".to_string(),
            CliError::FlowParse { .. } => {
                "A flow is a JSON object with a 'name' and a 'steps' array of {\"action\": ...} objects."
                    .to_string()
            }
            CliError::Agent(e) => e.suggestion(),
            _ => "Check the log output (set RUST_LOG=debug for detail).".to_string(),
        }
    }

    /// Converts to UNIX sysexits.h-compliant exit code.
    pub fn exit_code(&self) -> i32 {
        exit_code_for_category(self.category())
    }
}

pub fn exit_code_for_category(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::InvalidInput => 64, // EX_USAGE
        ErrorCategory::NotFound => 69,     // EX_UNAVAILABLE
        ErrorCategory::Busy => 73,         // EX_CANTCREAT
        ErrorCategory::External => 74,     // EX_IOERR
        ErrorCategory::Internal => 74,     // EX_IOERR
        ErrorCategory::Timeout => 75,      // EX_TEMPFAIL
    }
}
