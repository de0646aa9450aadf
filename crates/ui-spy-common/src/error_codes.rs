//! JSON-RPC error codes shared by the agent and the controller.
//!
//! Standard JSON-RPC codes sit next to the application range (-32000..-32099).

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

pub const GENERIC_ERROR: i32 = -32000;

pub const CONTROL_NOT_FOUND: i32 = -32003;
pub const CAPABILITY_MISMATCH: i32 = -32004;
pub const UNKNOWN_ACTION: i32 = -32005;
pub const ITEM_NOT_FOUND: i32 = -32006;

pub const PAIRING_TIMEOUT: i32 = -32007;
pub const TRANSPORT_FAULT: i32 = -32008;
pub const DEPTH_LIMIT: i32 = -32009;

pub const UI_UNAVAILABLE: i32 = -32016;
pub const PERSISTENCE_ERROR: i32 = -32017;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    Busy,
    Internal,
    External,
    Timeout,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Busy => "busy",
            ErrorCategory::Internal => "internal",
            ErrorCategory::External => "external",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(ErrorCategory::NotFound),
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "busy" => Ok(ErrorCategory::Busy),
            "internal" => Ok(ErrorCategory::Internal),
            "external" => Ok(ErrorCategory::External),
            "timeout" => Ok(ErrorCategory::Timeout),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pairing timeouts and transport faults clear up once an agent (re)connects.
pub fn is_retryable(code: i32) -> bool {
    matches!(code, PAIRING_TIMEOUT | TRANSPORT_FAULT | UI_UNAVAILABLE)
}

pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        CONTROL_NOT_FOUND | ITEM_NOT_FOUND | METHOD_NOT_FOUND => ErrorCategory::NotFound,
        CAPABILITY_MISMATCH | UNKNOWN_ACTION | INVALID_PARAMS | INVALID_REQUEST | PARSE_ERROR
        | DEPTH_LIMIT => ErrorCategory::InvalidInput,
        UI_UNAVAILABLE => ErrorCategory::Busy,
        TRANSPORT_FAULT | PERSISTENCE_ERROR => ErrorCategory::External,
        PAIRING_TIMEOUT => ErrorCategory::Timeout,
        _ => ErrorCategory::Internal,
    }
}
