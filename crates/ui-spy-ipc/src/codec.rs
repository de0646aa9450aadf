//! JSON payload codec with an explicit nesting ceiling.
//!
//! serde_json's built-in recursion limit (128) is too shallow for mapped UI
//! trees, so the parser runs unbounded and the ceiling is enforced by a
//! byte scan before parsing and after encoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use ui_spy_common::error_codes;

use crate::config::MIN_MAX_DEPTH;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON nesting depth {depth} exceeds the configured maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub fn code(&self) -> i32 {
        match self {
            CodecError::DepthExceeded { .. } => error_codes::DEPTH_LIMIT,
            CodecError::Json(_) => error_codes::PARSE_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    max_depth: usize,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(MIN_MAX_DEPTH)
    }
}

impl JsonCodec {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let bytes = serde_json::to_vec(value)?;
        self.check_depth(&bytes)?;
        Ok(bytes)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        self.check_depth(bytes)?;
        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let value = T::deserialize(&mut de)?;
        de.end()?;
        Ok(value)
    }

    fn check_depth(&self, bytes: &[u8]) -> Result<(), CodecError> {
        match nesting_depth(bytes, self.max_depth) {
            depth if depth > self.max_depth => Err(CodecError::DepthExceeded {
                depth,
                max: self.max_depth,
            }),
            _ => Ok(()),
        }
    }
}

/// Deepest array/object nesting in a JSON document, ignoring brackets inside
/// strings. Scanning stops as soon as `limit` is passed.
pub fn nesting_depth(bytes: &[u8], limit: usize) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > deepest {
                    deepest = depth;
                    if deepest > limit {
                        return deepest;
                    }
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}
