use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use ui_spy_common::error_codes;

/// Remote method names exposed by the agent.
pub mod methods {
    pub const GET_TREE: &str = "GetTreeAsync";
    pub const SAVE_SNAPSHOT: &str = "SaveSnapshotAsync";
    pub const LIST_SNAPSHOTS: &str = "ListSnapshotsAsync";
    pub const GET_SNAPSHOT: &str = "GetSnapshotAsync";
    pub const DO_ACTION: &str = "DoActionAsync";
    pub const GET_NAVIGATION: &str = "GetNavigationAsync";

    pub const ALL: [&str; 6] = [
        GET_TREE,
        SAVE_SNAPSHOT,
        LIST_SNAPSHOTS,
        GET_SNAPSHOT,
        DO_ACTION,
        GET_NAVIGATION,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        }
    }

    /// Argument by position, or by name when params are an object.
    #[allow(clippy::result_large_err)]
    pub fn param<T: DeserializeOwned>(
        &self,
        index: usize,
        key: &str,
    ) -> Result<Option<T>, RpcResponse> {
        let raw = match &self.params {
            Some(Value::Array(args)) => args.get(index),
            Some(Value::Object(map)) => map.get(key),
            _ => None,
        };
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| {
                RpcResponse::error(
                    self.id,
                    error_codes::INVALID_PARAMS,
                    &format!("Invalid '{}' param: {}", key, e),
                )
            }),
        }
    }

    #[allow(clippy::result_large_err)]
    pub fn require<T: DeserializeOwned>(&self, index: usize, key: &str) -> Result<T, RpcResponse> {
        self.param(index, key)?.ok_or_else(|| {
            RpcResponse::error(
                self.id,
                error_codes::INVALID_PARAMS,
                &format!("Missing '{}' param", key),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, code: i32, message: &str) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    pub fn error_with_data(id: u64, code: i32, message: &str, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.to_string(),
                data,
            }),
        }
    }

    /// A `null` result arrives as an absent field and reads back as `Value::Null`.
    pub fn into_result(self) -> Result<Value, RpcErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_and_named_params() {
        let positional = RpcRequest::new(1, methods::SAVE_SNAPSHOT, json!(["login", "baseline"]));
        assert_eq!(positional.require::<String>(1, "phase").unwrap(), "baseline");

        let named = RpcRequest::new(2, methods::SAVE_SNAPSHOT, json!({ "name": "login" }));
        assert_eq!(named.require::<String>(0, "name").unwrap(), "login");
        assert_eq!(named.param::<String>(1, "phase").unwrap(), None);
    }

    #[test]
    fn test_missing_and_invalid_params() {
        let request = RpcRequest::new(3, methods::GET_TREE, json!(["deep"]));
        let err = request.require::<u32>(0, "depth").unwrap_err();
        assert_eq!(err.error.unwrap().code, error_codes::INVALID_PARAMS);

        let empty = RpcRequest::new(4, methods::LIST_SNAPSHOTS, Value::Null);
        assert!(empty.params.is_none());
        let err = empty.require::<String>(0, "fileName").unwrap_err();
        assert_eq!(err.error.unwrap().message, "Missing 'fileName' param");
    }

    #[test]
    fn test_null_result_round_trips() {
        let response = RpcResponse::success(5, Value::Null);
        let wire = serde_json::to_string(&response).unwrap();
        let back: RpcResponse = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_error_response_shape() {
        let response = RpcResponse::error(6, error_codes::METHOD_NOT_FOUND, "Method not found: X");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
    }
}
