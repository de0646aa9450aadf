//! The remote-callable tool surface.
//!
//! Every tool returns a JSON payload. Failures are payloads too: a pairing
//! timeout becomes `{"error": ...}` and any other client failure adds a hint
//! naming the port the agent is expected to dial.

use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;
use ui_spy_common::error_codes::ErrorCategory;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::SpyApi;
use ui_spy_ipc::ClientError;

pub const GET_VISUAL_TREE: &str = "GetVisualTree";
pub const SAVE_SNAPSHOT: &str = "SaveSnapshot";
pub const LIST_SNAPSHOTS: &str = "ListSnapshots";
pub const GET_SNAPSHOT: &str = "GetSnapshot";
pub const DO_ACTION: &str = "DoAction";
pub const GET_NAVIGATION: &str = "GetNavigation";

#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    Tree { depth: usize },
    SaveSnapshot { name: String, phase: String },
    ListSnapshots,
    GetSnapshot { file_name: String },
    DoAction(ActionCommand),
    Navigation,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Tree { .. } => GET_VISUAL_TREE,
            Tool::SaveSnapshot { .. } => SAVE_SNAPSHOT,
            Tool::ListSnapshots => LIST_SNAPSHOTS,
            Tool::GetSnapshot { .. } => GET_SNAPSHOT,
            Tool::DoAction(_) => DO_ACTION,
            Tool::Navigation => GET_NAVIGATION,
        }
    }
}

/// Result of one tool call, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub payload: Value,
    /// Set when the payload describes a failure.
    pub failure: Option<ErrorCategory>,
}

impl ToolOutput {
    fn ok(payload: Value) -> Self {
        Self {
            payload,
            failure: None,
        }
    }

    fn failed(payload: Value, category: ErrorCategory) -> Self {
        Self {
            payload,
            failure: Some(category),
        }
    }

    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| self.payload.to_string())
    }
}

/// Runs `tool` against `api`. `port` only feeds the failure hint.
pub fn run_tool<A>(api: &A, tool: &Tool, port: u16) -> ToolOutput
where
    A: SpyApi<Error = ClientError>,
{
    let outcome = match tool {
        Tool::Tree { depth } => api.get_tree(*depth).map(to_output),
        Tool::SaveSnapshot { name, phase } => api.save_snapshot(name, phase).map(to_output),
        Tool::ListSnapshots => api.list_snapshots().map(to_output),
        Tool::GetSnapshot { file_name } => api.get_snapshot(file_name).map(|found| match found {
            Some(snapshot) => to_output(snapshot),
            None => ToolOutput::failed(
                json!({ "error": format!("Snapshot '{}' not found.", file_name) }),
                ErrorCategory::NotFound,
            ),
        }),
        Tool::DoAction(command) => api.do_action(command).map(to_output),
        Tool::Navigation => api.get_navigation().map(to_output),
    };

    outcome.unwrap_or_else(|e| {
        debug!(tool = tool.name(), error = %e, "Tool call failed");
        ToolOutput::failed(error_payload(&e, port), e.category())
    })
}

fn to_output<T: Serialize>(value: T) -> ToolOutput {
    match serde_json::to_value(value) {
        Ok(payload) => ToolOutput::ok(payload),
        Err(e) => ToolOutput::failed(
            json!({ "error": format!("Failed to serialize result: {}", e) }),
            ErrorCategory::Internal,
        ),
    }
}

/// The user-facing failure payload for a client error.
pub fn error_payload(error: &ClientError, port: u16) -> Value {
    if error.is_pairing_timeout() {
        return json!({ "error": error.to_string() });
    }
    json!({
        "error": format!("Spy call failed: {}", error),
        "hint": format!(
            "Ensure the target app is running with the spy agent active on tcp://localhost:{}.",
            port
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ui_spy_core::model::AbstractControl;
    use ui_spy_core::model::ActionKind;
    use ui_spy_core::model::ActionResult;
    use ui_spy_core::model::NavigationInfo;
    use ui_spy_core::model::ScreenSnapshot;

    /// Answers navigation, has no snapshots and fails everything else.
    struct FakeApi {
        failure: fn() -> ClientError,
    }

    impl SpyApi for FakeApi {
        type Error = ClientError;

        fn get_tree(&self, _max_depth: usize) -> Result<Vec<AbstractControl>, ClientError> {
            Err((self.failure)())
        }

        fn save_snapshot(&self, _name: &str, _phase: &str) -> Result<ScreenSnapshot, ClientError> {
            Err((self.failure)())
        }

        fn list_snapshots(&self) -> Result<Vec<String>, ClientError> {
            Ok(Vec::new())
        }

        fn get_snapshot(&self, _name: &str) -> Result<Option<ScreenSnapshot>, ClientError> {
            Ok(None)
        }

        fn do_action(&self, _command: &ActionCommand) -> Result<ActionResult, ClientError> {
            Ok(ActionResult::failed("Control 'Ghost' not found"))
        }

        fn get_navigation(&self) -> Result<NavigationInfo, ClientError> {
            Ok(NavigationInfo {
                current_page: "LoginPage".to_string(),
                back_stack_depth: 0,
                available_routes: None,
            })
        }
    }

    fn timeout() -> ClientError {
        ClientError::PairingTimeout {
            timeout_ms: 500,
            port: 54321,
        }
    }

    fn lost() -> ClientError {
        ClientError::ConnectionLost("peer reset".to_string())
    }

    #[test]
    fn test_timeout_payload_has_no_hint() {
        let api = FakeApi { failure: timeout };
        let out = run_tool(&api, &Tool::Tree { depth: 50 }, 54321);
        assert_eq!(out.failure, Some(ErrorCategory::Timeout));
        let error = out.payload["error"].as_str().unwrap();
        assert!(error.starts_with("no Spy connected within 500ms"));
        assert!(out.payload.get("hint").is_none());
    }

    #[test]
    fn test_other_failures_carry_hint() {
        let api = FakeApi { failure: lost };
        let out = run_tool(
            &api,
            &Tool::SaveSnapshot {
                name: "Login".to_string(),
                phase: "baseline".to_string(),
            },
            40123,
        );
        assert!(out.is_error());
        assert!(out.payload["error"]
            .as_str()
            .unwrap()
            .starts_with("Spy call failed: "));
        assert!(out.payload["hint"]
            .as_str()
            .unwrap()
            .contains("tcp://localhost:40123"));
    }

    #[test]
    fn test_missing_snapshot_is_not_found() {
        let api = FakeApi { failure: lost };
        let out = run_tool(
            &api,
            &Tool::GetSnapshot {
                file_name: "baseline_none".to_string(),
            },
            54321,
        );
        assert_eq!(out.failure, Some(ErrorCategory::NotFound));
        assert_eq!(out.payload["error"], "Snapshot 'baseline_none' not found.");
    }

    #[test]
    fn test_failed_action_is_an_ordinary_result() {
        let api = FakeApi { failure: lost };
        let out = run_tool(
            &api,
            &Tool::DoAction(ActionCommand::new(ActionKind::Click, "Ghost")),
            54321,
        );
        assert!(!out.is_error());
        assert_eq!(out.payload["success"], false);
    }

    #[test]
    fn test_success_payload_uses_wire_names() {
        let api = FakeApi { failure: lost };
        let out = run_tool(&api, &Tool::Navigation, 54321);
        assert_eq!(out.payload["currentPage"], "LoginPage");
        assert_eq!(out.payload["backStackDepth"], 0);
        assert!(out.to_pretty().contains('\n'));

        let out = run_tool(&api, &Tool::ListSnapshots, 54321);
        assert_eq!(out.payload, json!([]));
    }
}
