//! Long-lived controller: JSON-RPC requests on stdin, one per line, and one
//! response per line on stdout. The agent pairing survives between requests.

use std::io;
use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use ui_spy_agent::DEFAULT_TREE_DEPTH;
use ui_spy_common::error_codes;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::model::ActionKind;
use ui_spy_core::model::Flow;
use ui_spy_ipc::RpcRequest;
use ui_spy_ipc::RpcResponse;
use ui_spy_ipc::SpyClient;

use crate::flow::load_flow;
use crate::flow::FlowRunner;
use crate::tools;
use crate::tools::Tool;

pub const DISCONNECT: &str = "Disconnect";
pub const RUN_FLOW: &str = "RunFlow";

/// Serves until `input` reaches EOF. Releases the agent on the way out.
pub fn serve<R, W>(client: &SpyClient, input: R, mut output: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    info!(port = client.port(), "Serving tool requests on stdin");

    for line in input.lines() {
        let line = line?;
        let Some(response) = handle_line(client, &line) else {
            continue;
        };
        let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(output, "{}", encoded)?;
        output.flush()?;
    }

    client.disconnect();
    info!("stdin closed, controller stopped");
    Ok(())
}

/// Blank lines produce no response.
pub fn handle_line(client: &SpyClient, line: &str) -> Option<RpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return Some(RpcResponse::error(
                0,
                error_codes::PARSE_ERROR,
                &format!("Parse error: {}", e),
            ))
        }
    };
    debug!(id = request.id, method = %request.method, "Serve request");
    Some(dispatch(client, &request).unwrap_or_else(|invalid| invalid))
}

#[allow(clippy::result_large_err)]
fn dispatch(client: &SpyClient, request: &RpcRequest) -> Result<RpcResponse, RpcResponse> {
    let id = request.id;
    let tool = match request.method.as_str() {
        tools::GET_VISUAL_TREE => Tool::Tree {
            depth: request
                .param::<usize>(0, "depth")?
                .unwrap_or(DEFAULT_TREE_DEPTH),
        },
        tools::SAVE_SNAPSHOT => Tool::SaveSnapshot {
            name: request.require(0, "name")?,
            phase: request.require(1, "phase")?,
        },
        tools::LIST_SNAPSHOTS => Tool::ListSnapshots,
        tools::GET_SNAPSHOT => Tool::GetSnapshot {
            file_name: request.require(0, "fileName")?,
        },
        tools::DO_ACTION => {
            let action: String = request.require(0, "action")?;
            let id_arg: String = request.require(1, "id")?;
            let mut command = ActionCommand::new(ActionKind::from(action), id_arg);
            command.value = request.param(2, "value")?;
            Tool::DoAction(command)
        }
        tools::GET_NAVIGATION => Tool::Navigation,
        DISCONNECT => {
            client.disconnect();
            return Ok(RpcResponse::success(id, json!({ "disconnected": true })));
        }
        RUN_FLOW => return Ok(run_flow(client, request)),
        other => {
            return Ok(RpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", other),
            ))
        }
    };

    let output = tools::run_tool(client, &tool, client.port());
    Ok(RpcResponse::success(id, output.payload))
}

/// Takes an inline `flow` object or a `file` path.
fn run_flow(client: &SpyClient, request: &RpcRequest) -> RpcResponse {
    let id = request.id;
    let flow = match (
        request.param::<Flow>(0, "flow"),
        request.param::<PathBuf>(1, "file"),
    ) {
        (Ok(Some(flow)), _) => flow,
        (Ok(None), Ok(Some(path))) => match load_flow(&path) {
            Ok(flow) => flow,
            Err(e) => return RpcResponse::error(id, e.code(), &e.to_string()),
        },
        (Err(invalid), _) | (_, Err(invalid)) => return invalid,
        (Ok(None), Ok(None)) => {
            return RpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "RunFlow needs a 'flow' object or a 'file' path",
            )
        }
    };

    let report = FlowRunner::new(client).run(&flow);
    match serde_json::to_value(&report) {
        Ok(value) => RpcResponse::success(id, value),
        Err(e) => RpcResponse::error(id, error_codes::INTERNAL_ERROR, &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ui_spy_ipc::SessionConfig;

    fn offline_client() -> SpyClient {
        SpyClient::new(
            SessionConfig::default()
                .with_port(0)
                .with_connect_timeout(Duration::from_millis(50)),
        )
    }

    fn request(id: u64, method: &str, params: Value) -> String {
        serde_json::to_string(&RpcRequest::new(id, method, params)).unwrap()
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let client = offline_client();
        assert!(handle_line(&client, "   ").is_none());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let client = offline_client();
        let response = handle_line(&client, "{nope").unwrap();
        assert_eq!(response.id, 0);
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[test]
    fn test_unknown_method() {
        let client = offline_client();
        let response = handle_line(&client, &request(3, "Explode", Value::Null)).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert!(error.message.contains("Explode"));
    }

    #[test]
    fn test_missing_argument_is_invalid_params() {
        let client = offline_client();
        let response = handle_line(
            &client,
            &request(4, tools::DO_ACTION, json!({ "action": "click" })),
        )
        .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_timeout_is_a_tool_payload() {
        let client = offline_client();
        let response =
            handle_line(&client, &request(5, tools::LIST_SNAPSHOTS, Value::Null)).unwrap();
        assert_eq!(response.id, 5);
        let payload = response.into_result().unwrap();
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("no Spy connected within 50ms"));
        assert!(client.session().local_addr().is_some());
    }

    #[test]
    fn test_disconnect_releases_listener() {
        let client = offline_client();
        client.session().listen().unwrap();
        let response = handle_line(&client, &request(6, DISCONNECT, Value::Null)).unwrap();
        assert_eq!(response.into_result().unwrap()["disconnected"], true);
        assert!(client.session().local_addr().is_none());
    }

    #[test]
    fn test_run_flow_needs_a_flow() {
        let client = offline_client();
        let response = handle_line(&client, &request(7, RUN_FLOW, json!({}))).unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_run_flow_inline_reports_each_step() {
        let client = offline_client();
        let response = handle_line(
            &client,
            &request(
                8,
                RUN_FLOW,
                json!({ "flow": { "name": "noop", "steps": [{ "action": "wait", "timeout": 1 }] } }),
            ),
        )
        .unwrap();
        let report = response.into_result().unwrap();
        assert_eq!(report["passed"], true);
        assert_eq!(report["steps"][0]["action"], "wait");
    }

    #[test]
    fn test_serve_writes_one_line_per_request() {
        let client = offline_client();
        let input = format!(
            "{}\n\n{}\n",
            request(1, "Explode", Value::Null),
            request(2, DISCONNECT, Value::Null)
        );
        let mut output = Vec::new();
        serve(&client, input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["result"]["disconnected"], true);
    }
}
