use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use ui_spy_common::error_codes;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::SpyApi;
use ui_spy_ipc::methods;
use ui_spy_ipc::RpcRequest;
use ui_spy_ipc::RpcResponse;

use crate::error::ServiceError;
use crate::service::AutomationService;

/// Dispatches one request to the automation service. Arguments are read by
/// position, or by name when params are an object.
pub fn handle_request(service: &AutomationService, request: RpcRequest) -> RpcResponse {
    debug!(id = request.id, method = %request.method, "Handling request");
    dispatch(service, &request).unwrap_or_else(|invalid| invalid)
}

#[allow(clippy::result_large_err)]
fn dispatch(
    service: &AutomationService,
    request: &RpcRequest,
) -> Result<RpcResponse, RpcResponse> {
    let id = request.id;
    let response = match request.method.as_str() {
        methods::GET_TREE => match request.param::<i64>(0, "depth")? {
            // A negative limit cuts off the root itself.
            Some(depth) if depth < 0 => RpcResponse::success(id, Value::Array(Vec::new())),
            Some(depth) => {
                let depth = usize::try_from(depth).unwrap_or(usize::MAX);
                respond(id, service.get_tree(depth))
            }
            None => respond(id, service.get_tree(service.default_tree_depth())),
        },
        methods::SAVE_SNAPSHOT => {
            let name: String = request.require(0, "name")?;
            let phase: String = request.require(1, "phase")?;
            respond(id, service.save_snapshot(&name, &phase))
        }
        methods::LIST_SNAPSHOTS => respond(id, service.list_snapshots()),
        methods::GET_SNAPSHOT => {
            let file_name: String = request.require(0, "fileName")?;
            respond(id, service.get_snapshot(&file_name))
        }
        methods::DO_ACTION => {
            let command: ActionCommand = request.require(0, "command")?;
            respond(id, service.do_action(&command))
        }
        methods::GET_NAVIGATION => respond(id, service.get_navigation()),
        _ => RpcResponse::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            &format!("Method not found: {}", request.method),
        ),
    };
    Ok(response)
}

fn respond<T: Serialize>(id: u64, result: Result<T, ServiceError>) -> RpcResponse {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                &format!("Failed to serialize result: {}", e),
            ),
        },
        Err(e) => {
            RpcResponse::error_with_data(id, e.code(), &e.to_string(), Some(e.to_error_data()))
        }
    }
}

/// Parse failures carry no usable id; JSON-RPC answers them with id 0 here.
pub fn parse_error(message: &str) -> RpcResponse {
    RpcResponse::error(
        0,
        error_codes::PARSE_ERROR,
        &format!("Parse error: {}", message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use ui_spy_core::element::Element;
    use ui_spy_core::element::NativeClass;
    use ui_spy_core::spawn_ui_thread;

    use crate::snapshot_store::FsSnapshotStore;

    fn service(dir: &std::path::Path) -> AutomationService {
        let (ui, _join) = spawn_ui_thread(|window| {
            window.set_content(Some(
                Element::builder(NativeClass::Grid)
                    .child(
                        Element::builder(NativeClass::CheckBox)
                            .automation_id("Remember")
                            .build(),
                    )
                    .build(),
            ));
        })
        .unwrap();
        AutomationService::new(ui, Arc::new(FsSnapshotStore::new(dir)))
    }

    fn call(service: &AutomationService, method: &str, params: Value) -> RpcResponse {
        handle_request(service, RpcRequest::new(7, method, params))
    }

    #[test]
    fn test_unknown_method() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());
        let response = call(&service, "Nope", Value::Null);
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::METHOD_NOT_FOUND);
        assert!(error.message.contains("Nope"));
    }

    #[test]
    fn test_get_tree_positional_and_default_depth() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        // At depth 0 the unnamed grid loses its only child and is pruned.
        let response = call(&service, methods::GET_TREE, json!([0]));
        assert_eq!(response.into_result().unwrap(), json!([]));

        let response = call(&service, methods::GET_TREE, Value::Null);
        let tree = response.into_result().unwrap();
        assert_eq!(tree[0]["id"], "_Grid");
        assert_eq!(tree[0]["children"][0]["id"], "Remember");
    }

    #[test]
    fn test_negative_depth_maps_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let response = call(&service, methods::GET_TREE, json!([-1]));
        assert_eq!(response.into_result().unwrap(), json!([]));

        let response = call(&service, methods::GET_TREE, json!({ "depth": -20 }));
        assert_eq!(response.into_result().unwrap(), json!([]));
    }

    #[test]
    fn test_do_action_named_params() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let response = call(
            &service,
            methods::DO_ACTION,
            json!({"command": {"action": "toggle", "id": "Remember"}}),
        );
        assert_eq!(response.id, 7);
        let result = response.into_result().unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["controlAfter"]["state"]["checked"], true);
    }

    #[test]
    fn test_missing_param_is_invalid_params() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let response = call(&service, methods::SAVE_SNAPSHOT, json!(["only-name"]));
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert!(error.message.contains("phase"));
    }

    #[test]
    fn test_service_error_carries_data() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let response = call(&service, methods::SAVE_SNAPSHOT, json!(["x/y", "baseline"]));
        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        let data = error.data.unwrap();
        assert_eq!(data["category"], "invalid_input");
        assert_eq!(data["context"]["name"], "x/y");
    }

    #[test]
    fn test_missing_snapshot_is_null_result() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let response = call(&service, methods::GET_SNAPSHOT, json!(["baseline_none"]));
        assert!(response.error.is_none());
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_error_uses_id_zero() {
        let response = parse_error("expected value");
        assert_eq!(response.id, 0);
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }
}
