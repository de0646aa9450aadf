use serde::Deserialize;
use serde::Serialize;

fn default_stop_on_fail() -> bool {
    true
}

/// A scripted sequence of steps run by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<String>,
    #[serde(default = "default_stop_on_fail")]
    pub stop_on_fail: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_phase: Option<String>,
    #[serde(default)]
    pub steps: Vec<FlowStep>,
}

/// One step. Which optional fields matter depends on `action`:
/// control actions use `id`/`value`, `wait` uses `timeout`, `snapshot`
/// uses `name`, and `assert` uses `id`, `property` and the predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_true: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_false: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_defaults() {
        let flow: Flow = serde_json::from_value(json!({
            "name": "login",
            "steps": [
                { "action": "type", "id": "Username", "value": "alice" },
                { "action": "assert", "id": "Remember", "property": "checked", "isTrue": true }
            ]
        }))
        .unwrap();

        assert!(flow.stop_on_fail);
        assert_eq!(flow.steps.len(), 2);
        assert_eq!(flow.steps[1].is_true, Some(true));
        assert_eq!(flow.steps[1].property.as_deref(), Some("checked"));
    }
}
