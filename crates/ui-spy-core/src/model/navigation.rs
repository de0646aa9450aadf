use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationInfo {
    pub current_page: String,
    pub back_stack_depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_routes: Option<Vec<String>>,
}
