use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::AbstractControl;

/// A named capture of the screen, tagged with a free-form phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    pub name: String,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub controls: Vec<AbstractControl>,
}

impl ScreenSnapshot {
    /// Storage key, `{phase}_{name}`, without extension.
    pub fn key(&self) -> String {
        snapshot_key(&self.phase, &self.name)
    }
}

pub fn snapshot_key(phase: &str, name: &str) -> String {
    format!("{}_{}", phase, name)
}
