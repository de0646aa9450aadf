use serde::Deserialize;
use serde::Serialize;

use super::AbstractControl;

/// Action names are matched case-insensitively; anything unrecognised is
/// carried through as [`ActionKind::Other`] so the executor can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Click,
    Type,
    Toggle,
    Select,
    Clear,
    Other(String),
}

impl ActionKind {
    pub const SUPPORTED: [&'static str; 5] = ["click", "type", "toggle", "select", "clear"];

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Toggle => "toggle",
            ActionKind::Select => "select",
            ActionKind::Clear => "clear",
            ActionKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for ActionKind {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "click" => ActionKind::Click,
            "type" => ActionKind::Type,
            "toggle" => ActionKind::Toggle,
            "select" => ActionKind::Select,
            "clear" => ActionKind::Clear,
            _ => ActionKind::Other(raw.to_string()),
        }
    }
}

impl From<String> for ActionKind {
    fn from(raw: String) -> Self {
        ActionKind::from(raw.as_str())
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCommand {
    pub action: ActionKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ActionCommand {
    pub fn new(action: impl Into<ActionKind>, id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            id: id.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_after: Option<AbstractControl>,
}

impl ActionResult {
    pub fn succeeded(control_after: Option<AbstractControl>) -> Self {
        Self {
            success: true,
            error: None,
            control_after,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            control_after: None,
        }
    }
}
