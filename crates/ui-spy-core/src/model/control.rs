use serde::Deserialize;
use serde::Serialize;

/// Toolkit-independent classification of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    TextInput,
    TextDisplay,
    ActionButton,
    Toggle,
    Selector,
    RangeInput,
    Image,
    List,
    LoadingIndicator,
    ProgressIndicator,
    Screen,
    Navigation,
    TabGroup,
    Container,
    Unknown,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::TextInput => "TextInput",
            ControlKind::TextDisplay => "TextDisplay",
            ControlKind::ActionButton => "ActionButton",
            ControlKind::Toggle => "Toggle",
            ControlKind::Selector => "Selector",
            ControlKind::RangeInput => "RangeInput",
            ControlKind::Image => "Image",
            ControlKind::List => "List",
            ControlKind::LoadingIndicator => "LoadingIndicator",
            ControlKind::ProgressIndicator => "ProgressIndicator",
            ControlKind::Screen => "Screen",
            ControlKind::Navigation => "Navigation",
            ControlKind::TabGroup => "TabGroup",
            ControlKind::Container => "Container",
            ControlKind::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the mapped tree. Children are owned and kept in traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractControl {
    pub id: String,
    pub kind: ControlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_type: Option<String>,
    #[serde(default)]
    pub state: ControlState,
    #[serde(default)]
    pub visual: ControlVisual,
    #[serde(default)]
    pub children: Vec<AbstractControl>,
}

impl AbstractControl {
    /// Pre-order search by id.
    pub fn find(&self, id: &str) -> Option<&AbstractControl> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

fn default_true() -> bool {
    true
}

/// Absent optional fields mean "not applicable to this kind".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub interactive: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            value: None,
            placeholder: None,
            enabled: true,
            visible: true,
            interactive: true,
            read_only: false,
            checked: None,
            selected_index: None,
            item_count: None,
            opacity: None,
        }
    }
}

/// Geometry in window coordinates plus the optional typography and brushes.
///
/// Every double is finite; [`sanitize`] is applied before a value lands here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlVisual {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ControlVisual {
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .into_iter()
            .chain(self.font_size)
            .chain(self.opacity)
            .all(f64::is_finite)
    }
}

/// NaN and infinities become 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
