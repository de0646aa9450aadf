//! Finds controls by identifier and performs typed actions on them.

use serde_json::json;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use ui_spy_common::error_codes;
use ui_spy_common::error_codes::ErrorCategory;

use crate::element::ElementRef;
use crate::element::NativeClass;
use crate::element::Widget;
use crate::mapper::TreeMapper;
use crate::model::ActionCommand;
use crate::model::ActionKind;
use crate::model::ActionResult;

const TEXT_INPUTS: &[&str] = &["TextBox", "PasswordBox", "AutoSuggestBox", "RichEditBox"];
const TOGGLES: &[&str] = &["ToggleSwitch", "CheckBox", "RadioButton", "ToggleButton"];
const SELECTORS: &[&str] = &["ComboBox", "ListBox"];
const CLICKABLES: &[&str] = &["Button", "HyperlinkButton", "AppBarButton"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Control with AutomationId or Name '{0}' not found in visual tree. Ensure the control exists and the app is on the correct screen.")]
    NotFound(String),

    #[error("Unknown action '{0}'. Supported: click, type, toggle, select, clear.")]
    UnknownAction(String),

    #[error("Cannot {verb} control '{control}' ({native_type}): {reason} ({})", .accepted.join(", "))]
    Unsupported {
        verb: &'static str,
        control: String,
        native_type: String,
        reason: &'static str,
        accepted: &'static [&'static str],
    },

    #[error("Could not find item '{value}' in selector '{selector}'.")]
    ItemNotFound { value: String, selector: String },

    #[error("Index {index} is out of range for selector '{selector}' ({count} items).")]
    IndexOutOfRange {
        index: i32,
        selector: String,
        count: usize,
    },
}

impl ActionError {
    pub fn code(&self) -> i32 {
        match self {
            ActionError::NotFound(_) => error_codes::CONTROL_NOT_FOUND,
            ActionError::UnknownAction(_) => error_codes::UNKNOWN_ACTION,
            ActionError::Unsupported { .. } => error_codes::CAPABILITY_MISMATCH,
            ActionError::ItemNotFound { .. } | ActionError::IndexOutOfRange { .. } => {
                error_codes::ITEM_NOT_FOUND
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ActionError::NotFound(id) => json!({ "id": id }),
            ActionError::UnknownAction(action) => {
                json!({ "action": action, "supported": ActionKind::SUPPORTED })
            }
            ActionError::Unsupported {
                verb,
                control,
                native_type,
                accepted,
                ..
            } => json!({
                "action": verb,
                "control": control,
                "nativeType": native_type,
                "accepted": accepted,
            }),
            ActionError::ItemNotFound { value, selector } => {
                json!({ "value": value, "selector": selector })
            }
            ActionError::IndexOutOfRange {
                index,
                selector,
                count,
            } => json!({ "index": index, "selector": selector, "itemCount": count }),
        }
    }
}

/// Pre-order search by automation id over the whole tree, then by name.
pub fn find_control(root: Option<&ElementRef>, id: &str) -> Result<ElementRef, ActionError> {
    let not_found = || ActionError::NotFound(id.to_string());
    let root = root.ok_or_else(not_found)?;
    let all = root.descendants();
    all.iter()
        .find(|e| e.is_a(NativeClass::FrameworkElement) && e.automation_id() == Some(id))
        .or_else(|| {
            all.iter()
                .find(|e| e.is_a(NativeClass::FrameworkElement) && e.name() == Some(id))
        })
        .cloned()
        .ok_or_else(not_found)
}

pub fn execute(element: &ElementRef, command: &ActionCommand) -> Result<(), ActionError> {
    debug!(
        action = command.action.as_str(),
        id = command.id.as_str(),
        native_type = element.type_name(),
        "executing action"
    );
    let value = command.value.as_deref().unwrap_or_default();
    match &command.action {
        ActionKind::Click => click(element),
        ActionKind::Type => set_text(element, value, "type into"),
        ActionKind::Toggle => toggle(element),
        ActionKind::Select => select(element, value),
        ActionKind::Clear => set_text(element, "", "clear"),
        ActionKind::Other(raw) => Err(ActionError::UnknownAction(raw.clone())),
    }
}

/// Find, act and re-map the acted-on control in one pass. Failures become
/// an unsuccessful result instead of an error.
pub fn perform(root: Option<&ElementRef>, command: &ActionCommand) -> ActionResult {
    let outcome = find_control(root, &command.id)
        .and_then(|element| execute(&element, command).map(|()| element));
    match outcome {
        Ok(element) => ActionResult::succeeded(TreeMapper::new().map(&element, 0, 0)),
        Err(e) => {
            debug!(id = command.id.as_str(), error = %e, "action failed");
            ActionResult::failed(e.to_string())
        }
    }
}

fn unsupported(
    element: &ElementRef,
    verb: &'static str,
    reason: &'static str,
    accepted: &'static [&'static str],
) -> ActionError {
    ActionError::Unsupported {
        verb,
        control: element.display_name().to_string(),
        native_type: element.type_name().to_string(),
        reason,
        accepted,
    }
}

fn click(element: &ElementRef) -> Result<(), ActionError> {
    if element.is_a(NativeClass::ButtonBase) {
        if let Some(binding) = element.command() {
            binding.command.execute(binding.parameter.as_deref());
            return Ok(());
        }
    }
    if element.invoke() {
        return Ok(());
    }
    Err(unsupported(
        element,
        "click",
        "not a recognized button type or has no invoke capability",
        CLICKABLES,
    ))
}

fn set_text(element: &ElementRef, value: &str, verb: &'static str) -> Result<(), ActionError> {
    let accepted = [
        NativeClass::TextBox,
        NativeClass::PasswordBox,
        NativeClass::AutoSuggestBox,
        NativeClass::RichEditBox,
    ]
    .into_iter()
    .any(|class| element.is_a(class));

    if accepted {
        match &mut *element.widget_mut() {
            Widget::Text(input) => {
                input.text = value.to_string();
                return Ok(());
            }
            Widget::Password { password, .. } => {
                *password = value.to_string();
                return Ok(());
            }
            _ => {}
        }
    }
    Err(unsupported(
        element,
        verb,
        "not a text input control",
        TEXT_INPUTS,
    ))
}

fn toggle(element: &ElementRef) -> Result<(), ActionError> {
    if element.is_a(NativeClass::ToggleSwitch) {
        if let Widget::Switch { on, .. } = &mut *element.widget_mut() {
            *on = !*on;
            return Ok(());
        }
    } else if element.is_a(NativeClass::RadioButton) {
        element.set_checked(Some(true));
        return Ok(());
    } else if element.is_a(NativeClass::ToggleButton) {
        let current = match &*element.widget() {
            Widget::Toggle { checked, .. } => checked.unwrap_or(false),
            _ => false,
        };
        element.set_checked(Some(!current));
        return Ok(());
    }
    Err(unsupported(element, "toggle", "not a toggle control", TOGGLES))
}

fn select(element: &ElementRef, value: &str) -> Result<(), ActionError> {
    let is_selector =
        element.is_a(NativeClass::ComboBox) || element.is_a(NativeClass::ListBox);
    if !is_selector {
        return Err(unsupported(
            element,
            "select in",
            "not a selector control",
            SELECTORS,
        ));
    }

    let selector = element.display_name().to_string();
    let mut widget = element.widget_mut();
    let Widget::Items(list) = &mut *widget else {
        return Err(ActionError::ItemNotFound {
            value: value.to_string(),
            selector,
        });
    };

    if let Ok(index) = value.trim().parse::<i32>() {
        let count = list.items.len();
        if index < -1 || usize::try_from(index).is_ok_and(|i| i >= count) {
            return Err(ActionError::IndexOutOfRange {
                index,
                selector,
                count,
            });
        }
        list.selected_index = index;
        return Ok(());
    }

    match list.items.iter().position(|item| item == value) {
        Some(position) => {
            list.selected_index = position as i32;
            Ok(())
        }
        None => Err(ActionError::ItemNotFound {
            value: value.to_string(),
            selector,
        }),
    }
}
