//! Scripted flows: a JSON list of steps replayed against any [`SpyApi`].

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;
use ui_spy_agent::DEFAULT_TREE_DEPTH;
use ui_spy_core::model::AbstractControl;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::model::ActionKind;
use ui_spy_core::model::Flow;
use ui_spy_core::model::FlowStep;
use ui_spy_core::SpyApi;

use crate::error::CliError;

pub const DEFAULT_WAIT_MS: u64 = 1000;
pub const DEFAULT_SNAPSHOT_PHASE: &str = "flow";

/// Abstracts `thread::sleep` so tests can run waits instantly.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub index: usize,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowReport {
    pub name: String,
    pub passed: bool,
    pub steps: Vec<StepReport>,
}

pub fn load_flow(path: &Path) -> Result<Flow, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::FlowRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::FlowParse {
        path: path.to_path_buf(),
        source,
    })
}

pub struct FlowRunner<'a, A, S = RealSleeper> {
    api: &'a A,
    sleeper: S,
}

impl<'a, A: SpyApi> FlowRunner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            sleeper: RealSleeper,
        }
    }
}

impl<'a, A: SpyApi, S: Sleeper> FlowRunner<'a, A, S> {
    pub fn with_sleeper(api: &'a A, sleeper: S) -> Self {
        Self { api, sleeper }
    }

    pub fn run(&self, flow: &Flow) -> FlowReport {
        info!(flow = %flow.name, steps = flow.steps.len(), "Running flow");
        if let Some(precondition) = &flow.precondition {
            debug!(precondition = %precondition, "Flow precondition");
        }

        let mut steps = Vec::with_capacity(flow.steps.len());
        for (index, step) in flow.steps.iter().enumerate() {
            let outcome = self.run_step(flow, step);
            if let Some(ms) = step.wait_after {
                self.sleeper.sleep(Duration::from_millis(ms));
            }

            let failed = outcome.is_err();
            if let Err(error) = &outcome {
                warn!(flow = %flow.name, index, action = %step.action, error = %error, "Flow step failed");
            }
            steps.push(StepReport {
                index,
                action: step.action.clone(),
                success: !failed,
                error: outcome.err(),
                description: step.description.clone(),
            });

            if failed && flow.stop_on_fail {
                break;
            }
        }

        let passed = steps.iter().all(|s| s.success);
        info!(flow = %flow.name, passed, "Flow finished");
        FlowReport {
            name: flow.name.clone(),
            passed,
            steps,
        }
    }

    fn run_step(&self, flow: &Flow, step: &FlowStep) -> Result<(), String> {
        match step.action.to_ascii_lowercase().as_str() {
            "click" | "type" | "toggle" | "select" | "clear" => self.control_action(step),
            "wait" => {
                let ms = step.timeout.unwrap_or(DEFAULT_WAIT_MS);
                self.sleeper.sleep(Duration::from_millis(ms));
                Ok(())
            }
            "snapshot" => {
                let name = step
                    .name
                    .as_deref()
                    .ok_or("snapshot step needs a 'name'")?;
                let phase = flow
                    .snapshot_phase
                    .as_deref()
                    .unwrap_or(DEFAULT_SNAPSHOT_PHASE);
                self.api
                    .save_snapshot(name, phase)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            }
            "assert" => self.assert(step),
            _ => Err(format!("Unknown step action '{}'", step.action)),
        }
    }

    fn control_action(&self, step: &FlowStep) -> Result<(), String> {
        let id = step
            .id
            .as_deref()
            .ok_or_else(|| format!("{} step needs an 'id'", step.action))?;
        let mut command = ActionCommand::new(ActionKind::from(step.action.as_str()), id);
        command.value = step.value.clone();

        let result = self.api.do_action(&command).map_err(|e| e.to_string())?;
        if result.success {
            Ok(())
        } else {
            Err(result
                .error
                .unwrap_or_else(|| format!("{} on '{}' failed", step.action, id)))
        }
    }

    fn assert(&self, step: &FlowStep) -> Result<(), String> {
        let id = step.id.as_deref().ok_or("assert step needs an 'id'")?;
        let property = step
            .property
            .as_deref()
            .ok_or("assert step needs a 'property'")?;

        let tree = self
            .api
            .get_tree(DEFAULT_TREE_DEPTH)
            .map_err(|e| e.to_string())?;
        let control = tree
            .iter()
            .find_map(|root| root.find(id))
            .ok_or_else(|| format!("Control '{}' not found in tree", id))?;
        let actual = read_property(control, property)
            .ok_or_else(|| format!("Unknown property '{}'", property))?;

        check_predicates(step, &actual).map_err(|detail| match &step.message {
            Some(message) => message.clone(),
            None => format!("Expected '{}' of '{}' {}", property, id, detail),
        })
    }
}

/// Reads `label`, `kind`, `nativeType` or any state field by its wire name.
/// Absent optional fields read as null.
fn read_property(control: &AbstractControl, property: &str) -> Option<Value> {
    match property {
        "label" => Some(control.label.clone().map(Value::from).unwrap_or(Value::Null)),
        "kind" => Some(Value::from(control.kind.as_str())),
        "nativeType" => Some(
            control
                .native_type
                .clone()
                .map(Value::from)
                .unwrap_or(Value::Null),
        ),
        "id" => Some(Value::from(control.id.clone())),
        _ => {
            let state = serde_json::to_value(&control.state).ok()?;
            let known = [
                "value",
                "placeholder",
                "enabled",
                "visible",
                "interactive",
                "readOnly",
                "checked",
                "selectedIndex",
                "itemCount",
                "opacity",
            ];
            if !known.contains(&property) {
                return None;
            }
            Some(state.get(property).cloned().unwrap_or(Value::Null))
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Every predicate present on the step must hold.
fn check_predicates(step: &FlowStep, actual: &Value) -> Result<(), String> {
    let text = as_text(actual);

    if let Some(needle) = &step.contains {
        if !text.contains(needle.as_str()) {
            return Err(format!("to contain '{}', got '{}'", needle, text));
        }
    }
    if let Some(expected) = &step.equals {
        if &text != expected {
            return Err(format!("to equal '{}', got '{}'", expected, text));
        }
    }
    if let Some(bound) = step.gt {
        match as_number(actual) {
            Some(n) if n > bound as f64 => {}
            _ => return Err(format!("to be greater than {}, got '{}'", bound, text)),
        }
    }
    if let Some(bound) = step.lt {
        match as_number(actual) {
            Some(n) if n < bound as f64 => {}
            _ => return Err(format!("to be less than {}, got '{}'", bound, text)),
        }
    }
    if let Some(expected) = step.is_true {
        if actual.as_bool() != Some(expected) {
            return Err(format!("to be {}, got '{}'", expected, text));
        }
    }
    if let Some(negated) = step.is_false {
        if actual.as_bool() != Some(!negated) {
            return Err(format!("to be {}, got '{}'", !negated, text));
        }
    }
    Ok(())
}
