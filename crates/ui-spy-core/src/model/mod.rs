//! Wire vocabulary shared by the agent and the controller.
//!
//! Field names are lower camel case on the wire and absent optionals are
//! omitted rather than written as `null`.

mod action;
mod control;
mod flow;
mod navigation;
mod snapshot;

pub use action::ActionCommand;
pub use action::ActionKind;
pub use action::ActionResult;
pub use control::sanitize;
pub use control::AbstractControl;
pub use control::ControlKind;
pub use control::ControlState;
pub use control::ControlVisual;
pub use flow::Flow;
pub use flow::FlowStep;
pub use navigation::NavigationInfo;
pub use snapshot::snapshot_key;
pub use snapshot::ScreenSnapshot;
