use serde_json::json;
use serde_json::Value;
use ui_spy_core::model::AbstractControl;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::model::ActionResult;
use ui_spy_core::model::NavigationInfo;
use ui_spy_core::model::ScreenSnapshot;
use ui_spy_core::SpyApi;

use crate::config::SessionConfig;
use crate::error::ClientError;
use crate::session::ControllerSession;
use crate::types::methods;

/// Typed remote surface of the agent, backed by a [`ControllerSession`].
pub struct SpyClient {
    session: ControllerSession,
}

impl SpyClient {
    pub fn new(config: SessionConfig) -> Self {
        Self::from_session(ControllerSession::new(config))
    }

    pub fn from_session(session: ControllerSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ControllerSession {
        &self.session
    }

    pub fn port(&self) -> u16 {
        self.session.config().port
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
    }

    /// Untyped call for methods not covered by [`SpyApi`].
    pub fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.session.invoke_value(method, params)
    }
}

impl SpyApi for SpyClient {
    type Error = ClientError;

    fn get_tree(&self, max_depth: usize) -> Result<Vec<AbstractControl>, ClientError> {
        self.session.invoke(methods::GET_TREE, json!([max_depth]))
    }

    fn save_snapshot(&self, name: &str, phase: &str) -> Result<ScreenSnapshot, ClientError> {
        self.session.invoke(methods::SAVE_SNAPSHOT, json!([name, phase]))
    }

    fn list_snapshots(&self) -> Result<Vec<String>, ClientError> {
        self.session.invoke(methods::LIST_SNAPSHOTS, Value::Null)
    }

    fn get_snapshot(&self, name: &str) -> Result<Option<ScreenSnapshot>, ClientError> {
        self.session.invoke(methods::GET_SNAPSHOT, json!([name]))
    }

    fn do_action(&self, command: &ActionCommand) -> Result<ActionResult, ClientError> {
        self.session.invoke(methods::DO_ACTION, json!([command]))
    }

    fn get_navigation(&self) -> Result<NavigationInfo, ClientError> {
        self.session.invoke(methods::GET_NAVIGATION, Value::Null)
    }
}
