//! The automation service: every operation marshals onto the UI thread,
//! does its read or mutate-then-read there, and returns plain model values.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use tracing::info;
use ui_spy_core::executor;
use ui_spy_core::model::AbstractControl;
use ui_spy_core::model::ActionCommand;
use ui_spy_core::model::ActionResult;
use ui_spy_core::model::NavigationInfo;
use ui_spy_core::model::ScreenSnapshot;
use ui_spy_core::navigation;
use ui_spy_core::SpyApi;
use ui_spy_core::TreeMapper;
use ui_spy_core::UiHandle;

use crate::config::AgentConfig;
use crate::config::DEFAULT_TREE_DEPTH;
use crate::config::SNAPSHOT_DEPTH;
use crate::error::ServiceError;
use crate::snapshot_store::validate_component;
use crate::snapshot_store::FsSnapshotStore;
use crate::snapshot_store::SnapshotStore;

pub struct AutomationService {
    ui: UiHandle,
    mapper: TreeMapper,
    store: Arc<dyn SnapshotStore>,
    tree_depth: usize,
    snapshot_depth: usize,
}

impl AutomationService {
    pub fn new(ui: UiHandle, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            ui,
            mapper: TreeMapper::new(),
            store,
            tree_depth: DEFAULT_TREE_DEPTH,
            snapshot_depth: SNAPSHOT_DEPTH,
        }
    }

    pub fn from_config(ui: UiHandle, config: &AgentConfig) -> Self {
        let store = Arc::new(FsSnapshotStore::new(&config.snapshot_dir));
        let mut service = Self::new(ui, store);
        service.tree_depth = config.tree_depth;
        service.snapshot_depth = config.snapshot_depth;
        service
    }

    /// Depth used when a tree request does not name one.
    pub fn default_tree_depth(&self) -> usize {
        self.tree_depth
    }

    fn capture(&self, max_depth: usize) -> Result<Vec<AbstractControl>, ServiceError> {
        let mapper = self.mapper;
        let controls = self.ui.invoke(move |window| {
            window
                .content()
                .and_then(|root| mapper.map(&root, 0, max_depth))
                .into_iter()
                .collect::<Vec<_>>()
        })?;
        Ok(controls)
    }
}

impl SpyApi for AutomationService {
    type Error = ServiceError;

    fn get_tree(&self, max_depth: usize) -> Result<Vec<AbstractControl>, ServiceError> {
        let controls = self.capture(max_depth)?;
        if controls.is_empty() {
            debug!("Window has no content to map");
        }
        Ok(controls)
    }

    fn save_snapshot(&self, name: &str, phase: &str) -> Result<ScreenSnapshot, ServiceError> {
        validate_component(name)?;
        validate_component(phase)?;

        let controls = self.capture(self.snapshot_depth)?;
        let page_name = self.ui.invoke(|window| {
            window
                .content()
                .and_then(|root| navigation::current_page_name(&root))
        })?;

        let snapshot = ScreenSnapshot {
            name: name.to_string(),
            phase: phase.to_string(),
            page_name,
            timestamp: Utc::now(),
            controls,
        };
        let file_name = self.store.save(&snapshot)?;
        info!(file = %file_name, "Snapshot saved");
        Ok(snapshot)
    }

    fn list_snapshots(&self) -> Result<Vec<String>, ServiceError> {
        self.store.list()
    }

    fn get_snapshot(&self, name: &str) -> Result<Option<ScreenSnapshot>, ServiceError> {
        self.store.load(name)
    }

    fn do_action(&self, command: &ActionCommand) -> Result<ActionResult, ServiceError> {
        let cmd = command.clone();
        let result = self
            .ui
            .invoke(move |window| executor::perform(window.content().as_ref(), &cmd));
        match result {
            Ok(result) => {
                debug!(
                    action = %command.action,
                    id = %command.id,
                    success = result.success,
                    "Action performed"
                );
                Ok(result)
            }
            Err(e) => Ok(ActionResult::failed(ServiceError::from(e).to_string())),
        }
    }

    fn get_navigation(&self) -> Result<NavigationInfo, ServiceError> {
        let info = self
            .ui
            .invoke(|window| navigation::navigation_info(window.content().as_ref()))?;
        Ok(info)
    }
}
