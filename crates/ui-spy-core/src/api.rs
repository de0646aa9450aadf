use crate::model::AbstractControl;
use crate::model::ActionCommand;
use crate::model::ActionResult;
use crate::model::NavigationInfo;
use crate::model::ScreenSnapshot;

/// The six remote-callable automation operations.
///
/// Implemented in-process by the agent's automation service and remotely by
/// the controller's client, so flows and tools can run against either.
pub trait SpyApi {
    type Error: std::error::Error;

    fn get_tree(&self, max_depth: usize) -> Result<Vec<AbstractControl>, Self::Error>;

    fn save_snapshot(&self, name: &str, phase: &str) -> Result<ScreenSnapshot, Self::Error>;

    /// Stored snapshot file names; empty when nothing was saved yet.
    fn list_snapshots(&self) -> Result<Vec<String>, Self::Error>;

    /// `name` may be given with or without its `.json` extension.
    fn get_snapshot(&self, name: &str) -> Result<Option<ScreenSnapshot>, Self::Error>;

    /// Lookup and capability failures come back as an unsuccessful result, not an error.
    fn do_action(&self, command: &ActionCommand) -> Result<ActionResult, Self::Error>;

    fn get_navigation(&self) -> Result<NavigationInfo, Self::Error>;
}
