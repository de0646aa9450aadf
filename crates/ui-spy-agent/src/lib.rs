#![deny(clippy::all)]

mod config;
mod connector;
mod error;
mod router;
mod service;
pub mod snapshot_store;

pub use config::AgentConfig;
pub use config::DEFAULT_TREE_DEPTH;
pub use config::SNAPSHOT_DEPTH;
pub use connector::ConnectorHandle;
pub use connector::ConnectorState;
pub use connector::ReverseConnector;
pub use error::AgentError;
pub use error::ServiceError;
pub use router::handle_request;
pub use service::AutomationService;
pub use snapshot_store::FsSnapshotStore;
pub use snapshot_store::SnapshotStore;

pub type Result<T> = std::result::Result<T, ServiceError>;
