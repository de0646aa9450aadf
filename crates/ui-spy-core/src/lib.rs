#![deny(clippy::all)]

pub mod api;
pub mod dispatcher;
pub mod element;
pub mod executor;
pub mod mapper;
pub mod model;
pub mod navigation;

pub use api::SpyApi;
pub use dispatcher::spawn_ui_thread;
pub use dispatcher::DispatchError;
pub use dispatcher::UiDispatcher;
pub use dispatcher::UiHandle;
pub use dispatcher::Window;
pub use executor::ActionError;
pub use mapper::TreeMapper;
