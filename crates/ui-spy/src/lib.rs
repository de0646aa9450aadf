#![deny(clippy::all)]

pub mod commands;
pub mod demo;
pub mod error;
pub mod flow;
pub mod serve;
pub mod tools;

pub use error::CliError;
pub use flow::FlowReport;
pub use flow::FlowRunner;
pub use tools::Tool;
pub use tools::ToolOutput;
