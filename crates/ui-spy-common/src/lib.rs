#![deny(clippy::all)]

pub mod error_codes;
mod sync;
mod telemetry;

pub use sync::mutex_lock_or_recover;
pub use sync::poison_recovery_count;
pub use telemetry::init_tracing;
pub use telemetry::TelemetryGuard;
pub use telemetry::LOG_FILE_ENV;
