//! Subscriber setup shared by the controller and the demo agent.
//!
//! Output lines carry the thread name (`ui`, `spy-connector`, `spy-rpc-reader`,
//! `spy-worker-N`) since most work in this workspace hops between threads.

use std::fs::OpenOptions;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Environment variable naming a file that receives log output instead of stderr.
pub const LOG_FILE_ENV: &str = "UI_SPY_LOG";

/// Keeps the non-blocking log writer flushing until dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    fn from_value(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => LogTarget::File(PathBuf::from(v.trim())),
            _ => LogTarget::Stderr,
        }
    }

    fn from_env() -> Self {
        Self::from_value(std::env::var(LOG_FILE_ENV).ok())
    }
}

struct LogWriter {
    make_writer: BoxMakeWriter,
    ansi: bool,
    guard: Option<WorkerGuard>,
}

impl LogWriter {
    fn stderr() -> Self {
        Self {
            make_writer: BoxMakeWriter::new(io::stderr),
            ansi: io::stderr().is_terminal(),
            guard: None,
        }
    }

    /// Falls back to stderr when the file cannot be opened.
    fn open(target: &LogTarget) -> Self {
        let LogTarget::File(path) = target else {
            return Self::stderr();
        };
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                Self {
                    make_writer: BoxMakeWriter::new(non_blocking),
                    ansi: false,
                    guard: Some(guard),
                }
            }
            Err(err) => {
                eprintln!(
                    "Warning: cannot open log file {} ({}), logging to stderr",
                    path.display(),
                    err
                );
                Self::stderr()
            }
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// A second call leaves the first subscriber in place and returns a guard
/// that owns nothing.
pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let target = LogTarget::from_env();
    let writer = LogWriter::open(&target);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(writer.ansi)
        .with_writer(writer.make_writer)
        .try_init()
        .is_ok();

    if !installed {
        return TelemetryGuard { _guard: None };
    }
    if let LogTarget::File(path) = &target {
        tracing::debug!(path = %path.display(), "Logging to file");
    }
    TelemetryGuard {
        _guard: writer.guard,
    }
}
