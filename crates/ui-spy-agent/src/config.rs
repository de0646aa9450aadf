use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ui_spy_ipc::config::max_depth_from_env;
use ui_spy_ipc::config::port_from_env;
use ui_spy_ipc::config::DEFAULT_MAX_FRAME_BYTES;
use ui_spy_ipc::config::MAX_FRAME_BYTES_ENV;

const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;
const DEFAULT_DIAL_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_REQUEST_WORKERS: usize = 4;
const DEFAULT_SNAPSHOT_DIR: &str = "Snapshots";

/// Depth used by `GetTreeAsync` when the caller gives none.
pub const DEFAULT_TREE_DEPTH: usize = 50;
/// Snapshots are captured shallower than live tree queries.
pub const SNAPSHOT_DEPTH: usize = 8;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub port: u16,
    pub reconnect_delay: Duration,
    pub dial_timeout: Duration,
    pub max_depth: usize,
    pub max_frame_bytes: usize,
    pub request_workers: usize,
    pub snapshot_dir: PathBuf,
    pub tree_depth: usize,
    pub snapshot_depth: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            port: port_from_env(),
            reconnect_delay: Duration::from_millis(
                env::var("UI_SPY_RECONNECT_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RECONNECT_DELAY_MS),
            ),
            dial_timeout: Duration::from_millis(
                env::var("UI_SPY_DIAL_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_DIAL_TIMEOUT_MS),
            ),
            max_depth: max_depth_from_env(),
            max_frame_bytes: env::var(MAX_FRAME_BYTES_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_FRAME_BYTES),
            request_workers: env::var("UI_SPY_REQUEST_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_REQUEST_WORKERS),
            snapshot_dir: env::var("UI_SPY_SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_DIR)),
            tree_depth: DEFAULT_TREE_DEPTH,
            snapshot_depth: SNAPSHOT_DEPTH,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_request_workers(mut self, workers: usize) -> Self {
        self.request_workers = workers.max(1);
        self
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }
}
