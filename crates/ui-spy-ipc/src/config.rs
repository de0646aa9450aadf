use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 54321;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
/// Mapped trees nest two JSON levels per control, so the ceiling sits well
/// above serde_json's default of 128.
pub const MIN_MAX_DEPTH: usize = 512;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

pub const PORT_ENV: &str = "UI_SPY_PORT";
pub const CONNECT_TIMEOUT_ENV: &str = "SPY_CONNECT_TIMEOUT_MS";
pub const MAX_DEPTH_ENV: &str = "UI_SPY_MAX_DEPTH";
pub const MAX_FRAME_BYTES_ENV: &str = "UI_SPY_MAX_FRAME_BYTES";

pub(crate) fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Port from `UI_SPY_PORT`, falling back to the well-known default.
pub fn port_from_env() -> u16 {
    env_parse(PORT_ENV).unwrap_or(DEFAULT_PORT)
}

/// Depth from `UI_SPY_MAX_DEPTH`, never below [`MIN_MAX_DEPTH`].
pub fn max_depth_from_env() -> usize {
    env_parse::<usize>(MAX_DEPTH_ENV)
        .unwrap_or(MIN_MAX_DEPTH)
        .max(MIN_MAX_DEPTH)
}

/// Controller-side settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub port: u16,
    pub connect_timeout: Duration,
    pub max_depth: usize,
    pub max_frame_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            port: port_from_env(),
            connect_timeout: Duration::from_millis(
                env_parse(CONNECT_TIMEOUT_ENV).unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            max_depth: max_depth_from_env(),
            max_frame_bytes: env_parse(MAX_FRAME_BYTES_ENV).unwrap_or(DEFAULT_MAX_FRAME_BYTES),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(MIN_MAX_DEPTH);
        self
    }

    pub fn with_max_frame_bytes(mut self, max: usize) -> Self {
        self.max_frame_bytes = max;
        self
    }

    pub fn connect_timeout_ms(&self) -> u64 {
        self.connect_timeout.as_millis() as u64
    }
}
