use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings for a collection run.
///
/// Everything here is read once at startup; per-session values such as the
/// query and location travel in the session request instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub selectors_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub target_count: usize,
    pub enrich_details: bool,
    pub max_scroll_attempts: u32,
    pub max_iterations: u32,
    pub nudge_after: usize,
    pub root_wait_secs: u64,
    pub settle_ms: u64,
    pub short_pause_ms: u64,
    pub long_pause_ms: u64,
    pub detail_pause_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn root_wait(&self) -> Duration {
        Duration::from_secs(self.root_wait_secs)
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[must_use]
    pub fn short_pause(&self) -> Duration {
        Duration::from_millis(self.short_pause_ms)
    }

    #[must_use]
    pub fn long_pause(&self) -> Duration {
        Duration::from_millis(self.long_pause_ms)
    }

    #[must_use]
    pub fn detail_pause(&self) -> Duration {
        Duration::from_millis(self.detail_pause_ms)
    }
}
