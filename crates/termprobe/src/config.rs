//! Session configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default terminal width
pub const DEFAULT_WIDTH: u16 = 80;
/// Default terminal height
pub const DEFAULT_HEIGHT: u16 = 24;
/// Default session deadline in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Default snapshot directory, relative to the crate under test
pub const DEFAULT_SNAPSHOT_DIR: &str = "__tui_snapshots__";

/// Overrides the snapshot directory
pub const ENV_SNAPSHOT_DIR: &str = "TERMPROBE_SNAPSHOT_DIR";
/// `1` or `true` rewrites mismatching baselines instead of failing
pub const ENV_UPDATE_SNAPSHOTS: &str = "TERMPROBE_UPDATE_SNAPSHOTS";
/// Overrides the session deadline
pub const ENV_TIMEOUT_MS: &str = "TERMPROBE_TIMEOUT_MS";

/// Configuration for one virtual terminal session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Terminal width in columns
    pub width: u16,
    /// Terminal height in rows
    pub height: u16,
    /// Deadline for the whole session, in milliseconds
    pub timeout_ms: u64,
    /// Root directory for snapshot baselines
    pub snapshot_dir: PathBuf,
    /// Rewrite mismatching baselines instead of failing
    pub update_snapshots: bool,
    /// Snapshot namespace; defaults to the current test thread name
    pub test_name: Option<String>,
    /// Yield the thread on every poll that finds the queue empty
    pub yield_on_empty_poll: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            snapshot_dir: default_snapshot_dir(),
            update_snapshots: false,
            test_name: None,
            yield_on_empty_poll: true,
        }
    }
}

impl SessionConfig {
    /// Defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `TERMPROBE_*` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay `TERMPROBE_*` environment variables onto this config
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(ENV_SNAPSHOT_DIR) {
            if !dir.is_empty() {
                self.snapshot_dir = PathBuf::from(dir);
            }
        }
        if let Ok(flag) = std::env::var(ENV_UPDATE_SNAPSHOTS) {
            self.update_snapshots = parse_flag(&flag);
        }
        if let Some(ms) = std::env::var(ENV_TIMEOUT_MS)
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.timeout_ms = ms;
        }
        self
    }

    /// Set terminal size
    #[must_use]
    pub const fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the deadline in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the snapshot directory
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Enable or disable update mode
    #[must_use]
    pub const fn with_update_mode(mut self, update: bool) -> Self {
        self.update_snapshots = update;
        self
    }

    /// Set the snapshot namespace explicitly
    #[must_use]
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Enable or disable yielding on empty polls
    #[must_use]
    pub const fn with_yield_on_empty_poll(mut self, enabled: bool) -> Self {
        self.yield_on_empty_poll = enabled;
        self
    }

    /// Deadline as a Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Snapshot namespace: the configured name, else the current thread
    /// name (libtest names test threads after the test path).
    ///
    /// `None` on the `main` thread or an unnamed thread. Doctests and
    /// `harness = false` binaries all run there, so no shared fallback is
    /// made up for them.
    #[must_use]
    pub fn resolved_test_name(&self) -> Option<String> {
        self.test_name.clone().or_else(|| {
            std::thread::current()
                .name()
                .filter(|name| *name != "main")
                .map(ToString::to_string)
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn default_snapshot_dir() -> PathBuf {
    std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(DEFAULT_SNAPSHOT_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!((config.width, config.height), (80, 24));
        assert_eq!(config.timeout(), Duration::from_millis(5_000));
        assert!(config.snapshot_dir.ends_with(DEFAULT_SNAPSHOT_DIR));
        assert!(!config.update_snapshots);
        assert!(config.yield_on_empty_poll);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_size(20, 5)
            .with_timeout(100)
            .with_snapshot_dir("/tmp/snaps")
            .with_update_mode(true)
            .with_test_name("my_test")
            .with_yield_on_empty_poll(false);
        assert_eq!((config.width, config.height), (20, 5));
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.snapshot_dir, PathBuf::from("/tmp/snaps"));
        assert!(config.update_snapshots);
        assert_eq!(config.resolved_test_name().as_deref(), Some("my_test"));
        assert!(!config.yield_on_empty_poll);
    }

    #[test]
    fn test_thread_name_is_default_namespace() {
        let name = std::thread::Builder::new()
            .name("suite::case".to_string())
            .spawn(|| SessionConfig::default().resolved_test_name())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name.as_deref(), Some("suite::case"));
    }

    #[test]
    fn test_main_thread_has_no_namespace() {
        let resolve = |name: Option<&str>| {
            let mut builder = std::thread::Builder::new();
            if let Some(name) = name {
                builder = builder.name(name.to_string());
            }
            builder
                .spawn(|| {
                    (
                        SessionConfig::default().resolved_test_name(),
                        SessionConfig::default().with_test_name("explicit").resolved_test_name(),
                    )
                })
                .unwrap()
                .join()
                .unwrap()
        };
        for name in [Some("main"), None] {
            let (implicit, explicit) = resolve(name);
            assert_eq!(implicit, None);
            assert_eq!(explicit.as_deref(), Some("explicit"));
        }
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_yaml_partial_config() {
        let config: SessionConfig = serde_yaml_ng::from_str("width: 40\ntimeout_ms: 250\n").unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.timeout_ms, 250);
    }
}
