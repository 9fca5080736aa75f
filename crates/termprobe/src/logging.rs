//! Log output for tests.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `termprobe=debug`
pub const ENV_LOG: &str = "TERMPROBE_LOG";

/// Filter used when [`ENV_LOG`] is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install a fmt subscriber that writes through libtest's capture.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}
