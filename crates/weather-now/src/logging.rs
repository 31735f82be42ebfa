use tracing_subscriber::EnvFilter;

use crate::config::LOG_FILTER_ENV;

pub const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr subscriber. Later calls are no-ops.
pub fn init() {
    let directive = filter_directive(
        std::env::var(LOG_FILTER_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn filter_directive(own: Option<String>, rust_log: Option<String>) -> String {
    [own, rust_log]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
