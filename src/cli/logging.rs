//! Diagnostics logging, always on standard error

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT_TRACING: Once = Once::new();

/// Level for this crate given the number of `-v` flags
fn level(verbosity: u64) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides `verbosity` when set. Later calls do nothing.
pub fn init(verbosity: u64) {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("bilan={}", level(verbosity))));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
