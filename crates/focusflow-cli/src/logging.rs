//! Logging initialization.
//!
//! Filter directives come from the `FOCUSFLOW_LOG` environment variable,
//! falling back to `logging.level` from the config file.
//!
//! ```bash
//! FOCUSFLOW_LOG=debug focusflow daemon
//! FOCUSFLOW_LOG=focusflow_core=debug,warn focusflow timer watch
//! ```

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable.
pub fn init(fallback_level: &str) {
    let filter = EnvFilter::try_from_env("FOCUSFLOW_LOG")
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
