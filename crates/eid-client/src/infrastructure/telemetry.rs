//! Tracing subscriber setup.
//!
//! Embedding applications usually install their own subscriber.  Those that
//! don't, and the integration tests, call [`init_tracing`] once.  The filter is
//! read from `RUST_LOG` and falls back to `info`.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs a global fmt subscriber.  Later calls are no-ops, as is the first
/// call when another subscriber is already installed.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .try_init();
    });
}
