//! Logging setup
//!
//! Installs a global tracing subscriber writing to stdout. The filter comes
//! from `RUST_LOG` and defaults to `pulmoscan=info`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "pulmoscan=info";

/// Initialize tracing. Calling it twice is harmless: the second
/// subscriber is rejected and the first one stays in place.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(false));

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::debug!("Logging initialized");
    }
}
