use tracing::subscriber::{self, SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;

/// Installs a compact stdout subscriber for binaries and demos.
///
/// The filter comes from `RUST_LOG` and falls back to `info`, which shows
/// training progress and classification hits/misses.
pub fn install_logger() -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .finish();
    subscriber::set_global_default(subscriber)
}
