use crate::error::PathkitResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, info_span, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the process-wide subscriber: fmt output filtered by `RUST_LOG`
/// (default `info`) plus the layer that lets errors capture span traces.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> PathkitResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| crate::err!("Failed to install tracing subscriber: {}", e))
}
