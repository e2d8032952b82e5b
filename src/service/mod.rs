//! The fabuverse service: routes, middleware stack and logging setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Router;
use crate::middleware::{Logging, Trace};

pub mod config;
pub mod reverse;

pub use config::{Config, LogFormat};

/// The full application: `Trace(Logging(routes))`. `/reverse` answers any
/// method.
///
/// Tracing is outermost so the request log line and every handler log carry
/// the trace identity, and so a `500` from a panicking handler still leaves
/// with trace headers.
pub fn app() -> Router {
    Router::new()
        .any("/reverse", reverse::reverse_word)
        .layer(Logging::new())
        .layer(Trace::new())
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
