pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod quota;
pub mod registry;
pub mod scheduler;
pub mod service;

pub use context::RequestContext;
pub use error::{ChatError, ProviderError};
pub use provider::{ChatProvider, CompletionStream, ProviderTag};
pub use registry::ProviderRegistry;
pub use service::ChatService;

use config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over the configured level. Can only be
/// called once per process.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
