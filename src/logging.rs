//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::Error;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a subscriber is
/// already installed or `default_filter` does not parse.
pub fn init(default_filter: &str, json: bool) -> Result<(), Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| Error::Tracing(e.to_string()))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    installed.map_err(|e| Error::Tracing(e.to_string()))
}
