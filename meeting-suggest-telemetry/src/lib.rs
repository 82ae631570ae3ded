use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("a global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// `RUST_LOG` wins over `default_filter` when it is set.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|source| TelemetryError::Filter {
            filter: default_filter.to_owned(),
            source,
        }),
    }
}

/// Logs go to stderr so that stdout stays machine readable.
pub fn setup_telemetry(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = env_filter(default_filter)?;

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(filter))
        .try_init()?;

    debug!("telemetry initialized");
    Ok(())
}
