use crate::config::TelemetryConfig;
use std::error::Error;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Failure to set up logging before a relief run starts.
#[derive(Debug)]
pub enum TelemetryError {
    /// `CLEARANCE_LOG_LEVEL` did not parse as an `EnvFilter` directive.
    InvalidLogLevel { directive: String, source: ParseError },
    /// Another global subscriber was installed first.
    SubscriberInstall(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidLogLevel { directive, source } => write!(
                f,
                "CLEARANCE_LOG_LEVEL '{directive}' is not a valid tracing filter: {source}"
            ),
            TelemetryError::SubscriberInstall(err) => {
                write!(f, "failed to install tracing subscriber: {err}")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TelemetryError::InvalidLogLevel { source, .. } => Some(source),
            TelemetryError::SubscriberInstall(err) => Some(err.as_ref()),
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so CSV and JSON output on
/// stdout stay clean; `RUST_LOG` overrides the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::SubscriberInstall)
}

fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|source| {
                TelemetryError::InvalidLogLevel {
                    directive: config.log_level.clone(),
                    source,
                }
            })
        }
    }
}
