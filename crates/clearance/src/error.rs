use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::extract::ExtractError;
use crate::workflows::relief::FlowConfigError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Extract(ExtractError),
    Flow(FlowConfigError),
    Export(csv::Error),
    Summary(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Extract(err) => write!(f, "extract error: {}", err),
            AppError::Flow(err) => write!(f, "eligibility flow error: {}", err),
            AppError::Export(err) => write!(f, "results export error: {}", err),
            AppError::Summary(err) => write!(f, "summary serialization error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Extract(err) => Some(err),
            AppError::Flow(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Summary(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ExtractError> for AppError {
    fn from(value: ExtractError) -> Self {
        Self::Extract(value)
    }
}

impl From<FlowConfigError> for AppError {
    fn from(value: FlowConfigError) -> Self {
        Self::Flow(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Summary(value)
    }
}
