use chrono::NaiveDate;
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a batch run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("CLEARANCE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("CLEARANCE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_date = match env::var("CLEARANCE_EVALUATION_DATE") {
            Ok(value) if !value.trim().is_empty() => Some(
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|source| ConfigError::InvalidEvaluationDate { value, source })?,
            ),
            _ => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            evaluation: EvaluationConfig { default_date },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied when a run does not name its own evaluation date.
#[derive(Debug, Clone, Default)]
pub struct EvaluationConfig {
    pub default_date: Option<NaiveDate>,
}

impl EvaluationConfig {
    /// Explicit date first, then the configured default, then `today`.
    pub fn resolve(&self, explicit: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
        explicit.or(self.default_date).unwrap_or(today)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidEvaluationDate {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEvaluationDate { value, .. } => write!(
                f,
                "CLEARANCE_EVALUATION_DATE must be YYYY-MM-DD (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidEvaluationDate { source, .. } => Some(source),
        }
    }
}
