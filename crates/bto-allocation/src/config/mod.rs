use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::workflows::allocation::UnitReleasePolicy;

/// Distinguishes runtime behavior for different stages of the portal.
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

    /// Colored log output is only useful on an interactive development terminal.
    pub fn ansi_logs(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub dataset: DatasetConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("BTO_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        if data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        let unit_release = match env::var("BTO_UNIT_RELEASE") {
            Ok(raw) => raw
                .parse::<UnitReleasePolicy>()
                .map_err(|_| ConfigError::InvalidUnitRelease { value: raw })?,
            Err(_) => UnitReleasePolicy::default(),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment.ansi_logs(),
            },
            dataset: DatasetConfig {
                data_dir: PathBuf::from(data_dir),
            },
            engine: EngineConfig { unit_release },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Where the portal's user and project exports live.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub unit_release: UnitReleasePolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
    InvalidUnitRelease { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDataDir => write!(f, "BTO_DATA_DIR must not be empty"),
            ConfigError::InvalidUnitRelease { value } => write!(
                f,
                "BTO_UNIT_RELEASE must be 'retain' or 'restock', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
