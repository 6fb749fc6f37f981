use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::allocation::WorkflowError;
use crate::workflows::dataset::ImportError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(ImportError),
    Workflow(WorkflowError),
    UnknownProject(String),
}

impl AppError {
    /// Process exit status for the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Workflow(_) | AppError::UnknownProject(_) => 1,
            AppError::Import(_) => 3,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => 2,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Import(err) => write!(f, "dataset error: {}", err),
            AppError::Workflow(err) => {
                write!(f, "{} error: {}", err.kind().label(), err)
            }
            AppError::UnknownProject(name) => write!(f, "no project named '{}'", name),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::UnknownProject(_) => None,
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

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}
