use crate::config::ConfigError;
use crate::gamification::GamificationError;
use crate::import::ExportImportError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(ExportImportError),
    Gamification(GamificationError),
    Serialization(serde_json::Error),
}

impl AppError {
    /// Process exit code: 2 for caller/input errors, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Import(_) => 2,
            AppError::Gamification(
                GamificationError::InvalidCoordinate(_)
                | GamificationError::InvalidStateTransition { .. }
                | GamificationError::MismatchedVerification { .. }
                | GamificationError::SubmitterMismatch { .. }
                | GamificationError::ObservationNotFound(_),
            ) => 2,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Gamification(_)
            | AppError::Serialization(_) => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Gamification(err) => write!(f, "gamification error: {}", err),
            AppError::Serialization(err) => write!(f, "output serialization error: {}", err),
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
            AppError::Gamification(err) => Some(err),
            AppError::Serialization(err) => Some(err),
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

impl From<ExportImportError> for AppError {
    fn from(value: ExportImportError) -> Self {
        Self::Import(value)
    }
}

impl From<GamificationError> for AppError {
    fn from(value: GamificationError) -> Self {
        Self::Gamification(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
