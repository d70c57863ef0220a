use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::gamification::{BoundingBox, ScoringTable};

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringTable,
    pub region: BoundingBox,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scoring = match env::var("REEFWATCH_SCORING_TABLE") {
            Ok(path) if !path.trim().is_empty() => load_scoring_table(PathBuf::from(path))?,
            _ => ScoringTable::default(),
        };

        let region = match env::var("REEFWATCH_REGION") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<BoundingBox>()
                .map_err(|reason| ConfigError::InvalidRegion { value: raw, reason })?,
            _ => BoundingBox::BAHAMAS,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring,
            region,
        })
    }
}

fn load_scoring_table(path: PathBuf) -> Result<ScoringTable, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ScoringTableIo {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ScoringTableFormat { path, source })
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRegion {
        value: String,
        reason: String,
    },
    ScoringTableIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ScoringTableFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRegion { value, reason } => {
                write!(f, "REEFWATCH_REGION '{}' is invalid: {}", value, reason)
            }
            ConfigError::ScoringTableIo { path, .. } => {
                write!(f, "unable to read scoring table {}", path.display())
            }
            ConfigError::ScoringTableFormat { path, .. } => {
                write!(f, "scoring table {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidRegion { .. } => None,
            ConfigError::ScoringTableIo { source, .. } => Some(source),
            ConfigError::ScoringTableFormat { source, .. } => Some(source),
        }
    }
}
