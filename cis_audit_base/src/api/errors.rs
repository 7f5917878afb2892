//! # API Errors

use crate::execution::AuditError;
use crate::results::ResultGenerationError;
use crate::store::StoreError;
use std::path::PathBuf;

/// Invalid or unreadable audit configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors of the high-level auditor
#[derive(Debug, thiserror::Error)]
pub enum AuditorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Could not detect the OS version ({source}); set it explicitly")]
    OsDetection {
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("Report generation failed: {0}")]
    Results(#[from] ResultGenerationError),
}

impl AuditorError {
    /// Whether the error comes from the environment rather than the configuration
    pub fn is_recoverable(&self) -> bool {
        match self {
            AuditorError::Config(_) => false,
            AuditorError::Audit(e) => e.is_recoverable(),
            _ => true,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AuditorError::Config(e) => format!("Configuration error: {}", e),
            AuditorError::Store(e) => format!("Cannot access the registry: {}", e),
            AuditorError::OsDetection { .. } => {
                "Could not detect the Windows version; pass --os-version".to_string()
            }
            AuditorError::Audit(AuditError::Cancelled) => "Audit cancelled".to_string(),
            AuditorError::Audit(e) => format!("Audit failed: {}", e),
            AuditorError::Results(e) => format!("Report generation failed: {}", e),
        }
    }
}
