//! Error types for configuration store access

use crate::store::command_executor::CommandError;

/// Failures raised while opening keys or reading values from a configuration store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Root '{root}' is not available: {reason}")]
    RootUnavailable { root: String, reason: String },

    #[error("Path not found: {root}\\{path}")]
    PathNotFound { root: String, path: String },

    #[error("Value '{name}' not found under '{path}'")]
    ValueMissing { path: String, name: String },

    #[error("Value '{name}' under '{path}' has type {actual}, expected {expected}")]
    ValueTypeMismatch {
        path: String,
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Access denied for {root}\\{path}")]
    AccessDenied { root: String, path: String },

    #[error("Invalid root key '{0}'")]
    InvalidRoot(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Store snapshot error: {reason}")]
    Snapshot { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = StoreError::PathNotFound {
            root: "HKLM".to_string(),
            path: r"SOFTWARE\Policies".to_string(),
        };
        assert_eq!(err.to_string(), r"Path not found: HKLM\SOFTWARE\Policies");
    }
}
