// src/execution/error.rs
//! Run-level failures of the audit engine

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Errors that abort an audit run
///
/// Rule-level problems never appear here; they become failed outcomes instead.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Store root '{root}' is unusable: {source}")]
    RootUnavailable {
        root: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid rule catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("Audit run was cancelled")]
    Cancelled,
}

impl AuditError {
    /// Whether retrying the run later could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuditError::RootUnavailable { .. } | AuditError::Cancelled
        )
    }
}
