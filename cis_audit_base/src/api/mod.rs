//! # Public API
//!
//! Configuration and the high-level auditor used by the CLI and embedding applications.

pub mod auditor;
pub mod config;
pub mod errors;

pub use auditor::{AuditReport, Auditor};
pub use config::{AuditConfig, Backend, OutputFormat};
pub use errors::{AuditorError, ConfigError};
