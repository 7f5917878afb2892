//! # Audit Reports
//!
//! Detailed, serializable report of an audit run.

pub mod error;
pub mod generator;
pub mod types;

pub use error::ResultGenerationError;
pub use generator::ResultGenerator;
pub use types::{
    BenchmarkInfo, ComplianceCheck, ComplianceFinding, ComplianceResults, FindingSeverity,
    HostContext, ScanMetadata, ScanResult, TimestampInfo, UserContext, BENCHMARK_NAME,
};
