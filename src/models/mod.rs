//! Data models for the trino-link client library.
//!
//! Defines the wire shapes of statement pages, column metadata, execution
//! statistics, engine-reported errors, and the decoded cell value type.

pub mod column;
pub mod error_detail;
pub mod query_results;
pub mod stats;
pub mod wire;

pub use column::{QueryColumn, TypeSignature};
pub use error_detail::{ErrorLocation, FailureInfo, QueryError};
pub use query_results::QueryResults;
pub use stats::{StmtStage, StmtStats};
pub use wire::WireValue;
