//! # trino-link
//!
//! Async client for Trino and Presto coordinators, speaking the HTTP
//! statement protocol: a statement is POSTed once, then its result is
//! drained by following continuation links page by page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trino_link::TrinoClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TrinoClient::builder()
//!     .base_url("http://localhost:8080")
//!     .user("alice")
//!     .catalog("hive")
//!     .schema("default")
//!     .build()?;
//!
//! let mut rows = client.query("SELECT nationkey, name FROM nation").await?;
//! for column in rows.columns().await? {
//!     println!("{} {}", column.name(), column.type_name());
//! }
//! while let Some(row) = rows.next_row().await? {
//!     println!("{:?}", row);
//! }
//! rows.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - Statement submission with parameter binding (`EXECUTE ... USING`)
//! - Transparent `503` retry with capped backoff
//! - Cooperative cancellation through [`CancelToken`]
//! - Progress callbacks with per-page statistics
//! - Null-aware conversion of scalars, temporals, and nested collections

pub mod auth;
pub mod callback;
pub mod client;
pub mod cursor;
pub mod error;
pub mod headers;
pub mod models;
pub mod nullable;
pub mod registry;
pub mod serial;
pub mod statement;
pub mod transport;
pub mod typeconv;

pub use auth::AuthProvider;
pub use callback::{QueryCallback, QueryCanceller, QueryInfo};
pub use client::{TrinoClient, TrinoClientBuilder};
pub use cursor::{Column, RowCursor};
pub use error::{Result, TrinoLinkError};
pub use headers::HeaderFlavor;
pub use models::{QueryColumn, QueryError, QueryResults, StmtStats, WireValue};
pub use nullable::{NullSlice, NullSlice2, NullSlice3, Nullable, WireScalar};
pub use registry::{deregister_custom_client, register_custom_client};
pub use serial::Parameter;
pub use statement::StatementBuilder;
pub use transport::CancelToken;
pub use typeconv::{CellValue, TypeConverter};
