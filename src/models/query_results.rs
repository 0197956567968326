use serde::Deserialize;

use super::column::QueryColumn;
use super::error_detail::QueryError;
use super::stats::StmtStats;
use super::wire::WireValue;

/// One page of a statement execution.
///
/// The initial POST and every continuation GET return this shape, keyed to
/// the current page. `next_uri` absent means the engine has produced all
/// pages.
///
/// # Example (JSON representation)
///
/// ```json
/// {
///   "id": "20240101_000000_00001_abcde",
///   "infoUri": "http://engine:8080/ui/query.html?20240101_000000_00001_abcde",
///   "nextUri": "http://engine:8080/v1/statement/20240101_000000_00001_abcde/1",
///   "columns": [{"name": "_col0", "type": "integer"}],
///   "data": [[1]],
///   "stats": {"state": "RUNNING"}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResults {
    pub id: String,

    #[serde(rename = "infoUri", default)]
    pub info_uri: String,

    /// Continuation link; absent on the terminal page.
    #[serde(rename = "nextUri", default)]
    pub next_uri: Option<String>,

    /// Cooperative-cancellation link, when the engine offers one.
    #[serde(rename = "partialCancelUri", default)]
    pub partial_cancel_uri: Option<String>,

    /// Column metadata; populated on the first page that carries any.
    #[serde(default)]
    pub columns: Vec<QueryColumn>,

    /// Row batch, positionally aligned with `columns`.
    #[serde(default)]
    pub data: Vec<Vec<WireValue>>,

    #[serde(default)]
    pub stats: StmtStats,

    /// Engine-reported failure; a non-empty `errorName` is terminal.
    #[serde(default)]
    pub error: Option<QueryError>,
}
