//! Result cursor: the pagination state machine.
//!
//! A [`RowCursor`] owns one statement execution.  It holds the current
//! continuation link, fetches pages, decodes rows through the column
//! converters, and exposes a forward-only row sequence.  Exactly one
//! continuation token is live at a time; a fetch either consumes it and
//! installs the next one (absent meaning terminal) or fails, leaving the
//! cursor permanently failed.

use std::sync::Arc;

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::time::Instant;

use crate::callback::{QueryCallback, QueryCanceller, QueryInfo};
use crate::error::{Result, TrinoLinkError};
use crate::models::{QueryError, QueryResults, StmtStats, WireValue};
use crate::transport::{CancelToken, Transport, DEFAULT_CANCEL_QUERY_TIMEOUT};
use crate::typeconv::{CellValue, TypeConverter};

/// One column of the result set: name plus its wire-type converter.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    converter: TypeConverter,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full declared type, e.g. `varchar(10)`.
    pub fn type_name(&self) -> &str {
        self.converter.type_name()
    }

    /// Declared type without a trailing length suffix, e.g. `varchar`.
    pub fn display_type_name(&self) -> &str {
        self.converter.display_type_name()
    }

    /// Parsed component names, outermost first.
    pub fn parsed_type(&self) -> &[String] {
        self.converter.parsed_type()
    }

    /// Convert one wire cell of this column.
    pub fn convert(&self, value: &WireValue) -> Result<CellValue> {
        self.converter.convert(value)
    }
}

/// Map an engine-reported page error to the client error taxonomy.
pub(crate) fn handle_page_error(status_code: u16, error: Option<&QueryError>) -> Result<()> {
    let Some(err) = error else { return Ok(()) };
    match err.error_name.as_str() {
        "" => Ok(()),
        "USER_CANCELLED" => Err(TrinoLinkError::Cancelled),
        _ => Err(TrinoLinkError::QueryFailed {
            status_code,
            reason: err.to_string(),
        }),
    }
}

/// Forward-only cursor over the pages of one statement execution.
///
/// Not designed for concurrent use: callers must not overlap `next_row`
/// with `close` or another `next_row` on the same cursor.
pub struct RowCursor {
    transport: Transport,
    headers: HeaderMap,
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
    callback: Option<Arc<dyn QueryCallback>>,

    query_id: String,
    info_uri: String,
    next_uri: Option<String>,
    columns: Option<Vec<Column>>,
    stats: StmtStats,
    data: Vec<Vec<WireValue>>,
    row_index: usize,
    err: Option<TrinoLinkError>,
    closed: bool,
}

impl RowCursor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        transport: Transport,
        headers: HeaderMap,
        deadline: Option<Instant>,
        cancel: Option<CancelToken>,
        callback: Option<Arc<dyn QueryCallback>>,
        submission: QueryResults,
    ) -> Self {
        let mut cursor = Self {
            transport,
            headers,
            deadline,
            cancel,
            callback,
            query_id: String::new(),
            info_uri: submission.info_uri.clone(),
            next_uri: None,
            columns: None,
            stats: StmtStats::default(),
            data: Vec::new(),
            row_index: 0,
            err: None,
            closed: false,
        };
        // The submission response is the first page; the submitter has
        // already applied the error policy and notified the callback.
        cursor.ingest(submission);
        cursor
    }

    /// Engine-assigned query identifier.
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Link to the engine's query detail page.
    pub fn info_uri(&self) -> &str {
        &self.info_uri
    }

    /// Statistics snapshot from the most recently fetched page.
    pub fn stats(&self) -> &StmtStats {
        &self.stats
    }

    /// Column metadata.  Forces one page fetch when not yet known; the list
    /// is immutable once captured — later pages never redefine it.
    pub async fn columns(&mut self) -> Result<&[Column]> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.columns.is_none() && !self.closed {
            if let Err(err) = self.fetch().await {
                self.err = Some(err.clone());
                return Err(err);
            }
        }
        Ok(self.columns.as_deref().unwrap_or(&[]))
    }

    /// Decode and return the next row, or `None` once the execution is
    /// exhausted.  Any cell conversion failure fails the whole row and
    /// permanently fails the cursor.
    pub async fn next_row(&mut self) -> Result<Option<Vec<CellValue>>> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        if self.closed {
            return Ok(None);
        }
        loop {
            if self.row_index < self.data.len() {
                match self.decode_current_row() {
                    Ok(row) => {
                        self.row_index += 1;
                        return Ok(Some(row));
                    }
                    Err(err) => {
                        self.err = Some(err.clone());
                        return Err(err);
                    }
                }
            }
            if self.next_uri.is_none() {
                return Ok(None);
            }
            if let Err(err) = self.fetch().await {
                self.err = Some(err.clone());
                return Err(err);
            }
        }
    }

    /// Release the execution.  When a continuation link is outstanding, a
    /// DELETE is issued against it (bounded deadline) so the engine can free
    /// server-side resources; `204 No Content` is success.  Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let Some(uri) = self.next_uri.take() else {
            return Ok(());
        };
        debug!("[CURSOR] closing {}: DELETE {}", self.query_id, uri);
        let deadline = Instant::now() + DEFAULT_CANCEL_QUERY_TIMEOUT;
        match self
            .transport
            .execute(
                Method::DELETE,
                &uri,
                None,
                self.headers.clone(),
                Some(deadline),
                None,
            )
            .await
        {
            Ok(response) => {
                let _ = response.bytes().await;
                Ok(())
            }
            // Indistinguishable from a deliberate cancellation; fold into a
            // clean close.
            Err(TrinoLinkError::QueryFailed {
                status_code: 204, ..
            }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Fetch the next page, or do nothing when no link is outstanding.
    /// Leaves the cursor with either buffered rows or no continuation link.
    pub(crate) async fn fetch(&mut self) -> Result<()> {
        loop {
            let Some(uri) = self.next_uri.clone() else {
                return Ok(());
            };
            let response = self
                .transport
                .execute(
                    Method::GET,
                    &uri,
                    None,
                    self.headers.clone(),
                    self.deadline,
                    self.cancel.as_ref(),
                )
                .await?;
            let status_code = response.status().as_u16();
            let page: QueryResults = response.json().await?;
            handle_page_error(status_code, page.error.as_ref())?;

            debug!(
                "[FETCH] {}: {} rows, state={}, next={}",
                page.id,
                page.data.len(),
                page.stats.state,
                page.next_uri.is_some(),
            );
            let cancel_uri = page.partial_cancel_uri.clone().or_else(|| page.next_uri.clone());
            self.ingest(page);

            if let Some(callback) = &self.callback {
                callback.on_updated(QueryInfo {
                    query_id: self.query_id.clone(),
                    stats: self.stats.clone(),
                    canceller: cancel_uri.map(|uri| {
                        QueryCanceller::new(self.transport.clone(), uri, self.headers.clone())
                    }),
                });
            }

            // Empty page with a live link: keep polling for the next one.
            if self.data.is_empty() && self.next_uri.is_some() {
                continue;
            }
            return Ok(());
        }
    }

    /// Replace the page-scoped state from a freshly decoded page.  Column
    /// metadata is captured from the first page that carries any and never
    /// redefined; the continuation link is retained even when the page also
    /// carries rows, so multi-page results are drained completely.
    fn ingest(&mut self, page: QueryResults) {
        self.query_id = page.id;
        if !page.info_uri.is_empty() {
            self.info_uri = page.info_uri;
        }
        self.row_index = 0;
        self.data = page.data;
        self.next_uri = page.next_uri;
        self.stats = page.stats;
        if self.columns.is_none() && !page.columns.is_empty() {
            self.columns = Some(
                page.columns
                    .iter()
                    .map(|col| Column {
                        name: col.name.clone(),
                        converter: TypeConverter::new(&col.type_name),
                    })
                    .collect(),
            );
        }
    }

    fn decode_current_row(&self) -> Result<Vec<CellValue>> {
        let columns = self.columns.as_deref().unwrap_or(&[]);
        let row = &self.data[self.row_index];
        if columns.is_empty() || columns.len() != row.len() {
            return Err(TrinoLinkError::QueryFailed {
                status_code: 200,
                reason: format!(
                    "page carried a row of {} cells but {} columns are known",
                    row.len(),
                    columns.len()
                ),
            });
        }
        let mut decoded = Vec::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(row.iter()) {
            decoded.push(column.convert(cell)?);
        }
        Ok(decoded)
    }
}

impl std::fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowCursor")
            .field("query_id", &self.query_id)
            .field("next_uri", &self.next_uri)
            .field("buffered", &self.data.len().saturating_sub(self.row_index))
            .field("closed", &self.closed)
            .finish()
    }
}
