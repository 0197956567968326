//! Progress callbacks and best-effort cancellation.
//!
//! A caller-supplied [`QueryCallback`] is notified with the query id, a live
//! statistics snapshot, and a canceller each time a page is fetched,
//! including the initial submission response.

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::time::Instant;

use crate::error::{Result, TrinoLinkError};
use crate::models::StmtStats;
use crate::transport::{Transport, DEFAULT_CANCEL_QUERY_TIMEOUT};

/// Observer for statement progress.
///
/// Invoked once with the submission response and again for every fetched
/// page; never invoked concurrently for the same execution.
pub trait QueryCallback: Send + Sync {
    fn on_updated(&self, info: QueryInfo);
}

/// Snapshot delivered to a [`QueryCallback`].
pub struct QueryInfo {
    /// Engine-assigned query identifier.
    pub query_id: String,
    /// Statistics for the page that triggered this notification.
    pub stats: StmtStats,
    /// Handle to request cancellation; absent once the execution has no
    /// outstanding continuation link.
    pub canceller: Option<QueryCanceller>,
}

/// Best-effort server-side cancellation of an in-flight statement.
///
/// Cancellation is advisory: failure to cancel is reported but rolls back
/// nothing the caller has already observed.
#[derive(Clone)]
pub struct QueryCanceller {
    transport: Transport,
    uri: String,
    headers: HeaderMap,
}

impl QueryCanceller {
    pub(crate) fn new(transport: Transport, uri: String, headers: HeaderMap) -> Self {
        Self {
            transport,
            uri,
            headers,
        }
    }

    /// Ask the engine to stop the query by deleting the continuation (or
    /// partial-cancel) link.  A `204 No Content` answer is a successful
    /// no-op, not an error.
    pub async fn cancel(&self) -> Result<()> {
        debug!("[CANCEL] DELETE {}", self.uri);
        let deadline = Instant::now() + DEFAULT_CANCEL_QUERY_TIMEOUT;
        match self
            .transport
            .execute(
                Method::DELETE,
                &self.uri,
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
            Err(TrinoLinkError::QueryFailed {
                status_code: 204, ..
            }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for QueryCanceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCanceller")
            .field("uri", &self.uri)
            .finish()
    }
}
