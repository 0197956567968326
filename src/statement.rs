//! Statement submission.
//!
//! Builds the initial POST against the engine's statement endpoint,
//! including parameter binding through an `EXECUTE ... USING` rewrite, and
//! produces the execution's [`RowCursor`].

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tokio::time::Instant;

use crate::callback::{QueryCallback, QueryCanceller, QueryInfo};
use crate::client::TrinoClient;
use crate::cursor::{handle_page_error, RowCursor};
use crate::error::{Result, TrinoLinkError};
use crate::headers::PREPARED_STATEMENT_NAME;
use crate::models::QueryResults;
use crate::serial::Parameter;
use crate::transport::CancelToken;

/// One statement execution under construction.
///
/// Created with [`TrinoClient::statement`]; consumed by [`execute`].
///
/// [`execute`]: StatementBuilder::execute
pub struct StatementBuilder<'a> {
    client: &'a TrinoClient,
    sql: String,
    params: Vec<Parameter>,
    user: Option<String>,
    callback: Option<Arc<dyn QueryCallback>>,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl<'a> StatementBuilder<'a> {
    pub(crate) fn new(client: &'a TrinoClient, sql: String) -> Self {
        Self {
            client,
            sql,
            params: Vec::new(),
            user: None,
            callback: None,
            timeout: None,
            cancel: None,
        }
    }

    /// Bind one argument.  Any bound argument switches submission to the
    /// prepared `EXECUTE ... USING` form.
    pub fn param(mut self, value: impl Into<Parameter>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Act as this user for this statement, overriding the connection user.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Install a progress callback, notified on submission and on every
    /// fetched page.
    pub fn callback(mut self, callback: Arc<dyn QueryCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Overall deadline for this execution, covering submission and every
    /// page fetch.  Without one, each call uses the client's default query
    /// timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a cancellation token observed by every wait of this execution.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Submit the statement and return a cursor over its result pages.
    pub async fn execute(self) -> Result<RowCursor> {
        let flavor = self.client.flavor();
        let mut headers = self.client.base_headers().clone();
        if let Some(user) = &self.user {
            insert_header(&mut headers, flavor.user(), user)?;
        }

        let query = if self.params.is_empty() {
            self.sql.clone()
        } else {
            let mut literals = Vec::with_capacity(self.params.len());
            for param in &self.params {
                literals.push(param.to_literal()?);
            }
            // One prepared-statement binding regardless of argument count.
            let binding = format!(
                "{}={}",
                PREPARED_STATEMENT_NAME,
                urlencoding::encode(&self.sql)
            );
            insert_header(&mut headers, flavor.prepared_statement(), &binding)?;
            format!(
                "EXECUTE {} USING {}",
                PREPARED_STATEMENT_NAME,
                literals.join(", ")
            )
        };

        let deadline = self.timeout.map(|t| Instant::now() + t);
        let url = format!("{}/v1/statement", self.client.base_url());
        debug!("[STMT] POST {} ({} bytes)", url, query.len());
        let response = self
            .client
            .transport()
            .execute(
                Method::POST,
                &url,
                Some(query),
                headers.clone(),
                deadline,
                self.cancel.as_ref(),
            )
            .await?;
        let status_code = response.status().as_u16();
        let page: QueryResults = response.json().await?;
        handle_page_error(status_code, page.error.as_ref())?;
        debug!("[STMT] submitted: id={}, state={}", page.id, page.stats.state);

        // Initial notification, before any row fetch is attempted.
        if let Some(callback) = &self.callback {
            let cancel_uri = page
                .partial_cancel_uri
                .clone()
                .or_else(|| page.next_uri.clone());
            callback.on_updated(QueryInfo {
                query_id: page.id.clone(),
                stats: page.stats.clone(),
                canceller: cancel_uri.map(|uri| {
                    QueryCanceller::new(self.client.transport().clone(), uri, headers.clone())
                }),
            });
        }

        Ok(RowCursor::new(
            self.client.transport().clone(),
            headers,
            deadline,
            self.cancel,
            self.callback,
            page,
        ))
    }
}

pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| TrinoLinkError::Configuration(format!("invalid header {:?}: {}", name, e)))?;
    let value = HeaderValue::from_str(value).map_err(|e| {
        TrinoLinkError::Configuration(format!("invalid value for header {:?}: {}", name, e))
    })?;
    headers.insert(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_header() {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "X-Trino-User", "alice").unwrap();
        assert_eq!(headers.get("x-trino-user").unwrap(), "alice");
        assert!(insert_header(&mut headers, "X-Trino-User", "bad\nvalue").is_err());
    }
}
