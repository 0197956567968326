//! HTTP transport with bounded blocking and transient-failure retry.
//!
//! A single logical request is retried transparently while the engine
//! answers `503 Service Unavailable`, with golden-ratio backoff.  The loop
//! observes both the caller's deadline and an external [`CancelToken`] and
//! exits promptly on either.

use crate::error::{Result, TrinoLinkError};
use log::{debug, warn};
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Default timeout for statements executed without an explicit deadline.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for the best-effort cancellation request.
pub const DEFAULT_CANCEL_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// First retry delay after a `503` response.
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Upper bound on the delay between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(15);

/// Growth factor between consecutive retry delays.
const GOLDEN_RATIO: f64 = 1.618033988749895;

/// Response bodies are truncated to this many bytes in failure reasons.
const MAX_REASON_BYTES: usize = 8 * 1024;

/// Cooperative cancellation signal for an in-flight execution.
///
/// Cloning yields another handle to the same signal.  Cancellation is
/// one-way: once triggered, every pending and future wait observes it.
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger cancellation, waking every pending wait.
    pub fn cancel(&self) {
        // send() refuses to update once every receiver is gone, and the
        // token usually has none until a wait subscribes.
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Retry delay schedule: starts at 100ms, grows by the golden ratio,
/// saturates at 15s.
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    delay: Duration,
}

impl Backoff {
    pub(crate) fn new() -> Self {
        Self {
            delay: INITIAL_RETRY_DELAY,
        }
    }

    /// Current delay; advances the schedule for the next call.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = self.delay.mul_f64(GOLDEN_RATIO).min(MAX_RETRY_DELAY);
        current
    }
}

/// Render a failure reason from a response body, truncated with an ellipsis
/// marker when it exceeds 8 KiB.
pub(crate) fn truncate_reason(body: &[u8]) -> String {
    if body.len() > MAX_REASON_BYTES {
        let mut reason = String::from_utf8_lossy(&body[..MAX_REASON_BYTES]).into_owned();
        reason.push_str("...");
        reason
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Issues one logical HTTP request against the engine.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    default_query_timeout: Duration,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, default_query_timeout: Duration) -> Self {
        Self {
            http,
            default_query_timeout,
        }
    }

    /// Perform the request, retrying on `503` until success, a terminal
    /// status, deadline expiry, or cancellation.  A deadline that elapses
    /// mid-retry surfaces the engine's busy state as `QueryFailed` with
    /// status 503.
    ///
    /// The returned response has status `200`; every other exit path has
    /// fully consumed and dropped the response body so the connection can be
    /// reused.
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        headers: HeaderMap,
        deadline: Option<Instant>,
        cancel: Option<&CancelToken>,
    ) -> Result<reqwest::Response> {
        let mut backoff = Backoff::new();
        let mut attempt: u32 = 0;
        let mut saw_busy = false;
        loop {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(TrinoLinkError::Cancelled);
                }
            }
            let timeout = match deadline {
                Some(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        if saw_busy {
                            return Err(TrinoLinkError::QueryFailed {
                                status_code: 503,
                                reason: format!(
                                    "engine still unavailable when the deadline elapsed \
                                     ({} {}, {} attempts)",
                                    method, url, attempt
                                ),
                            });
                        }
                        return Err(TrinoLinkError::Network(format!(
                            "deadline elapsed before {} {} completed",
                            method, url
                        )));
                    }
                    remaining
                }
                None => self.default_query_timeout,
            };

            // Builders with bodies cannot be cloned; rebuild per attempt.
            attempt += 1;
            let mut request = self
                .http
                .request(method.clone(), url)
                .headers(headers.clone())
                .timeout(timeout);
            if let Some(b) = &body {
                request = request.body(b.clone());
            }
            debug!("[HTTP] {} {} (attempt {})", method, url, attempt);

            let response = request
                .send()
                .await
                .map_err(|e| TrinoLinkError::Network(e.to_string()))?;
            let status = response.status();
            match status.as_u16() {
                200 => return Ok(response),
                503 => {
                    saw_busy = true;
                    // Drain so the pooled connection stays reusable.
                    let _ = response.bytes().await;
                    let wait = backoff.next_delay();
                    if let Some(d) = deadline {
                        // A wait that outlasts the deadline cannot lead to
                        // another attempt; report the busy engine now.
                        if wait >= d.saturating_duration_since(Instant::now()) {
                            return Err(TrinoLinkError::QueryFailed {
                                status_code: 503,
                                reason: format!(
                                    "engine still unavailable when the deadline elapsed \
                                     ({} {}, {} attempts)",
                                    method, url, attempt
                                ),
                            });
                        }
                    }
                    warn!(
                        "[HTTP] engine unavailable (503), retrying {} {} in {:?}",
                        method, url, wait
                    );
                    match cancel {
                        Some(token) => {
                            tokio::select! {
                                _ = tokio::time::sleep(wait) => {}
                                _ = token.cancelled() => return Err(TrinoLinkError::Cancelled),
                            }
                        }
                        None => tokio::time::sleep(wait).await,
                    }
                }
                code => {
                    let bytes = response.bytes().await.unwrap_or_default();
                    let reason = truncate_reason(&bytes);
                    warn!("[HTTP] {} {} failed: status={}", method, url, code);
                    return Err(TrinoLinkError::QueryFailed {
                        status_code: code,
                        reason,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_by_golden_ratio_to_cap() {
        let mut backoff = Backoff::new();
        let mut previous = backoff.next_delay();
        assert_eq!(previous, Duration::from_millis(100));
        for _ in 0..30 {
            let delay = backoff.next_delay();
            assert!(delay <= MAX_RETRY_DELAY);
            if delay < MAX_RETRY_DELAY {
                // Strictly increasing by ~phi until the cap; mul_f64 rounds
                // to whole nanoseconds, so allow that much slack.
                let ratio = delay.as_secs_f64() / previous.as_secs_f64();
                assert!((ratio - GOLDEN_RATIO).abs() < 1e-6);
                assert_eq!(delay, previous.mul_f64(GOLDEN_RATIO));
                assert!(delay > previous);
            }
            previous = delay;
        }
        assert_eq!(previous, MAX_RETRY_DELAY);
    }

    #[test]
    fn test_truncate_reason() {
        assert_eq!(truncate_reason(b"short"), "short");
        let long = vec![b'x'; MAX_REASON_BYTES + 1];
        let reason = truncate_reason(&long);
        assert!(reason.ends_with("..."));
        assert_eq!(reason.len(), MAX_REASON_BYTES + 3);
    }

    #[tokio::test]
    async fn test_cancel_token_wakes_waiters() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancelled() should resolve promptly")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_token_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        // Must resolve immediately even with no pending waiter at cancel time.
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately");
    }
}
