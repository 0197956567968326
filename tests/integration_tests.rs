//! End-to-end tests against a scripted in-process engine.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use common::MockEngine;
use trino_link::{
    CancelToken, CellValue, HeaderFlavor, QueryCallback, QueryCanceller, QueryInfo, TrinoClient,
    TrinoLinkError,
};

fn client_for(engine: &MockEngine) -> TrinoClient {
    let _ = env_logger::builder().is_test(true).try_init();
    TrinoClient::builder()
        .base_url(engine.base_url())
        .user("tester")
        .build()
        .expect("client builds")
}

#[tokio::test]
async fn test_select_one_end_to_end() {
    let engine = MockEngine::start(vec![(
        200,
        json!({
            "id": "q1",
            "infoUri": "{BASE}/ui/q1",
            "columns": [{"name": "_col0", "type": "integer"}],
            "data": [[1]],
            "stats": {"state": "FINISHED"}
        })
        .to_string(),
    )])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT 1").await.unwrap();

    assert_eq!(rows.query_id(), "q1");
    assert!(format!("{:?}", rows).contains("q1"));
    let columns = rows.columns().await.unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name(), "_col0");
    assert_eq!(columns[0].type_name(), "integer");

    assert_eq!(
        rows.next_row().await.unwrap(),
        Some(vec![CellValue::Bigint(1)])
    );
    assert_eq!(rows.next_row().await.unwrap(), None);
    rows.close().await.unwrap();

    let requests = engine.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/v1/statement");
    assert_eq!(requests[0].body, "SELECT 1");
    assert_eq!(requests[0].header("x-trino-user"), Some("tester"));
    assert_eq!(requests[0].header("x-trino-source"), Some("trino-link"));
}

#[tokio::test]
async fn test_parameterized_statement_rewrite() {
    let engine = MockEngine::start(vec![(
        200,
        json!({"id": "q2", "stats": {"state": "FINISHED"}}).to_string(),
    )])
    .await;

    let sql = "SELECT * FROM nation WHERE regionkey = ? AND name = ?";
    let client = client_for(&engine);
    let mut rows = client
        .statement(sql)
        .param(3i64)
        .param("ASIA")
        .execute()
        .await
        .unwrap();
    assert_eq!(rows.next_row().await.unwrap(), None);

    let requests = engine.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        "EXECUTE _trino_link USING 3, 'ASIA'"
    );
    assert_eq!(requests[0].header_count("x-trino-prepared-statement"), 1);
    assert_eq!(
        requests[0].header("x-trino-prepared-statement"),
        Some(format!("_trino_link={}", urlencoding::encode(sql)).as_str())
    );
}

#[tokio::test]
async fn test_presto_flavor_prepared_header() {
    let engine = MockEngine::start(vec![(
        200,
        json!({"id": "q3", "stats": {"state": "FINISHED"}}).to_string(),
    )])
    .await;

    let client = TrinoClient::builder()
        .base_url(engine.base_url())
        .flavor(HeaderFlavor::Presto)
        .user("tester")
        .build()
        .unwrap();
    client
        .statement("SELECT ?")
        .param(true)
        .execute()
        .await
        .unwrap();

    let requests = engine.requests();
    assert_eq!(requests[0].header("x-presto-user"), Some("tester"));
    assert_eq!(requests[0].header_count("x-presto-prepared-statement"), 1);
    assert_eq!(requests[0].header_count("x-trino-prepared-statement"), 0);
    assert_eq!(requests[0].body, "EXECUTE _trino_link USING true");
}

#[tokio::test]
async fn test_engine_reported_cancellation() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q4",
                "nextUri": "{BASE}/v1/statement/q4/1",
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (
            200,
            json!({
                "id": "q4",
                "stats": {"state": "FAILED"},
                "error": {"message": "Query was canceled", "errorName": "USER_CANCELLED"}
            })
            .to_string(),
        ),
    ])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT slow()").await.unwrap();
    let err = rows.next_row().await.unwrap_err();
    assert!(err.is_cancelled());

    // The failure is sticky.
    assert!(rows.next_row().await.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_multi_page_result_is_fully_drained() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q5",
                "nextUri": "{BASE}/v1/statement/q5/1",
                "columns": [{"name": "n", "type": "bigint"}],
                "data": [[1]],
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (
            200,
            json!({
                "id": "q5",
                "nextUri": "{BASE}/v1/statement/q5/2",
                "data": [[2], [3]],
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (
            200,
            json!({"id": "q5", "stats": {"state": "FINISHED"}}).to_string(),
        ),
    ])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT n FROM t").await.unwrap();

    let mut seen = Vec::new();
    while let Some(row) = rows.next_row().await.unwrap() {
        seen.push(row);
    }
    assert_eq!(
        seen,
        vec![
            vec![CellValue::Bigint(1)],
            vec![CellValue::Bigint(2)],
            vec![CellValue::Bigint(3)],
        ]
    );
    assert_eq!(rows.stats().state, "FINISHED");
    assert_eq!(engine.requests().len(), 3);
}

#[tokio::test]
async fn test_busy_engine_is_retried() {
    let engine = MockEngine::start(vec![
        (503, String::new()),
        (
            200,
            json!({
                "id": "q6",
                "columns": [{"name": "_col0", "type": "integer"}],
                "data": [[7]],
                "stats": {"state": "FINISHED"}
            })
            .to_string(),
        ),
    ])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT 7").await.unwrap();
    assert_eq!(
        rows.next_row().await.unwrap(),
        Some(vec![CellValue::Bigint(7)])
    );

    let requests = engine.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.method == "POST"));
}

#[tokio::test]
async fn test_close_sends_one_delete() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q7",
                "nextUri": "{BASE}/v1/statement/q7/1",
                "columns": [{"name": "n", "type": "bigint"}],
                "data": [[1]],
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (204, String::new()),
    ])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT n FROM t").await.unwrap();
    rows.close().await.unwrap();
    rows.close().await.unwrap();
    assert_eq!(rows.next_row().await.unwrap(), None);

    let requests = engine.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/v1/statement/q7/1");
}

#[derive(Default)]
struct CountingCallback {
    calls: AtomicUsize,
}

impl QueryCallback for CountingCallback {
    fn on_updated(&self, info: QueryInfo) {
        assert_eq!(info.query_id, "q8");
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_callback_notified_per_page() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q8",
                "nextUri": "{BASE}/v1/statement/q8/1",
                "columns": [{"name": "n", "type": "bigint"}],
                "data": [[1]],
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (
            200,
            json!({"id": "q8", "stats": {"state": "FINISHED"}}).to_string(),
        ),
    ])
    .await;

    let callback = Arc::new(CountingCallback::default());
    let client = client_for(&engine);
    let mut rows = client
        .statement("SELECT n FROM t")
        .callback(callback.clone())
        .execute()
        .await
        .unwrap();
    while rows.next_row().await.unwrap().is_some() {}

    // Once for the submission response, once for the fetched page.
    assert_eq!(callback.calls.load(Ordering::SeqCst), 2);
}

#[derive(Default)]
struct CancellerCapture {
    slot: Mutex<Option<QueryCanceller>>,
}

impl QueryCallback for CancellerCapture {
    fn on_updated(&self, info: QueryInfo) {
        if let Some(canceller) = info.canceller {
            *self.slot.lock().unwrap() = Some(canceller);
        }
    }
}

#[tokio::test]
async fn test_canceller_deletes_cancel_uri() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q10",
                "nextUri": "{BASE}/v1/statement/q10/1",
                "partialCancelUri": "{BASE}/v1/statement/partial/q10",
                "stats": {"state": "RUNNING"}
            })
            .to_string(),
        ),
        (204, String::new()),
    ])
    .await;

    let capture = Arc::new(CancellerCapture::default());
    let client = client_for(&engine);
    let _rows = client
        .statement("SELECT slow()")
        .callback(capture.clone())
        .execute()
        .await
        .unwrap();

    let canceller = capture.slot.lock().unwrap().take().expect("canceller delivered");
    // A 204 answer is a successful cancellation.
    canceller.cancel().await.unwrap();

    let requests = engine.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, "DELETE");
    // The partial-cancel link wins over the continuation link.
    assert_eq!(requests[1].path, "/v1/statement/partial/q10");
}

#[tokio::test]
async fn test_busy_engine_until_deadline() {
    let engine = MockEngine::start(vec![(503, String::new()); 6]).await;

    let client = client_for(&engine);
    let err = client
        .statement("SELECT 1")
        .timeout(Duration::from_millis(300))
        .execute()
        .await
        .unwrap_err();
    match err {
        TrinoLinkError::QueryFailed { status_code, .. } => assert_eq!(status_code, 503),
        other => panic!("expected QueryFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_failure_surfaces_body() {
    let engine = MockEngine::start(vec![(500, "stage crashed".to_string())]).await;

    let client = client_for(&engine);
    let err = client.query("SELECT 1").await.unwrap_err();
    match err {
        TrinoLinkError::QueryFailed {
            status_code,
            reason,
        } => {
            assert_eq!(status_code, 500);
            assert!(reason.contains("stage crashed"));
        }
        other => panic!("expected QueryFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_token_stops_submission() {
    let engine = MockEngine::start(vec![]).await;

    let token = CancelToken::new();
    token.cancel();

    let client = client_for(&engine);
    let err = client
        .statement("SELECT 1")
        .cancel_token(token)
        .execute()
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn test_columns_probe_fetches_a_page() {
    let engine = MockEngine::start(vec![
        (
            200,
            json!({
                "id": "q9",
                "nextUri": "{BASE}/v1/statement/q9/1",
                "stats": {"state": "QUEUED"}
            })
            .to_string(),
        ),
        (
            200,
            json!({
                "id": "q9",
                "columns": [{"name": "name", "type": "varchar(25)"}],
                "data": [["ALGERIA"]],
                "stats": {"state": "FINISHED"}
            })
            .to_string(),
        ),
    ])
    .await;

    let client = client_for(&engine);
    let mut rows = client.query("SELECT name FROM nation").await.unwrap();

    let columns = rows.columns().await.unwrap();
    assert_eq!(columns[0].type_name(), "varchar(25)");
    assert_eq!(columns[0].display_type_name(), "varchar");

    assert_eq!(
        rows.next_row().await.unwrap(),
        Some(vec![CellValue::Varchar("ALGERIA".into())])
    );
    assert_eq!(rows.next_row().await.unwrap(), None);
    assert_eq!(engine.requests().len(), 2);
}
