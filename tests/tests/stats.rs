//! Tests for GET /api/stats.
//!
//! The `pg_` tests require Docker for the PostgreSQL testcontainer.

use std::sync::Arc;

use axum::http::StatusCode;
use integration_tests::{fixtures, mocks::FailingStore, setup::TestContext};
use serde_json::{json, Value};

async fn post(ctx: &TestContext, events: &[Value]) {
    ctx.server()
        .post("/api/events")
        .content_type("application/json")
        .bytes(fixtures::batch(events).into())
        .await
        .assert_status_ok();
}

async fn stats(ctx: &TestContext) -> Value {
    let response = ctx.server().get("/api/stats").await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_empty_store_stats_are_zero() {
    let ctx = TestContext::in_memory();
    let body = stats(&ctx).await;
    assert_eq!(
        body,
        json!({
            "total_sessions": 0,
            "total_events": 0,
            "top_click_targets": [],
            "top_pages": [],
            "avg_session_duration": 0.0,
        })
    );
}

async fn assert_top_lists_ranked_and_capped(ctx: &TestContext) {
    let s = fixtures::unique_session();
    let mut events = Vec::new();
    // Counts: /f 3, /B 2, /a 2, then /c /d /e /g once each. Ties break
    // by byte order, so uppercase sorts before lowercase.
    for (url, n) in [("/f", 3), ("/a", 2), ("/B", 2), ("/g", 1), ("/e", 1), ("/d", 1), ("/c", 1)] {
        for _ in 0..n {
            events.push(fixtures::pageview(&s, url, 0));
        }
    }
    // Clicks never count as page views, even on a popular URL.
    events.push(fixtures::click(&s, "/z", "DIV", 0));
    events.push(fixtures::click(&s, "/z", "DIV", 0));
    events.push(fixtures::click(&s, "/z", "BUTTON", 0));
    events.push(fixtures::click(&s, "/z", "A", 0));
    events.push(fixtures::click(&s, "/z", "a", 0));
    // A click without a target is ignored by the target ranking.
    events.push(json!({ "session_id": s, "event_type": "click", "url": "/z" }));
    post(ctx, &events).await;

    let body = stats(ctx).await;
    assert_eq!(
        body["top_pages"],
        json!([
            { "url": "/f", "count": 3 },
            { "url": "/B", "count": 2 },
            { "url": "/a", "count": 2 },
            { "url": "/c", "count": 1 },
            { "url": "/d", "count": 1 },
        ])
    );
    assert_eq!(
        body["top_click_targets"],
        json!([
            { "target": "DIV", "count": 2 },
            { "target": "A", "count": 1 },
            { "target": "BUTTON", "count": 1 },
            { "target": "a", "count": 1 },
        ])
    );
    assert_eq!(body["total_events"], 17);
}

#[tokio::test]
async fn test_top_lists_ranked_and_capped_in_memory() {
    assert_top_lists_ranked_and_capped(&TestContext::in_memory()).await;
}

#[tokio::test]
async fn test_pg_top_lists_ranked_and_capped() {
    assert_top_lists_ranked_and_capped(&TestContext::postgres().await).await;
}

async fn assert_avg_duration_exclusions(ctx: &TestContext) {
    let forward_a = fixtures::unique_session();
    let forward_b = fixtures::unique_session();
    let single = fixtures::unique_session();
    let backward = fixtures::unique_session();

    post(
        ctx,
        &[
            fixtures::pageview(&forward_a, "/a", 0),
            fixtures::click(&forward_a, "/a", "A", 4),
            fixtures::pageview(&forward_b, "/a", 0),
            fixtures::click(&forward_b, "/a", "A", 8),
            fixtures::pageview(&single, "/a", 0),
            fixtures::pageview(&backward, "/a", 10),
            fixtures::click(&backward, "/a", "A", 3),
        ],
    )
    .await;

    let body = stats(ctx).await;
    assert_eq!(body["total_sessions"], 4);
    assert_eq!(body["avg_session_duration"].as_f64(), Some(6.0));
}

#[tokio::test]
async fn test_avg_duration_exclusions_in_memory() {
    assert_avg_duration_exclusions(&TestContext::in_memory()).await;
}

#[tokio::test]
async fn test_pg_avg_duration_exclusions() {
    assert_avg_duration_exclusions(&TestContext::postgres().await).await;
}

#[tokio::test]
async fn test_stats_recomputed_on_every_call() {
    let ctx = TestContext::in_memory();
    let s = fixtures::unique_session();

    post(&ctx, &[fixtures::pageview(&s, "/a", 0)]).await;
    assert_eq!(stats(&ctx).await["total_events"], 1);

    post(&ctx, &[fixtures::pageview(&s, "/a", 1)]).await;
    let body = stats(&ctx).await;
    assert_eq!(body["total_events"], 2);
    assert_eq!(body["top_pages"][0]["count"], 2);
    assert_eq!(body["avg_session_duration"].as_f64(), Some(1.0));
}

#[tokio::test]
async fn test_stats_query_failure_returns_500() {
    let ctx = TestContext::with_store(Arc::new(FailingStore::new()));

    let response = ctx.server().get("/api/stats").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["code"], "DB_002");
}
