//! Session merge behaviour under duplicates, reordering, and concurrency.
//!
//! The `pg_` tests require Docker for the PostgreSQL testcontainer.

use std::sync::Arc;

use chrono::Duration;
use event_store::AnalyticsStore;
use integration_tests::{fixtures, setup::TestContext};
use pixel_core::parse_batch;
use serde_json::Value;

async fn ingest(store: &dyn AnalyticsStore, events: &[Value], user_agent: Option<&str>) {
    let batch = parse_batch(&fixtures::batch(events)).unwrap();
    store.ingest(&batch, user_agent).await.unwrap();
}

async fn assert_duplicate_delivery_double_counts(ctx: &TestContext) {
    let session = fixtures::unique_session();
    let events = fixtures::pageview_then_click(&session);

    ingest(ctx.store.as_ref(), &events, None).await;
    ingest(ctx.store.as_ref(), &events, None).await;

    assert_eq!(ctx.store.count_events().await.unwrap(), 4);
    assert_eq!(ctx.store.count_sessions().await.unwrap(), 1);
    let record = ctx.store.session(&session).await.unwrap().unwrap();
    assert_eq!(record.page_views, 2);
    assert_eq!(record.start_time, Some(fixtures::t0()));
}

#[tokio::test]
async fn test_duplicate_delivery_double_counts_in_memory() {
    assert_duplicate_delivery_double_counts(&TestContext::in_memory()).await;
}

#[tokio::test]
async fn test_pg_duplicate_delivery_double_counts() {
    assert_duplicate_delivery_double_counts(&TestContext::postgres().await).await;
}

async fn assert_end_time_follows_processing_order(ctx: &TestContext) {
    let session = fixtures::unique_session();

    ingest(
        ctx.store.as_ref(),
        &[
            fixtures::pageview(&session, "/a", 10),
            fixtures::click(&session, "/a", "A", 30),
            fixtures::click(&session, "/a", "B", 20),
        ],
        None,
    )
    .await;

    let record = ctx.store.session(&session).await.unwrap().unwrap();
    assert_eq!(record.start_time, Some(fixtures::t0() + Duration::seconds(10)));
    assert_eq!(record.end_time, Some(fixtures::t0() + Duration::seconds(20)));

    // An event older than the first one moves end_time before start_time,
    // which removes the session from the duration average.
    ingest(ctx.store.as_ref(), &[fixtures::click(&session, "/a", "C", 0)], None).await;
    let record = ctx.store.session(&session).await.unwrap().unwrap();
    assert_eq!(record.end_time, Some(fixtures::t0()));
    assert_eq!(record.start_time, Some(fixtures::t0() + Duration::seconds(10)));
    assert_eq!(ctx.store.avg_session_duration().await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_end_time_follows_processing_order_in_memory() {
    assert_end_time_follows_processing_order(&TestContext::in_memory()).await;
}

#[tokio::test]
async fn test_pg_end_time_follows_processing_order() {
    assert_end_time_follows_processing_order(&TestContext::postgres().await).await;
}

async fn assert_first_user_agent_kept(ctx: &TestContext) {
    let session = fixtures::unique_session();

    ingest(ctx.store.as_ref(), &[fixtures::pageview(&session, "/a", 0)], None).await;
    ingest(ctx.store.as_ref(), &[fixtures::pageview(&session, "/a", 1)], Some("UA/1")).await;
    ingest(ctx.store.as_ref(), &[fixtures::pageview(&session, "/a", 2)], Some("UA/2")).await;

    let record = ctx.store.session(&session).await.unwrap().unwrap();
    assert_eq!(record.user_agent.as_deref(), Some("UA/1"));
    assert_eq!(record.page_views, 3);
}

#[tokio::test]
async fn test_first_user_agent_kept_in_memory() {
    assert_first_user_agent_kept(&TestContext::in_memory()).await;
}

#[tokio::test]
async fn test_pg_first_user_agent_kept() {
    assert_first_user_agent_kept(&TestContext::postgres().await).await;
}

/// Concurrent batches for one session lose no increments and create one row.
async fn assert_concurrent_batches_merge(ctx: &TestContext) {
    const BATCHES: usize = 20;
    let session = Arc::new(fixtures::unique_session());

    let handles: Vec<_> = (0..BATCHES)
        .map(|i| {
            let store = ctx.store.clone();
            let session = session.clone();
            tokio::spawn(async move {
                let events = vec![
                    fixtures::pageview(&session, "/a", i as i64),
                    fixtures::custom(&session, "scroll", i as i64),
                ];
                let batch = parse_batch(&fixtures::batch(&events)).unwrap();
                store.ingest(&batch, Some("UA/concurrent")).await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 2);
    }

    assert_eq!(ctx.store.count_sessions().await.unwrap(), 1);
    assert_eq!(ctx.store.count_events().await.unwrap(), (BATCHES * 2) as u64);

    let record = ctx.store.session(&session).await.unwrap().unwrap();
    assert_eq!(record.page_views, BATCHES as i64);
    assert_eq!(record.user_agent.as_deref(), Some("UA/concurrent"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_merge_in_memory() {
    assert_concurrent_batches_merge(&TestContext::in_memory()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pg_concurrent_batches_merge() {
    assert_concurrent_batches_merge(&TestContext::postgres().await).await;
}

#[tokio::test]
async fn test_missing_timestamp_uses_receive_time() {
    let ctx = TestContext::in_memory();
    let before = chrono::Utc::now();

    let events = vec![serde_json::json!({
        "session_id": "no-ts",
        "event_type": "pageview",
        "url": "/a",
    })];
    ingest(ctx.store.as_ref(), &events, None).await;

    let start = ctx
        .store
        .session("no-ts")
        .await
        .unwrap()
        .unwrap()
        .start_time
        .unwrap();
    assert!(start >= before);
    assert!(start <= chrono::Utc::now());
}
