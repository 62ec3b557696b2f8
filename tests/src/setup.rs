//! Common test setup functions.

use std::str::FromStr;
use std::sync::Arc;

use api::{router, AppState, CorsConfig};
use axum::Router;
use axum_test::TestServer;
use event_store::{init_schema, AnalyticsStore, MemoryStore, PgStore};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use crate::containers::TestContainers;

/// Router plus direct handles on the backing store.
///
/// Tests drive the real Axum router and then inspect storage through
/// `store` to check what was actually persisted.
pub struct TestContext {
    pub containers: Option<TestContainers>,
    pub store: Arc<dyn AnalyticsStore>,
    pub pg: Option<PgStore>,
    pub router: Router,
}

impl TestContext {
    /// Context backed by [`MemoryStore`]; needs no Docker.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Context around any store implementation (mocks).
    pub fn with_store(store: Arc<dyn AnalyticsStore>) -> Self {
        let router = router(AppState::new(store.clone()), &CorsConfig::default());
        Self {
            containers: None,
            store,
            pg: None,
            router,
        }
    }

    /// Context backed by PostgreSQL in a schema private to this context.
    ///
    /// Requires Docker unless `PIXEL_TEST_DATABASE_URL` is set.
    pub async fn postgres() -> Self {
        let containers = TestContainers::start().await;
        let schema = format!("test_{}", Uuid::new_v4().simple());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&containers.database_url)
            .await
            .expect("Failed to connect to PostgreSQL");
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");
        admin.close().await;

        let options = PgConnectOptions::from_str(&containers.database_url)
            .expect("Invalid database url")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .expect("Failed to create pool");

        let pg = PgStore::from_pool(pool);
        init_schema(&pg).await.expect("Failed to initialize schema");

        let store: Arc<dyn AnalyticsStore> = Arc::new(pg.clone());
        let router = router(AppState::new(store.clone()), &CorsConfig::default());

        Self {
            containers: Some(containers),
            store,
            pg: Some(pg),
            router,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    pub fn pg(&self) -> &PgStore {
        self.pg.as_ref().expect("context is not backed by PostgreSQL")
    }
}
