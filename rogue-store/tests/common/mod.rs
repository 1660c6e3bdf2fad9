//! Shared setup for store integration tests
//!
//! Run with DATABASE_URL set:
//!   cargo test -p rogue-store -- --ignored
//!
//! Each test gets its own schema so leaderboards and server-wide totals only
//! see that test's rows.

#![allow(dead_code)]

use rogue_store::{Credentials, Store, Username};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

pub struct TestStore {
    pub store: Store,
    url: String,
    schema: String,
}

impl TestStore {
    /// Fresh schema with all tables prepared.
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("rogue_store=debug")
            .with_test_writer()
            .try_init();

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let schema = format!("rogue_test_{}", Uuid::new_v4().simple());

        let admin = PgPool::connect(&url).await.expect("connect");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("create schema");
        admin.close().await;

        let options: PgConnectOptions = url.parse().expect("DATABASE_URL");
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect_with(options.options([("search_path", schema.as_str())]))
            .await
            .expect("connect to test schema");

        let store = Store::from_pool(pool);
        store.prepare_tables().await.expect("prepare tables");

        Self { store, url, schema }
    }

    pub fn pool(&self) -> &PgPool {
        self.store.pool()
    }

    /// Create an account with throwaway credentials.
    pub async fn account(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let username = Username::parse(name).expect("username");
        self.store
            .accounts()
            .create(id, &username, &Credentials::new([7; 32], [3; 16]))
            .await
            .expect("create account");
        id
    }

    /// Drop the schema and everything in it.
    pub async fn teardown(self) {
        self.store.close().await;
        let admin = PgPool::connect(&self.url).await.expect("connect");
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&admin)
            .await
            .expect("drop schema");
        admin.close().await;
    }
}
