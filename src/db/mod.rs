//! Relational persistence for image history, inspiration templates and the
//! users they belong to.
//!
//! A single [`Database`] wraps one `SqlitePool`, constructed once at startup
//! and shared by reference. Every operation first checks that the pool is
//! still open and fails with [`Error::StorageUnavailable`] otherwise.

mod history;
mod inspirations;
mod rows;
mod users;

use crate::models::{
    EditRecord, GenerationRecord, Inspiration, InspirationCategory, InspirationUpdate, NewEdit,
    NewGeneration, NewInspiration, User, UserRole,
};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Insert a completed generation. Idempotent on `record.id`.
    async fn record_generation(&self, record: &NewGeneration) -> Result<String>;

    /// One user's generations, newest first, at most `limit`.
    async fn list_generations(&self, user_id: &str, limit: u32) -> Result<Vec<GenerationRecord>>;

    /// Insert a completed edit. Idempotent on `record.id`.
    async fn record_edit(&self, record: &NewEdit) -> Result<String>;

    async fn list_edits(&self, user_id: &str, limit: u32) -> Result<Vec<EditRecord>>;
}

#[async_trait]
pub trait InspirationRepository: Send + Sync {
    /// Active templates, optionally in one category, by weight then recency.
    async fn list_inspirations(
        &self,
        category: Option<InspirationCategory>,
    ) -> Result<Vec<Inspiration>>;

    /// Any template by id, including soft-deleted ones.
    async fn get_inspiration(&self, id: &str) -> Result<Option<Inspiration>>;

    async fn create_inspiration(&self, new: &NewInspiration) -> Result<String>;

    async fn update_inspiration(&self, id: &str, update: &InspirationUpdate) -> Result<Inspiration>;

    async fn soft_delete_inspiration(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn upsert_user(&self, id: &str, name: &str, email: &str, role: UserRole) -> Result<User>;

    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Remove a user and, by cascade, all of their history.
    async fn delete_user(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database");
        Ok(Self { pool })
    }

    /// A private, migrated in-memory database. The pool holds a single
    /// connection for its whole life since each SQLite memory connection is
    /// its own database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn pool(&self) -> Result<&SqlitePool> {
        if self.pool.is_closed() {
            tracing::error!("Database pool is closed");
            return Err(Error::StorageUnavailable);
        }
        Ok(&self.pool)
    }
}
