//! # Database Handle
//!
//! Opens the SQLite pool behind the engine and hands out repositories.
//!
//! ```text
//!  DbConfig::new(path)            DbConfig::in_memory()
//!         │                              │   one connection, never recycled
//!         └──────────────┬───────────────┘
//!                        ▼
//!            Database::new(config).await
//!              ├─ WAL journal, NORMAL sync, foreign keys ON
//!              ├─ SqlitePool (max_connections)
//!              └─ embedded migrations
//!                        │
//!     ┌────────┬─────────┼──────────┬───────────┬────────────┐
//!     ▼        ▼         ▼          ▼           ▼            ▼
//! accounts campaigns ad_groups  keywords   creatives    sync_state
//! ```
//!
//! Sync attempts on unrelated entity trees share the pool and run in
//! parallel; the guarded status writes in [`SyncStateRepository`] keep two
//! attempts on the same row from both succeeding.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::account::AccountRepository;
use crate::repository::ad_group::AdGroupRepository;
use crate::repository::campaign::CampaignRepository;
use crate::repository::creative::CreativeRepository;
use crate::repository::keyword::KeywordRepository;
use crate::repository::sync_state::SyncStateRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the entity store lives and how many connections it may hold.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open; `:memory:` for a throwaway store.
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Applied to file-backed pools only.
    pub idle_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Leaves the schema alone on open.
    pub fn skip_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    /// A fresh, isolated in-memory store.
    ///
    /// The data lives in the pool's only connection, so the pool is capped
    /// at one and that connection is never retired.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY)
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Cloneable handle over the pool; every repository borrows a pool clone.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./adlaunch.db")).await?;
/// let waiting = db.keywords().list_awaiting_creation("ag-1", "owner-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and brings the schema up to date.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Pool connected and migrations applied
    /// * `Err(DbError::ConnectionFailed)` - The file could not be opened
    /// * `Err(DbError::MigrationFailed)` - The schema could not be upgraded
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let in_memory = config.is_in_memory();
        let url = if in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // entity rows reference their parents
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout((!in_memory).then_some(config.idle_timeout))
            .max_lifetime((!in_memory).then_some(Duration::from_secs(30 * 60)))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Entity store opened"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone())
    }

    pub fn campaigns(&self) -> CampaignRepository {
        CampaignRepository::new(self.pool.clone())
    }

    pub fn ad_groups(&self) -> AdGroupRepository {
        AdGroupRepository::new(self.pool.clone())
    }

    pub fn keywords(&self) -> KeywordRepository {
        KeywordRepository::new(self.pool.clone())
    }

    pub fn creatives(&self) -> CreativeRepository {
        CreativeRepository::new(self.pool.clone())
    }

    /// Creation status writes for every entity kind.
    pub fn sync_state(&self) -> SyncStateRepository {
        SyncStateRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Whether the store still answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO platform_accounts (id, owner_id, customer_id) VALUES ('a', 'o', '1')")
            .execute(a.pool())
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM platform_accounts")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/adlaunch-test.db")
            .max_connections(10)
            .skip_migrations();

        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
        assert_eq!(DbConfig::in_memory().max_connections, 1);
    }
}
