//! # Creative Repository
//!
//! Database operations for responsive search ads.
//!
//! Headlines and descriptions are stored as JSON arrays of strings; the
//! repository decodes them through [`CreativeRow`].

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::SYNC_COLUMNS;
use adlaunch_core::{Creative, SyncState};

/// Raw `creatives` row before the JSON columns are decoded.
#[derive(Debug, sqlx::FromRow)]
struct CreativeRow {
    id: String,
    owner_id: String,
    ad_group_id: String,
    headlines: String,
    descriptions: String,
    final_url: String,
    path1: Option<String>,
    path2: Option<String>,
    #[sqlx(flatten)]
    sync: SyncState,
}

impl CreativeRow {
    fn into_creative(self) -> DbResult<Creative> {
        Ok(Creative {
            headlines: serde_json::from_str(&self.headlines)?,
            descriptions: serde_json::from_str(&self.descriptions)?,
            id: self.id,
            owner_id: self.owner_id,
            ad_group_id: self.ad_group_id,
            final_url: self.final_url,
            path1: self.path1,
            path2: self.path2,
            sync: self.sync,
        })
    }
}

/// Repository for creative database operations.
#[derive(Debug, Clone)]
pub struct CreativeRepository {
    pool: SqlitePool,
}

impl CreativeRepository {
    /// Creates a new CreativeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreativeRepository { pool }
    }

    /// Inserts a creative, including its creation state.
    pub async fn insert(&self, creative: &Creative) -> DbResult<()> {
        debug!(creative_id = %creative.id, ad_group_id = %creative.ad_group_id, "Inserting creative");

        let headlines = serde_json::to_string(&creative.headlines)?;
        let descriptions = serde_json::to_string(&creative.descriptions)?;

        sqlx::query(
            r#"
            INSERT INTO creatives (
                id, owner_id, ad_group_id, headlines, descriptions, final_url, path1, path2,
                remote_id, creation_status, creation_error, last_sync_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&creative.id)
        .bind(&creative.owner_id)
        .bind(&creative.ad_group_id)
        .bind(headlines)
        .bind(descriptions)
        .bind(&creative.final_url)
        .bind(&creative.path1)
        .bind(&creative.path2)
        .bind(&creative.sync.remote_id)
        .bind(creative.sync.creation_status)
        .bind(&creative.sync.creation_error)
        .bind(creative.sync.last_sync_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a creative by id, scoped to its owner.
    pub async fn get(&self, id: &str, owner_id: &str) -> DbResult<Option<Creative>> {
        let sql = format!(
            "SELECT id, owner_id, ad_group_id, headlines, descriptions, final_url, path1, path2, \
             {SYNC_COLUMNS} FROM creatives WHERE id = ?1 AND owner_id = ?2"
        );

        let row = sqlx::query_as::<_, CreativeRow>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CreativeRow::into_creative).transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
