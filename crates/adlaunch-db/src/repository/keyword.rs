//! # Keyword Repository
//!
//! Database operations for keywords.
//!
//! ## Batch Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_awaiting_creation(ad_group)                                      │
//! │                                                                         │
//! │  ORDER BY created_at, id                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [kw-a, kw-b, kw-c]  ──► one batch create call                         │
//! │    0     1     2     ◄── platform results are matched by this index    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The order must be stable between the read and the remote call, so ties on
//! `created_at` fall back to `id`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::SYNC_COLUMNS;
use adlaunch_core::Keyword;

fn select_keywords(filter: &str) -> String {
    format!(
        "SELECT id, owner_id, ad_group_id, text, match_type, status, final_url, is_negative, \
         created_at, {SYNC_COLUMNS} FROM keywords WHERE {filter}"
    )
}

/// Repository for keyword database operations.
#[derive(Debug, Clone)]
pub struct KeywordRepository {
    pool: SqlitePool,
}

impl KeywordRepository {
    /// Creates a new KeywordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeywordRepository { pool }
    }

    /// Inserts a keyword, including its creation state.
    pub async fn insert(&self, keyword: &Keyword) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO keywords (
                id, owner_id, ad_group_id, text, match_type, status, final_url, is_negative,
                created_at, remote_id, creation_status, creation_error, last_sync_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&keyword.id)
        .bind(&keyword.owner_id)
        .bind(&keyword.ad_group_id)
        .bind(&keyword.text)
        .bind(keyword.match_type)
        .bind(keyword.status)
        .bind(&keyword.final_url)
        .bind(keyword.is_negative)
        .bind(keyword.created_at)
        .bind(&keyword.sync.remote_id)
        .bind(keyword.sync.creation_status)
        .bind(&keyword.sync.creation_error)
        .bind(keyword.sync.last_sync_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a keyword by id, scoped to its owner.
    pub async fn get(&self, id: &str, owner_id: &str) -> DbResult<Option<Keyword>> {
        let sql = select_keywords("id = ?1 AND owner_id = ?2");

        let keyword = sqlx::query_as::<_, Keyword>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(keyword)
    }

    /// Lists an ad group's keywords still waiting to be created (draft or
    /// pending), in batch submission order.
    pub async fn list_awaiting_creation(
        &self,
        ad_group_id: &str,
        owner_id: &str,
    ) -> DbResult<Vec<Keyword>> {
        let sql = select_keywords(
            "ad_group_id = ?1 AND owner_id = ?2 \
             AND creation_status IN ('draft', 'pending') \
             ORDER BY created_at, id",
        );

        let keywords = sqlx::query_as::<_, Keyword>(&sql)
            .bind(ad_group_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(ad_group_id = %ad_group_id, count = keywords.len(), "Loaded keywords awaiting creation");
        Ok(keywords)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use adlaunch_core::CreationStatus;

    use crate::repository::fixtures::{self, OWNER};

    #[tokio::test]
    async fn test_awaiting_creation_order_and_filter() {
        let db = fixtures::database().await;
        db.accounts().insert(&fixtures::account("acc-1")).await.unwrap();
        let mut campaign = fixtures::campaign("cmp-1", "acc-1", "offer-1");
        campaign.sync = fixtures::synced("r-cmp");
        db.campaigns().insert(&campaign).await.unwrap();
        db.ad_groups().insert(&fixtures::ad_group("ag-1", "cmp-1")).await.unwrap();

        let t0 = Utc::now();
        let later = fixtures::keyword("kw-late", "ag-1", t0 + Duration::seconds(10));
        // same timestamp, tie broken by id
        let tie_b = fixtures::keyword("kw-b", "ag-1", t0);
        let tie_a = fixtures::keyword("kw-a", "ag-1", t0);
        let mut failed = fixtures::keyword("kw-failed", "ag-1", t0 - Duration::seconds(5));
        failed.sync.creation_status = CreationStatus::Failed;
        failed.sync.creation_error = Some("boom".to_string());
        let mut synced = fixtures::keyword("kw-synced", "ag-1", t0 - Duration::seconds(5));
        synced.sync = fixtures::synced("r-kw");

        for k in [&later, &tie_b, &tie_a, &failed, &synced] {
            db.keywords().insert(k).await.unwrap();
        }

        let ids: Vec<String> = db
            .keywords()
            .list_awaiting_creation("ag-1", OWNER)
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.id)
            .collect();
        assert_eq!(
            ids,
            vec!["kw-a".to_string(), "kw-b".to_string(), "kw-late".to_string()]
        );
    }

    #[tokio::test]
    async fn test_keyword_requires_existing_ad_group() {
        let db = fixtures::database().await;
        let orphan = fixtures::keyword("kw-1", "missing", Utc::now());
        assert!(db.keywords().insert(&orphan).await.is_err());
    }
}
