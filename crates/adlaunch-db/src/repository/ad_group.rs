//! # Ad Group Repository
//!
//! Database operations for ad groups.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::SYNC_COLUMNS;
use adlaunch_core::AdGroup;

fn select_ad_groups(filter: &str) -> String {
    format!(
        "SELECT id, owner_id, campaign_id, name, status, cpc_bid_micros, {SYNC_COLUMNS} \
         FROM ad_groups WHERE {filter}"
    )
}

/// Repository for ad group database operations.
#[derive(Debug, Clone)]
pub struct AdGroupRepository {
    pool: SqlitePool,
}

impl AdGroupRepository {
    /// Creates a new AdGroupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdGroupRepository { pool }
    }

    /// Inserts an ad group, including its creation state.
    pub async fn insert(&self, ad_group: &AdGroup) -> DbResult<()> {
        debug!(ad_group_id = %ad_group.id, campaign_id = %ad_group.campaign_id, "Inserting ad group");

        sqlx::query(
            r#"
            INSERT INTO ad_groups (
                id, owner_id, campaign_id, name, status, cpc_bid_micros,
                remote_id, creation_status, creation_error, last_sync_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&ad_group.id)
        .bind(&ad_group.owner_id)
        .bind(&ad_group.campaign_id)
        .bind(&ad_group.name)
        .bind(ad_group.status)
        .bind(ad_group.cpc_bid_micros)
        .bind(&ad_group.sync.remote_id)
        .bind(ad_group.sync.creation_status)
        .bind(&ad_group.sync.creation_error)
        .bind(ad_group.sync.last_sync_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an ad group by id, scoped to its owner.
    pub async fn get(&self, id: &str, owner_id: &str) -> DbResult<Option<AdGroup>> {
        let sql = select_ad_groups("id = ?1 AND owner_id = ?2");

        let ad_group = sqlx::query_as::<_, AdGroup>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ad_group)
    }

    /// Lists the ad groups a manual CPC bid change applies to: synced and not
    /// removed, in creation order.
    pub async fn list_bid_targets(&self, campaign_id: &str, owner_id: &str) -> DbResult<Vec<AdGroup>> {
        let sql = select_ad_groups(
            "campaign_id = ?1 AND owner_id = ?2 \
             AND status != 'REMOVED' AND creation_status = 'synced' \
             ORDER BY created_at, id",
        );

        let ad_groups = sqlx::query_as::<_, AdGroup>(&sql)
            .bind(campaign_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ad_groups)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use adlaunch_core::EntityStatus;

    use crate::repository::fixtures::{self, OWNER};

    #[tokio::test]
    async fn test_bid_targets_skip_removed_and_unsynced() {
        let db = fixtures::database().await;
        db.accounts().insert(&fixtures::account("acc-1")).await.unwrap();
        let mut campaign = fixtures::campaign("cmp-1", "acc-1", "offer-1");
        campaign.sync = fixtures::synced("r-cmp");
        db.campaigns().insert(&campaign).await.unwrap();

        let mut live = fixtures::ad_group("ag-live", "cmp-1");
        live.sync = fixtures::synced("r-live");
        let mut paused = fixtures::ad_group("ag-paused", "cmp-1");
        paused.status = EntityStatus::Paused;
        paused.sync = fixtures::synced("r-paused");
        let mut removed = fixtures::ad_group("ag-removed", "cmp-1");
        removed.status = EntityStatus::Removed;
        removed.sync = fixtures::synced("r-removed");
        let draft = fixtures::ad_group("ag-draft", "cmp-1");

        for g in [&live, &paused, &removed, &draft] {
            db.ad_groups().insert(g).await.unwrap();
        }

        let mut ids: Vec<String> = db
            .ad_groups()
            .list_bid_targets("cmp-1", OWNER)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["ag-live".to_string(), "ag-paused".to_string()]);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = fixtures::database().await;
        assert!(db.ad_groups().get("nope", OWNER).await.unwrap().is_none());
    }
}
