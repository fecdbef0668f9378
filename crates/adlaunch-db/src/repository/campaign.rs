//! # Campaign Repository
//!
//! Database operations for campaigns.
//!
//! ## Key Operations
//! - Load a campaign with its creation state
//! - List the campaigns a bulk pause applies to
//! - Write the local serving status after a remote pause

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::SYNC_COLUMNS;
use adlaunch_core::{Campaign, EntityStatus};

fn select_campaigns(filter: &str) -> String {
    format!(
        "SELECT id, owner_id, account_id, resource_id, name, budget_micros, budget_type, \
         status, start_date, end_date, {SYNC_COLUMNS} FROM campaigns WHERE {filter}"
    )
}

/// Repository for campaign database operations.
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Creates a new CampaignRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CampaignRepository { pool }
    }

    /// Inserts a campaign, including its creation state.
    pub async fn insert(&self, campaign: &Campaign) -> DbResult<()> {
        debug!(campaign_id = %campaign.id, account_id = %campaign.account_id, "Inserting campaign");

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, owner_id, account_id, resource_id, name, budget_micros, budget_type,
                status, start_date, end_date,
                remote_id, creation_status, creation_error, last_sync_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&campaign.id)
        .bind(&campaign.owner_id)
        .bind(&campaign.account_id)
        .bind(&campaign.resource_id)
        .bind(&campaign.name)
        .bind(campaign.budget_micros)
        .bind(campaign.budget_type)
        .bind(campaign.status)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(&campaign.sync.remote_id)
        .bind(campaign.sync.creation_status)
        .bind(&campaign.sync.creation_error)
        .bind(campaign.sync.last_sync_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a campaign by id, scoped to its owner.
    pub async fn get(&self, id: &str, owner_id: &str) -> DbResult<Option<Campaign>> {
        let sql = select_campaigns("id = ?1 AND owner_id = ?2");

        let campaign = sqlx::query_as::<_, Campaign>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(campaign)
    }

    /// Lists the campaigns of a parent resource that a bulk pause acts on.
    ///
    /// ## Rules
    /// - Local status ENABLED
    /// - Creation status synced (has a remote id)
    /// - Ordered by account, then creation order, then id
    pub async fn list_pausable_for_resource(
        &self,
        resource_id: &str,
        owner_id: &str,
    ) -> DbResult<Vec<Campaign>> {
        let sql = select_campaigns(
            "resource_id = ?1 AND owner_id = ?2 \
             AND status = 'ENABLED' AND creation_status = 'synced' \
             ORDER BY account_id, created_at, id",
        );

        let campaigns = sqlx::query_as::<_, Campaign>(&sql)
            .bind(resource_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            resource_id = %resource_id,
            count = campaigns.len(),
            "Loaded pausable campaigns"
        );
        Ok(campaigns)
    }

    /// Writes a campaign's local serving status.
    ///
    /// Never touches creation status.
    pub async fn set_status(&self, id: &str, owner_id: &str, status: EntityStatus) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Campaign", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
