//! # Sync State Repository
//!
//! Creation-status writes for every entity kind.
//!
//! ## Guarded Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each write is a single UPDATE that names the state it expects:        │
//! │                                                                         │
//! │  mark_pending    WHERE creation_status IN ('draft', 'failed')          │
//! │  complete        WHERE creation_status = 'pending'                     │
//! │                                                                         │
//! │  0 rows affected ──► DbError::StateConflict (another writer won)       │
//! │  1 row affected  ──► transition applied                                │
//! │                                                                         │
//! │  Synced:  remote_id = ?, creation_error = NULL, last_sync_at = now     │
//! │  Failed:  remote_id = NULL, creation_error = ?, last_sync_at = now     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table CHECK constraint rejects any write that would leave
//! `remote_id` and `creation_status` out of step.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{table_for, SYNC_COLUMNS};
use adlaunch_core::{AttemptOutcome, EntityKind, SyncState};

/// Repository for creation-status reads and writes.
#[derive(Debug, Clone)]
pub struct SyncStateRepository {
    pool: SqlitePool,
}

impl SyncStateRepository {
    /// Creates a new SyncStateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SyncStateRepository { pool }
    }

    /// Reads the creation state of one entity.
    pub async fn get(&self, kind: EntityKind, id: &str, owner_id: &str) -> DbResult<Option<SyncState>> {
        let sql = format!(
            "SELECT {SYNC_COLUMNS} FROM {} WHERE id = ?1 AND owner_id = ?2",
            table_for(kind)
        );

        let state = sqlx::query_as::<_, SyncState>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(state)
    }

    /// Moves a draft or failed entity to pending, clearing any previous error.
    pub async fn mark_pending(&self, kind: EntityKind, id: &str, owner_id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_pending(&mut conn, kind, id, owner_id, "'draft', 'failed'").await
    }

    /// Moves every listed entity that is not yet synced to pending, all or
    /// nothing.
    pub async fn mark_pending_many(
        &self,
        kind: EntityKind,
        ids: &[String],
        owner_id: &str,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            set_pending(&mut tx, kind, id, owner_id, "'draft', 'pending', 'failed'").await?;
        }
        tx.commit().await?;

        debug!(kind = %kind, count = ids.len(), "Marked batch pending");
        Ok(())
    }

    /// Records how a pending entity's attempt ended.
    pub async fn complete(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
        outcome: &AttemptOutcome,
    ) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_outcome(&mut conn, kind, id, owner_id, outcome).await
    }

    /// Records several outcomes in one transaction.
    pub async fn complete_many(
        &self,
        kind: EntityKind,
        owner_id: &str,
        outcomes: &[(String, AttemptOutcome)],
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        for (id, outcome) in outcomes {
            set_outcome(&mut tx, kind, id, owner_id, outcome).await?;
        }
        tx.commit().await?;

        debug!(kind = %kind, count = outcomes.len(), "Recorded batch outcomes");
        Ok(())
    }
}

async fn set_pending(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: &str,
    owner_id: &str,
    allowed_from: &str,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET creation_status = 'pending', creation_error = NULL, updated_at = ?3 \
         WHERE id = ?1 AND owner_id = ?2 AND creation_status IN ({allowed_from})",
        table_for(kind)
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict(kind.as_str(), id, "awaiting creation"));
    }

    Ok(())
}

async fn set_outcome(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: &str,
    owner_id: &str,
    outcome: &AttemptOutcome,
) -> DbResult<()> {
    let (remote_id, error) = match outcome {
        AttemptOutcome::Synced { remote_id } => (Some(remote_id.as_str()), None),
        AttemptOutcome::Failed { error } => (None, Some(error.as_str())),
    };

    let sql = format!(
        "UPDATE {} SET remote_id = ?3, creation_status = ?4, creation_error = ?5, \
         last_sync_at = ?6, updated_at = ?6 \
         WHERE id = ?1 AND owner_id = ?2 AND creation_status = 'pending'",
        table_for(kind)
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(remote_id)
        .bind(outcome.creation_status())
        .bind(error)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict(kind.as_str(), id, "pending"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
