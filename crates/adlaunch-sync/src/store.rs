//! # Entity Store
//!
//! The engine's access to local entity rows.
//!
//! ## Responsibilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reads                              Writes                             │
//! │  ─────                              ──────                             │
//! │  load_entity / load_account         mark_pending(_batch)               │
//! │  keywords_awaiting_creation         complete(_batch)                   │
//! │  bid_target_ad_groups               set_campaign_status                │
//! │  pausable_campaigns                                                    │
//! │                                                                         │
//! │  Creation-status writes are guarded: a row not in the expected state   │
//! │  is reported as SyncInProgress (someone else moved it first).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use adlaunch_core::{
    AdGroup, AttemptOutcome, Campaign, Entity, EntityKind, EntityStatus, Keyword, ParentRef,
    PlatformAccount,
};
use adlaunch_db::{Database, DbError};

use crate::error::{SyncError, SyncResult};

/// Reads and writes entity rows for the engine. Every call is owner-scoped.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_entity(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
    ) -> SyncResult<Option<Entity>>;

    async fn load_account(&self, id: &str, owner_id: &str) -> SyncResult<Option<PlatformAccount>>;

    /// Moves a draft or failed entity to pending.
    async fn mark_pending(&self, kind: EntityKind, id: &str, owner_id: &str) -> SyncResult<()>;

    /// Moves several unsynced entities to pending, all or nothing.
    async fn mark_pending_batch(
        &self,
        kind: EntityKind,
        ids: &[String],
        owner_id: &str,
    ) -> SyncResult<()>;

    /// Records the outcome of a pending entity's attempt in one write.
    async fn complete(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
        outcome: &AttemptOutcome,
    ) -> SyncResult<()>;

    async fn complete_batch(
        &self,
        kind: EntityKind,
        owner_id: &str,
        outcomes: &[(String, AttemptOutcome)],
    ) -> SyncResult<()>;

    /// Draft or pending keywords of an ad group, ordered by creation time
    /// then id.
    async fn keywords_awaiting_creation(
        &self,
        ad_group_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<Keyword>>;

    /// Synced, non-removed ad groups of a campaign.
    async fn bid_target_ad_groups(
        &self,
        campaign_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<AdGroup>>;

    /// Enabled, synced campaigns of a parent resource, ordered by account.
    async fn pausable_campaigns(
        &self,
        resource_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<Campaign>>;

    /// Writes a campaign's local serving status.
    async fn set_campaign_status(
        &self,
        id: &str,
        owner_id: &str,
        status: EntityStatus,
    ) -> SyncResult<()>;
}

/// Follows parent links from `parent` up to the owning platform account.
///
/// A broken link is reported as the missing row.
pub async fn owning_account_id(
    store: &dyn EntityStore,
    parent: ParentRef,
    owner_id: &str,
) -> SyncResult<String> {
    let mut current = parent;
    loop {
        let kind = match current.kind.as_entity() {
            Some(kind) => kind,
            None => return Ok(current.id),
        };
        let entity = store
            .load_entity(kind, &current.id, owner_id)
            .await?
            .ok_or_else(|| SyncError::EntityNotFound {
                kind,
                id: current.id.clone(),
            })?;
        current = entity.parent();
    }
}

/// Maps a lost guarded write to `SyncInProgress`.
fn guarded(kind: EntityKind, err: DbError) -> SyncError {
    match err {
        DbError::StateConflict { id, .. } => SyncError::SyncInProgress { kind, id },
        other => other.into(),
    }
}

// =============================================================================
// SQLite-backed Store
// =============================================================================

/// [`EntityStore`] over the adlaunch-db repositories.
#[derive(Debug, Clone)]
pub struct SqliteEntityStore {
    db: Database,
}

impl SqliteEntityStore {
    pub fn new(db: Database) -> Self {
        SqliteEntityStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn load_entity(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
    ) -> SyncResult<Option<Entity>> {
        let entity = match kind {
            EntityKind::Campaign => self.db.campaigns().get(id, owner_id).await?.map(Entity::from),
            EntityKind::AdGroup => self.db.ad_groups().get(id, owner_id).await?.map(Entity::from),
            EntityKind::Keyword => self.db.keywords().get(id, owner_id).await?.map(Entity::from),
            EntityKind::Creative => self.db.creatives().get(id, owner_id).await?.map(Entity::from),
        };
        Ok(entity)
    }

    async fn load_account(&self, id: &str, owner_id: &str) -> SyncResult<Option<PlatformAccount>> {
        Ok(self.db.accounts().get(id, owner_id).await?)
    }

    async fn mark_pending(&self, kind: EntityKind, id: &str, owner_id: &str) -> SyncResult<()> {
        self.db
            .sync_state()
            .mark_pending(kind, id, owner_id)
            .await
            .map_err(|e| guarded(kind, e))
    }

    async fn mark_pending_batch(
        &self,
        kind: EntityKind,
        ids: &[String],
        owner_id: &str,
    ) -> SyncResult<()> {
        self.db
            .sync_state()
            .mark_pending_many(kind, ids, owner_id)
            .await
            .map_err(|e| guarded(kind, e))
    }

    async fn complete(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
        outcome: &AttemptOutcome,
    ) -> SyncResult<()> {
        self.db
            .sync_state()
            .complete(kind, id, owner_id, outcome)
            .await
            .map_err(|e| guarded(kind, e))
    }

    async fn complete_batch(
        &self,
        kind: EntityKind,
        owner_id: &str,
        outcomes: &[(String, AttemptOutcome)],
    ) -> SyncResult<()> {
        self.db
            .sync_state()
            .complete_many(kind, owner_id, outcomes)
            .await
            .map_err(|e| guarded(kind, e))
    }

    async fn keywords_awaiting_creation(
        &self,
        ad_group_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<Keyword>> {
        Ok(self
            .db
            .keywords()
            .list_awaiting_creation(ad_group_id, owner_id)
            .await?)
    }

    async fn bid_target_ad_groups(
        &self,
        campaign_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<AdGroup>> {
        Ok(self.db.ad_groups().list_bid_targets(campaign_id, owner_id).await?)
    }

    async fn pausable_campaigns(
        &self,
        resource_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<Campaign>> {
        Ok(self
            .db
            .campaigns()
            .list_pausable_for_resource(resource_id, owner_id)
            .await?)
    }

    async fn set_campaign_status(
        &self,
        id: &str,
        owner_id: &str,
        status: EntityStatus,
    ) -> SyncResult<()> {
        Ok(self.db.campaigns().set_status(id, owner_id, status).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, OWNER};
    use adlaunch_core::{CreationStatus, ParentKind};

    #[tokio::test]
    async fn test_owning_account_walks_lineage() {
        let db = testing::database().await;
        testing::insert_chain(&db).await;
        let store = SqliteEntityStore::new(db);

        let parent = ParentRef::new(ParentKind::AdGroup, "ag-1");
        let account = owning_account_id(&store, parent, OWNER).await.unwrap();
        assert_eq!(account, "acc-1");

        let parent = ParentRef::new(ParentKind::Account, "acc-1");
        assert_eq!(owning_account_id(&store, parent, OWNER).await.unwrap(), "acc-1");

        let broken = ParentRef::new(ParentKind::Campaign, "missing");
        assert!(matches!(
            owning_account_id(&store, broken, OWNER).await,
            Err(SyncError::EntityNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lost_guarded_write_is_in_progress() {
        let db = testing::database().await;
        testing::insert_chain(&db).await;
        let store = SqliteEntityStore::new(db);

        store.mark_pending(EntityKind::Campaign, "cmp-1", OWNER).await.unwrap();
        let second = store.mark_pending(EntityKind::Campaign, "cmp-1", OWNER).await;
        assert!(matches!(second, Err(SyncError::SyncInProgress { .. })));

        let entity = store
            .load_entity(EntityKind::Campaign, "cmp-1", OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entity.sync().creation_status, CreationStatus::Pending);
    }
}
