//! # Sync Engine
//!
//! The public surface: one value that wires the orchestrator, the keyword
//! batcher, the bid updater and the bulk pauser over shared collaborators.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                            SyncEngine                               │
//! │                                                                      │
//! │  sync(kind) ──► SyncOrchestrator ──ok──► cascade_targets(kind)       │
//! │                                              │                       │
//! │                                              ▼                       │
//! │                                     BatchKeywordSyncer               │
//! │                                                                      │
//! │  update_campaign_bid ─────────────► BidStrategyUpdater               │
//! │  pause_all_campaigns_for_resource ► BulkPauser                       │
//! │                                                                      │
//! │        Arc<dyn EntityStore>  Arc<dyn PlatformClient>                 │
//! │        Arc<dyn CredentialProvider>  EntityLocks (shared)             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use adlaunch_core::graph::cascade_targets;
use adlaunch_core::EntityKind;
use adlaunch_db::Database;

use crate::bidding::{BidStrategyUpdater, BidUpdateOutcome};
use crate::config::EngineConfig;
use crate::credentials::{AccountCredentialProvider, CredentialProvider};
use crate::error::SyncResult;
use crate::keywords::{BatchKeywordSyncer, KeywordSyncResult};
use crate::locks::EntityLocks;
use crate::orchestrator::SyncOrchestrator;
use crate::pause::{BulkPauser, PauseReport};
use crate::platform::PlatformClient;
use crate::store::{EntityStore, SqliteEntityStore};

/// Result of a successful entity sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub remote_id: String,
    /// Keywords created by the cascade; empty for kinds without one.
    pub keywords: Vec<KeywordSyncResult>,
    /// Set when the cascade itself could not run. The entity stays synced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_cascade_error: Option<String>,
}

#[derive(Clone)]
pub struct SyncEngine {
    orchestrator: SyncOrchestrator,
    keywords: BatchKeywordSyncer,
    bids: BidStrategyUpdater,
    pauser: BulkPauser,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn EntityStore>,
        client: Arc<dyn PlatformClient>,
        credentials: Arc<dyn CredentialProvider>,
        config: &EngineConfig,
    ) -> Self {
        let locks = EntityLocks::new();

        SyncEngine {
            orchestrator: SyncOrchestrator::new(
                Arc::clone(&store),
                Arc::clone(&client),
                Arc::clone(&credentials),
                locks.clone(),
                config.creative,
            ),
            keywords: BatchKeywordSyncer::new(
                Arc::clone(&store),
                Arc::clone(&client),
                Arc::clone(&credentials),
                locks,
            ),
            bids: BidStrategyUpdater::new(
                Arc::clone(&store),
                Arc::clone(&client),
                Arc::clone(&credentials),
            ),
            pauser: BulkPauser::new(store, client, credentials, config.max_parallel_accounts()),
        }
    }

    /// Opens the SQLite store named by `config` and builds an engine over it.
    ///
    /// ## Returns
    /// * `Ok(SyncEngine)` - Configuration valid and database ready
    /// * `Err(SyncError)` - Invalid configuration or the database could not
    ///   be opened
    pub async fn open(config: &EngineConfig, client: Arc<dyn PlatformClient>) -> SyncResult<Self> {
        config.validate()?;
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database.path.display(), "Sync engine ready");

        Ok(Self::new(
            Arc::new(SqliteEntityStore::new(db.clone())),
            client,
            Arc::new(AccountCredentialProvider::new(db)),
            config,
        ))
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates one entity, then runs any cascade its kind triggers.
    pub async fn sync(&self, kind: EntityKind, id: &str, owner_id: &str) -> SyncResult<SyncOutcome> {
        let remote_id = self.orchestrator.sync(kind, id, owner_id).await?;
        let mut outcome = SyncOutcome {
            remote_id,
            ..SyncOutcome::default()
        };

        for target in cascade_targets(kind) {
            match self.cascade(target, id, owner_id).await {
                Ok(results) => outcome.keywords.extend(results),
                Err(e) => {
                    warn!(kind = %kind, entity_id = %id, target = %target, error = %e, "Cascade failed");
                    outcome.keyword_cascade_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Runs the batch syncer that owns `target` for the children of `parent_id`.
    async fn cascade(
        &self,
        target: EntityKind,
        parent_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<KeywordSyncResult>> {
        match target {
            EntityKind::Keyword => self.keywords.sync_pending_keywords(parent_id, owner_id).await,
            EntityKind::Campaign | EntityKind::AdGroup | EntityKind::Creative => {
                debug!(target = %target, "No batch syncer for cascade target");
                Ok(Vec::new())
            }
        }
    }

    pub async fn sync_campaign(&self, id: &str, owner_id: &str) -> SyncResult<SyncOutcome> {
        self.sync(EntityKind::Campaign, id, owner_id).await
    }

    /// Creates the ad group, then its waiting keywords in one batch.
    pub async fn sync_ad_group(&self, id: &str, owner_id: &str) -> SyncResult<SyncOutcome> {
        self.sync(EntityKind::AdGroup, id, owner_id).await
    }

    pub async fn sync_creative(&self, id: &str, owner_id: &str) -> SyncResult<SyncOutcome> {
        self.sync(EntityKind::Creative, id, owner_id).await
    }

    /// Retries a single keyword outside the ad group cascade.
    pub async fn sync_keyword(&self, id: &str, owner_id: &str) -> SyncResult<SyncOutcome> {
        self.sync(EntityKind::Keyword, id, owner_id).await
    }

    /// Creates every waiting keyword of an already synced ad group.
    pub async fn sync_pending_keywords(
        &self,
        ad_group_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<KeywordSyncResult>> {
        self.keywords.sync_pending_keywords(ad_group_id, owner_id).await
    }

    /// See [`SyncOrchestrator::mark_interrupted`].
    pub async fn mark_interrupted(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
    ) -> SyncResult<bool> {
        self.orchestrator.mark_interrupted(kind, id, owner_id).await
    }

    // =========================================================================
    // Updates
    // =========================================================================

    pub async fn update_campaign_bid(
        &self,
        campaign_id: &str,
        owner_id: &str,
        new_value: f64,
    ) -> SyncResult<BidUpdateOutcome> {
        self.bids.update_bid(campaign_id, owner_id, new_value).await
    }

    pub async fn pause_all_campaigns_for_resource(
        &self,
        resource_id: &str,
        owner_id: &str,
    ) -> SyncResult<PauseReport> {
        self.pauser.pause_all(resource_id, owner_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::testing::{Call, Harness, OWNER};
    use adlaunch_core::{AttemptOutcome, CreationStatus, ParentKind};

    fn engine(harness: &Harness) -> SyncEngine {
        SyncEngine::new(
            harness.store(),
            harness.platform.clone(),
            harness.credentials(),
            &EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_campaign_ad_group_keyword_chain() {
        let harness = Harness::with_chain().await;
        let engine = engine(&harness);

        let campaign = engine.sync_campaign("cmp-1", OWNER).await.unwrap();
        assert!(campaign.keywords.is_empty());

        // keywords wait for their ad group
        match engine.sync_keyword("kw-1", OWNER).await {
            Err(SyncError::ParentNotSynced { parent, .. }) => {
                assert_eq!(parent.kind, ParentKind::AdGroup);
                assert_eq!(parent.id, "ag-1");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let ad_group = engine.sync_ad_group("ag-1", OWNER).await.unwrap();
        assert!(ad_group.keyword_cascade_error.is_none());
        let ids: Vec<&str> = ad_group.keywords.iter().map(|r| r.keyword_id.as_str()).collect();
        assert_eq!(ids, vec!["kw-1", "kw-2", "kw-3"]);
        assert!(ad_group
            .keywords
            .iter()
            .all(|r| matches!(r.outcome, AttemptOutcome::Synced { .. })));

        for id in ["kw-1", "kw-2", "kw-3"] {
            let keyword = harness.db.keywords().get(id, OWNER).await.unwrap().unwrap();
            assert_eq!(keyword.sync.creation_status, CreationStatus::Synced);
            assert!(keyword.sync.remote_id.is_some());
        }

        let creates = harness
            .platform
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateKeywords { .. }))
            .count();
        assert_eq!(creates, 1);

        let creative = engine.sync_creative("cr-1", OWNER).await.unwrap();
        assert!(!creative.remote_id.is_empty());
    }

    #[tokio::test]
    async fn test_only_tabled_kinds_cascade() {
        let harness = Harness::with_chain().await;
        let engine = engine(&harness);
        let keyword_batches = |harness: &Harness| {
            harness
                .platform
                .calls()
                .into_iter()
                .filter(|c| matches!(c, Call::CreateKeywords { .. }))
                .count()
        };

        for kind in [EntityKind::Campaign, EntityKind::AdGroup, EntityKind::Creative] {
            let id = match kind {
                EntityKind::Campaign => "cmp-1",
                EntityKind::AdGroup => "ag-1",
                _ => "cr-1",
            };
            let before = keyword_batches(&harness);
            let outcome = engine.sync(kind, id, OWNER).await.unwrap();

            let expected = usize::from(cascade_targets(kind).contains(&EntityKind::Keyword));
            assert_eq!(keyword_batches(&harness) - before, expected, "{kind}");
            assert_eq!(outcome.keywords.is_empty(), expected == 0, "{kind}");
        }
    }

    #[tokio::test]
    async fn test_cascade_failure_keeps_ad_group_synced() {
        let harness = Harness::with_chain().await;
        let engine = engine(&harness);
        engine.sync_campaign("cmp-1", OWNER).await.unwrap();
        harness.platform.fail("create_keywords_batch", "QUOTA_EXHAUSTED");

        let outcome = engine.sync_ad_group("ag-1", OWNER).await.unwrap();
        assert_eq!(outcome.keywords.len(), 3);
        assert!(outcome.keywords.iter().all(|r| r.outcome
            == AttemptOutcome::Failed {
                error: "QUOTA_EXHAUSTED".into()
            }));

        let ad_group = harness.db.ad_groups().get("ag-1", OWNER).await.unwrap().unwrap();
        assert_eq!(ad_group.sync.creation_status, CreationStatus::Synced);

        // a failed keyword is retried on its own
        harness.platform.clear_failures();
        let retry = engine.sync_keyword("kw-2", OWNER).await.unwrap();
        assert!(retry.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_bid_and_pause_delegate() {
        let harness = Harness::with_chain().await;
        let engine = engine(&harness);
        engine.sync_campaign("cmp-1", OWNER).await.unwrap();
        engine.sync_ad_group("ag-1", OWNER).await.unwrap();

        let bid = engine.update_campaign_bid("cmp-1", OWNER, 0.75).await.unwrap();
        assert_eq!(bid.ad_groups_updated, 1);
        assert_eq!(bid.value_micros, 750_000);

        let report = engine
            .pause_all_campaigns_for_resource("offer-1", OWNER)
            .await
            .unwrap();
        assert!(report.success());
        assert_eq!(report.paused_count, 1);
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let mut config = EngineConfig::default();
        config.database.path = ":memory:".into();
        let platform = crate::testing::FakePlatform::new();

        let engine = SyncEngine::open(&config, platform).await.unwrap();
        let result = engine.sync_campaign("missing", OWNER).await;
        assert!(matches!(result, Err(SyncError::EntityNotFound { .. })));
    }
}
