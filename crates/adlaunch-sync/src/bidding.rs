//! # Bid Strategy Updater
//!
//! Applies a new bid to a synced campaign in the shape its current bidding
//! strategy expects.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  query_campaign_bidding_strategy   (live, every call, never cached)    │
//! │         │                                                               │
//! │         ├── MANUAL_CPC       ──► update_ad_group_bids_batch            │
//! │         │                        every synced, non-removed ad group    │
//! │         │                        in ONE call, same value               │
//! │         │                                                               │
//! │         ├── MAXIMIZE_CLICKS  ──► update_campaign_bid_field             │
//! │         │                        (CPC bid ceiling)                     │
//! │         │                                                               │
//! │         ├── TARGET_CPA       ──► update_campaign_bid_field             │
//! │         │                        (target CPA)                          │
//! │         │                                                               │
//! │         └── anything else    ──► UnsupportedBiddingStrategy            │
//! │                                  nothing written                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bid updates never touch creation status.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use adlaunch_core::validation::validate_bid_value;
use adlaunch_core::{BiddingStrategy, Entity, EntityKind};

use crate::credentials::CredentialProvider;
use crate::error::{SyncError, SyncResult};
use crate::platform::{CampaignBidField, PlatformClient};
use crate::store::EntityStore;

/// Which update shape a bid change used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape", content = "field")]
pub enum BidUpdateShape {
    /// One batched call over the campaign's ad groups.
    AdGroupBids,
    /// One campaign-level field.
    CampaignField(CampaignBidField),
}

/// Result of a successful bid change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidUpdateOutcome {
    pub campaign_id: String,
    pub strategy: BiddingStrategy,
    pub shape: BidUpdateShape,
    pub value_micros: i64,
    /// Ad groups written; zero for campaign-level shapes.
    pub ad_groups_updated: usize,
}

#[derive(Clone)]
pub struct BidStrategyUpdater {
    store: Arc<dyn EntityStore>,
    client: Arc<dyn PlatformClient>,
    credentials: Arc<dyn CredentialProvider>,
}

impl BidStrategyUpdater {
    pub fn new(
        store: Arc<dyn EntityStore>,
        client: Arc<dyn PlatformClient>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        BidStrategyUpdater {
            store,
            client,
            credentials,
        }
    }

    /// Sets the campaign's bid to `new_value` currency units.
    ///
    /// ## Arguments
    /// * `campaign_id` - Local campaign id; the campaign must be synced
    /// * `owner_id` - Owner scope
    /// * `new_value` - Bid in currency units, finite and positive
    ///
    /// ## Returns
    /// * `Ok(BidUpdateOutcome)` - Exactly one update shape was applied
    /// * `Err(SyncError)` - Validation, missing/unsynced campaign, missing
    ///   credential, unsupported strategy, no eligible ad groups, or a
    ///   platform failure
    pub async fn update_bid(
        &self,
        campaign_id: &str,
        owner_id: &str,
        new_value: f64,
    ) -> SyncResult<BidUpdateOutcome> {
        let value = validate_bid_value(new_value)?;

        let campaign = match self
            .store
            .load_entity(EntityKind::Campaign, campaign_id, owner_id)
            .await?
        {
            Some(Entity::Campaign(campaign)) => campaign,
            _ => {
                return Err(SyncError::EntityNotFound {
                    kind: EntityKind::Campaign,
                    id: campaign_id.to_string(),
                })
            }
        };

        let campaign_remote_id = campaign
            .sync
            .remote_id
            .clone()
            .filter(|_| campaign.sync.is_synced())
            .ok_or_else(|| SyncError::NotSynced {
                kind: EntityKind::Campaign,
                id: campaign_id.to_string(),
            })?;

        let credential = self
            .credentials
            .resolve(&campaign.account_id, owner_id)
            .await
            .map_err(|e| SyncError::MissingCredential {
                account_id: campaign.account_id.clone(),
                reason: e.to_string(),
            })?;

        let reported = self
            .client
            .query_campaign_bidding_strategy(&credential, &campaign_remote_id)
            .await?;
        let strategy = BiddingStrategy::from_remote(&reported);

        let (shape, ad_groups_updated) = match &strategy {
            BiddingStrategy::ManualCpc => {
                let ad_group_remote_ids: Vec<String> = self
                    .store
                    .bid_target_ad_groups(campaign_id, owner_id)
                    .await?
                    .into_iter()
                    .filter_map(|ad_group| ad_group.sync.remote_id)
                    .collect();

                if ad_group_remote_ids.is_empty() {
                    return Err(SyncError::NoAdGroupsToUpdate {
                        campaign_id: campaign_id.to_string(),
                    });
                }

                self.client
                    .update_ad_group_bids_batch(&credential, &ad_group_remote_ids, value)
                    .await?;
                (BidUpdateShape::AdGroupBids, ad_group_remote_ids.len())
            }
            BiddingStrategy::MaximizeClicks | BiddingStrategy::TargetCpa => {
                let field = if strategy == BiddingStrategy::MaximizeClicks {
                    CampaignBidField::MaxCpcBidCeiling
                } else {
                    CampaignBidField::TargetCpa
                };
                self.client
                    .update_campaign_bid_field(&credential, &campaign_remote_id, field, value)
                    .await?;
                (BidUpdateShape::CampaignField(field), 0)
            }
            BiddingStrategy::Other(found) => {
                warn!(campaign_id = %campaign_id, strategy = %found, "Unsupported bidding strategy");
                return Err(SyncError::UnsupportedBiddingStrategy {
                    found: found.clone(),
                    supported: BiddingStrategy::SUPPORTED
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                });
            }
        };

        info!(
            campaign_id = %campaign_id,
            strategy = %strategy,
            value_micros = value.value(),
            ad_groups_updated,
            "Bid updated"
        );

        Ok(BidUpdateOutcome {
            campaign_id: campaign_id.to_string(),
            strategy,
            shape,
            value_micros: value.value(),
            ad_groups_updated,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Call, Harness, OWNER};
    use adlaunch_core::{CreationStatus, EntityStatus};

    /// A synced campaign `cmp-1` with three synced ad groups, one removed
    /// ad group and one draft ad group.
    async fn synced_campaign() -> Harness {
        let harness = Harness::new().await;
        let db = &harness.db;
        db.accounts()
            .insert(&testing::account("acc-1", Some("t")))
            .await
            .unwrap();
        let mut campaign = testing::campaign("cmp-1", "acc-1");
        campaign.sync = testing::synced("r-cmp");
        db.campaigns().insert(&campaign).await.unwrap();

        for id in ["ag-1", "ag-2", "ag-3"] {
            let mut ad_group = testing::ad_group(id, "cmp-1");
            ad_group.sync = testing::synced(&format!("r-{id}"));
            db.ad_groups().insert(&ad_group).await.unwrap();
        }
        let mut removed = testing::ad_group("ag-removed", "cmp-1");
        removed.status = EntityStatus::Removed;
        removed.sync = testing::synced("r-removed");
        db.ad_groups().insert(&removed).await.unwrap();
        db.ad_groups()
            .insert(&testing::ad_group("ag-draft", "cmp-1"))
            .await
            .unwrap();
        harness
    }

    #[tokio::test]
    async fn test_manual_cpc_is_one_batched_call() {
        let harness = synced_campaign().await;

        let outcome = harness
            .bid_updater()
            .update_bid("cmp-1", OWNER, 1.25)
            .await
            .unwrap();
        assert_eq!(outcome.shape, BidUpdateShape::AdGroupBids);
        assert_eq!(outcome.ad_groups_updated, 3);
        assert_eq!(outcome.value_micros, 1_250_000);

        let calls = harness.platform.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::QueryStrategy {
                campaign: "r-cmp".into()
            }
        );
        match &calls[1] {
            Call::UpdateAdGroupBids { ad_groups, value } => {
                let mut ids = ad_groups.clone();
                ids.sort();
                assert_eq!(ids, vec!["r-ag-1", "r-ag-2", "r-ag-3"]);
                assert_eq!(*value, 1_250_000);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_campaign_level_strategies() {
        let harness = synced_campaign().await;
        let updater = harness.bid_updater();

        harness.platform.set_strategy("MAXIMIZE_CLICKS");
        let outcome = updater.update_bid("cmp-1", OWNER, 2.0).await.unwrap();
        assert_eq!(
            outcome.shape,
            BidUpdateShape::CampaignField(CampaignBidField::MaxCpcBidCeiling)
        );

        harness.platform.set_strategy("TARGET_CPA");
        let outcome = updater.update_bid("cmp-1", OWNER, 15.0).await.unwrap();
        assert_eq!(
            outcome.shape,
            BidUpdateShape::CampaignField(CampaignBidField::TargetCpa)
        );
        assert_eq!(outcome.ad_groups_updated, 0);

        // the strategy is read again on every call
        let queries = harness
            .platform
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::QueryStrategy { .. }))
            .count();
        assert_eq!(queries, 2);
        assert!(harness
            .platform
            .calls()
            .iter()
            .all(|c| !matches!(c, Call::UpdateAdGroupBids { .. })));
    }

    #[tokio::test]
    async fn test_unsupported_strategy_writes_nothing() {
        let harness = synced_campaign().await;
        harness.platform.set_strategy("TARGET_ROAS");

        let result = harness.bid_updater().update_bid("cmp-1", OWNER, 1.0).await;
        match result {
            Err(SyncError::UnsupportedBiddingStrategy { found, supported }) => {
                assert_eq!(found, "TARGET_ROAS");
                assert_eq!(supported.len(), 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(harness.platform.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_values_and_unsynced_campaigns() {
        let harness = synced_campaign().await;
        let updater = harness.bid_updater();

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = updater.update_bid("cmp-1", OWNER, bad).await;
            assert!(matches!(result, Err(SyncError::ValidationFailed(_))));
        }

        harness
            .db
            .campaigns()
            .insert(&testing::campaign("cmp-draft", "acc-1"))
            .await
            .unwrap();
        let result = updater.update_bid("cmp-draft", OWNER, 1.0).await;
        assert!(matches!(result, Err(SyncError::NotSynced { .. })));

        let result = updater.update_bid("nope", OWNER, 1.0).await;
        assert!(matches!(result, Err(SyncError::EntityNotFound { .. })));
        assert_eq!(harness.platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_cpc_without_ad_groups() {
        let harness = Harness::new().await;
        let db = &harness.db;
        db.accounts()
            .insert(&testing::account("acc-1", Some("t")))
            .await
            .unwrap();
        let mut campaign = testing::campaign("cmp-1", "acc-1");
        campaign.sync = testing::synced("r-cmp");
        db.campaigns().insert(&campaign).await.unwrap();

        let result = harness.bid_updater().update_bid("cmp-1", OWNER, 1.0).await;
        assert!(matches!(result, Err(SyncError::NoAdGroupsToUpdate { .. })));
    }

    #[tokio::test]
    async fn test_platform_failure_leaves_creation_status() {
        let harness = synced_campaign().await;
        harness
            .platform
            .fail("update_ad_group_bids_batch", "BID_TOO_LOW");

        let result = harness.bid_updater().update_bid("cmp-1", OWNER, 0.01).await;
        assert!(matches!(result, Err(SyncError::PlatformRequestFailed(ref m)) if m == "BID_TOO_LOW"));

        let campaign = harness.db.campaigns().get("cmp-1", OWNER).await.unwrap().unwrap();
        assert_eq!(campaign.sync.creation_status, CreationStatus::Synced);
    }
}
