//! # Bulk Pauser
//!
//! Pauses every enabled, synced campaign of one parent resource, which may
//! span several platform accounts.
//!
//! ```text
//! pausable_campaigns(resource)
//!        │
//!        ▼  group by account (BTreeMap, deterministic order)
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │  acc-a       │  │  acc-b       │  │  acc-c       │  groups run
//! │  resolve ✗   │  │  resolve ✓   │  │  resolve ✓   │  concurrently,
//! │  all failed  │  │  c1 → ✓      │  │  c1 → ✓      │  bounded by
//! │              │  │  c2 → ✗      │  │              │  max_parallel
//! │              │  │  c3 → ✓      │  │              │
//! └──────────────┘  └──────────────┘  └──────────────┘
//!                   sequential within a group
//! ```
//!
//! A failure is recorded against the campaign (or the whole group when the
//! credential cannot be resolved) and never stops the rest of the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use adlaunch_core::{Campaign, Credential, EntityKind, EntityStatus};

use crate::credentials::CredentialProvider;
use crate::error::{SyncError, SyncResult};
use crate::platform::PlatformClient;
use crate::store::EntityStore;

/// Outcome for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPauseResult {
    pub campaign_id: String,
    pub campaign_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CampaignPauseResult {
    fn paused(campaign: &Campaign) -> Self {
        CampaignPauseResult {
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            success: true,
            error: None,
        }
    }

    fn failed(campaign: &Campaign, error: impl Into<String>) -> Self {
        CampaignPauseResult {
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Full per-campaign report of a bulk pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseReport {
    pub paused_count: usize,
    pub error_count: usize,
    pub total_count: usize,
    /// Ordered by account id, then store order within the account.
    pub results: Vec<CampaignPauseResult>,
    pub message: String,
}

impl PauseReport {
    fn from_results(results: Vec<CampaignPauseResult>) -> Self {
        let paused_count = results.iter().filter(|r| r.success).count();
        let total_count = results.len();
        let error_count = total_count - paused_count;

        let message = if total_count == 0 {
            "No active campaigns to pause".to_string()
        } else if error_count == 0 {
            format!("Paused {paused_count} campaign(s)")
        } else {
            format!("Paused {paused_count} of {total_count} campaign(s), {error_count} failed")
        };

        PauseReport {
            paused_count,
            error_count,
            total_count,
            results,
            message,
        }
    }

    /// True when no campaign failed.
    pub fn success(&self) -> bool {
        self.error_count == 0
    }
}

#[derive(Clone)]
pub struct BulkPauser {
    store: Arc<dyn EntityStore>,
    client: Arc<dyn PlatformClient>,
    credentials: Arc<dyn CredentialProvider>,
    max_parallel_accounts: usize,
}

impl BulkPauser {
    /// `max_parallel_accounts` below one is treated as one.
    pub fn new(
        store: Arc<dyn EntityStore>,
        client: Arc<dyn PlatformClient>,
        credentials: Arc<dyn CredentialProvider>,
        max_parallel_accounts: usize,
    ) -> Self {
        BulkPauser {
            store,
            client,
            credentials,
            max_parallel_accounts: max_parallel_accounts.max(1),
        }
    }

    /// Pauses all pausable campaigns of `resource_id`.
    ///
    /// ## Returns
    /// * `Ok(PauseReport)` - Always the full per-campaign list, even when
    ///   every campaign failed
    /// * `Err(SyncError)` - Only when the campaign list itself cannot be read
    pub async fn pause_all(&self, resource_id: &str, owner_id: &str) -> SyncResult<PauseReport> {
        let campaigns = self.store.pausable_campaigns(resource_id, owner_id).await?;

        let mut groups: BTreeMap<String, Vec<Campaign>> = BTreeMap::new();
        for campaign in campaigns {
            groups
                .entry(campaign.account_id.clone())
                .or_default()
                .push(campaign);
        }

        debug!(
            resource_id = %resource_id,
            accounts = groups.len(),
            "Pausing campaigns by account"
        );

        let results: Vec<CampaignPauseResult> = stream::iter(groups)
            .map(|(account_id, campaigns)| self.pause_group(account_id, campaigns, owner_id))
            .buffered(self.max_parallel_accounts)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let report = PauseReport::from_results(results);
        info!(
            resource_id = %resource_id,
            paused = report.paused_count,
            failed = report.error_count,
            "Bulk pause finished"
        );
        Ok(report)
    }

    async fn pause_group(
        &self,
        account_id: String,
        campaigns: Vec<Campaign>,
        owner_id: &str,
    ) -> Vec<CampaignPauseResult> {
        let credential = match self.credentials.resolve(&account_id, owner_id).await {
            Ok(credential) => credential,
            Err(e) => {
                let error = SyncError::CredentialResolutionFailed {
                    account_id: account_id.clone(),
                    reason: e.to_string(),
                }
                .to_string();
                warn!(account_id = %account_id, error = %error, "Skipping account group");
                return campaigns
                    .iter()
                    .map(|campaign| CampaignPauseResult::failed(campaign, error.clone()))
                    .collect();
            }
        };

        let mut results = Vec::with_capacity(campaigns.len());
        for campaign in &campaigns {
            let result = match self.pause_one(&credential, campaign, owner_id).await {
                Ok(()) => CampaignPauseResult::paused(campaign),
                Err(e) => {
                    warn!(campaign_id = %campaign.id, error = %e, "Campaign pause failed");
                    CampaignPauseResult::failed(campaign, e.to_string())
                }
            };
            results.push(result);
        }
        results
    }

    async fn pause_one(
        &self,
        credential: &Credential,
        campaign: &Campaign,
        owner_id: &str,
    ) -> SyncResult<()> {
        let remote_id = campaign
            .sync
            .remote_id
            .as_deref()
            .ok_or_else(|| SyncError::NotSynced {
                kind: EntityKind::Campaign,
                id: campaign.id.clone(),
            })?;

        self.client
            .update_campaign_status(credential, remote_id, EntityStatus::Paused)
            .await?;

        self.store
            .set_campaign_status(&campaign.id, owner_id, EntityStatus::Paused)
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Call, Harness, OWNER};
    use adlaunch_db::Database;

    async fn insert_synced(db: &Database, id: &str, account_id: &str, resource_id: &str) {
        let mut campaign = testing::campaign(id, account_id);
        campaign.resource_id = resource_id.to_string();
        campaign.sync = testing::synced(&format!("r-{id}"));
        db.campaigns().insert(&campaign).await.unwrap();
    }

    async fn local_status(db: &Database, id: &str) -> EntityStatus {
        db.campaigns().get(id, OWNER).await.unwrap().unwrap().status
    }

    /// Account `acc-a` has no token, account `acc-b` is funded; both own
    /// two campaigns of `offer-1`.
    async fn two_accounts() -> Harness {
        let harness = Harness::new().await;
        let db = &harness.db;
        db.accounts()
            .insert(&testing::account("acc-a", None))
            .await
            .unwrap();
        db.accounts()
            .insert(&testing::account("acc-b", Some("refresh-b")))
            .await
            .unwrap();
        for (id, account) in [
            ("cmp-a1", "acc-a"),
            ("cmp-a2", "acc-a"),
            ("cmp-b1", "acc-b"),
            ("cmp-b2", "acc-b"),
        ] {
            insert_synced(db, id, account, "offer-1").await;
        }
        harness
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_account_and_campaign() {
        let harness = two_accounts().await;
        harness.platform.fail_status_update("r-cmp-b1");

        let report = harness.pauser(2).pause_all("offer-1", OWNER).await.unwrap();

        assert_eq!(report.total_count, 4);
        assert_eq!(report.paused_count, 1);
        assert_eq!(report.error_count, 3);
        assert!(!report.success());

        let ids: Vec<&str> = report.results.iter().map(|r| r.campaign_id.as_str()).collect();
        assert_eq!(ids, vec!["cmp-a1", "cmp-a2", "cmp-b1", "cmp-b2"]);

        // the whole of acc-a carries the same resolution error
        let a_errors: Vec<&str> = report.results[..2]
            .iter()
            .map(|r| r.error.as_deref().unwrap())
            .collect();
        assert_eq!(a_errors[0], a_errors[1]);
        assert!(a_errors[0].contains("acc-a"));
        assert!(a_errors[0].contains("refresh token missing"));

        assert!(!report.results[2].success);
        assert!(report.results[2]
            .error
            .as_deref()
            .unwrap()
            .contains("CAMPAIGN_NOT_MUTABLE"));
        assert!(report.results[3].success);

        // acc-a never reached the platform; both acc-b campaigns were tried
        let status_calls: Vec<String> = harness
            .platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateCampaignStatus { campaign, status } => {
                    assert_eq!(status, EntityStatus::Paused);
                    Some(campaign)
                }
                _ => None,
            })
            .collect();
        assert_eq!(status_calls, vec!["r-cmp-b1", "r-cmp-b2"]);
    }

    #[tokio::test]
    async fn test_local_status_follows_remote_success() {
        let harness = two_accounts().await;
        harness.platform.fail_status_update("r-cmp-b1");

        harness.pauser(4).pause_all("offer-1", OWNER).await.unwrap();

        assert_eq!(local_status(&harness.db, "cmp-a1").await, EntityStatus::Enabled);
        assert_eq!(local_status(&harness.db, "cmp-b1").await, EntityStatus::Enabled);
        assert_eq!(local_status(&harness.db, "cmp-b2").await, EntityStatus::Paused);
    }

    #[tokio::test]
    async fn test_only_enabled_synced_campaigns_of_the_resource() {
        let harness = Harness::new().await;
        let db = &harness.db;
        db.accounts()
            .insert(&testing::account("acc-1", Some("t")))
            .await
            .unwrap();
        insert_synced(db, "cmp-1", "acc-1", "offer-1").await;
        insert_synced(db, "cmp-other", "acc-1", "offer-2").await;
        db.campaigns()
            .insert(&testing::campaign("cmp-draft", "acc-1"))
            .await
            .unwrap();
        let mut paused = testing::campaign("cmp-paused", "acc-1");
        paused.status = EntityStatus::Paused;
        paused.sync = testing::synced("r-paused");
        db.campaigns().insert(&paused).await.unwrap();

        let report = harness.pauser(1).pause_all("offer-1", OWNER).await.unwrap();
        assert!(report.success());
        assert_eq!(report.total_count, 1);
        assert_eq!(report.results[0].campaign_id, "cmp-1");
        assert_eq!(local_status(db, "cmp-other").await, EntityStatus::Enabled);
    }

    #[tokio::test]
    async fn test_empty_resource() {
        let harness = Harness::new().await;
        let report = harness.pauser(4).pause_all("offer-1", OWNER).await.unwrap();

        assert!(report.success());
        assert_eq!(report.total_count, 0);
        assert_eq!(report.message, "No active campaigns to pause");
        assert_eq!(harness.platform.call_count(), 0);
    }

    #[test]
    fn test_report_counts() {
        let campaign = testing::campaign("cmp-1", "acc-1");
        let report = PauseReport::from_results(vec![
            CampaignPauseResult::paused(&campaign),
            CampaignPauseResult::failed(&campaign, "boom"),
        ]);
        assert_eq!(report.paused_count, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.message, "Paused 1 of 2 campaign(s), 1 failed");
    }
}
