//! Test doubles and row builders shared by the engine's unit tests.
//!
//! The store is the real SQLite store on an in-memory database; only the
//! platform is faked.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use adlaunch_core::validation::{CreativeAssets, CreativeLimits};
use adlaunch_core::{
    AdGroup, BudgetType, Campaign, Creative, Credential, EntityStatus, Keyword, MatchType, Micros,
    PlatformAccount, SyncState,
};
use adlaunch_db::{Database, DbConfig};

use crate::bidding::BidStrategyUpdater;
use crate::credentials::AccountCredentialProvider;
use crate::keywords::BatchKeywordSyncer;
use crate::locks::EntityLocks;
use crate::orchestrator::SyncOrchestrator;
use crate::pause::BulkPauser;
use crate::platform::{
    AdGroupSpec, CampaignBidField, CampaignSpec, KeywordCreateResult, KeywordSpec, PlatformClient,
    PlatformError, PlatformResult,
};
use crate::store::SqliteEntityStore;

pub const OWNER: &str = "owner-1";

// =============================================================================
// Row Builders
// =============================================================================

pub async fn database() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub fn account(id: &str, refresh_token: Option<&str>) -> PlatformAccount {
    PlatformAccount {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        customer_id: "1234567890".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        is_active: true,
    }
}

pub fn campaign(id: &str, account_id: &str) -> Campaign {
    Campaign {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        account_id: account_id.to_string(),
        resource_id: "offer-1".to_string(),
        name: format!("Campaign {id}"),
        budget_micros: 10_000_000,
        budget_type: BudgetType::Daily,
        status: EntityStatus::Enabled,
        start_date: None,
        end_date: None,
        sync: SyncState::draft(),
    }
}

pub fn ad_group(id: &str, campaign_id: &str) -> AdGroup {
    AdGroup {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        campaign_id: campaign_id.to_string(),
        name: format!("Ad group {id}"),
        status: EntityStatus::Enabled,
        cpc_bid_micros: Some(1_000_000),
        sync: SyncState::draft(),
    }
}

/// A keyword created `offset_secs` after a fixed base time.
pub fn keyword(id: &str, ad_group_id: &str, text: &str, offset_secs: i64) -> Keyword {
    Keyword {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        ad_group_id: ad_group_id.to_string(),
        text: text.to_string(),
        match_type: MatchType::Phrase,
        status: EntityStatus::Enabled,
        final_url: None,
        is_negative: false,
        created_at: base_time() + Duration::seconds(offset_secs),
        sync: SyncState::draft(),
    }
}

pub fn creative(id: &str, ad_group_id: &str, headlines: usize, descriptions: usize) -> Creative {
    Creative {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        ad_group_id: ad_group_id.to_string(),
        headlines: (0..headlines).map(|i| format!("Headline {i}")).collect(),
        descriptions: (0..descriptions).map(|i| format!("Description {i}.")).collect(),
        final_url: "https://shop.example.com/shoes".to_string(),
        path1: None,
        path2: None,
        sync: SyncState::draft(),
    }
}

pub fn synced(remote_id: &str) -> SyncState {
    SyncState::synced(remote_id, Utc::now())
}

pub fn pending() -> SyncState {
    SyncState {
        creation_status: adlaunch_core::CreationStatus::Pending,
        ..SyncState::draft()
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Inserts an all-draft chain:
/// `acc-1` (funded) → `cmp-1` → `ag-1` → keywords `kw-1..kw-3` + creative `cr-1`.
pub async fn insert_chain(db: &Database) {
    db.accounts().insert(&account("acc-1", Some("refresh-1"))).await.unwrap();
    db.campaigns().insert(&campaign("cmp-1", "acc-1")).await.unwrap();
    db.ad_groups().insert(&ad_group("ag-1", "cmp-1")).await.unwrap();
    for (i, text) in ["running shoes", "trail shoes", "marathon shoes"].iter().enumerate() {
        let id = format!("kw-{}", i + 1);
        db.keywords()
            .insert(&keyword(&id, "ag-1", text, i as i64))
            .await
            .unwrap();
    }
    db.creatives().insert(&creative("cr-1", "ag-1", 5, 3)).await.unwrap();
}

// =============================================================================
// Fake Platform
// =============================================================================

/// A call the fake platform received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateCampaign {
        customer_id: String,
        name: String,
    },
    CreateAdGroup {
        campaign: String,
        name: String,
    },
    CreateKeywords {
        ad_group: String,
        texts: Vec<String>,
    },
    CreateResponsiveAd {
        ad_group: String,
        headlines: Vec<String>,
        descriptions: Vec<String>,
        final_urls: Vec<String>,
        path1: Option<String>,
        path2: Option<String>,
    },
    QueryStrategy {
        campaign: String,
    },
    UpdateCampaignBidField {
        campaign: String,
        field: CampaignBidField,
        value: i64,
    },
    UpdateAdGroupBids {
        ad_groups: Vec<String>,
        value: i64,
    },
    UpdateCampaignStatus {
        campaign: String,
        status: EntityStatus,
    },
}

/// Records every call and answers with generated remote ids.
///
/// Failures are configured per operation name (`"create_campaign"`,
/// `"create_keywords_batch"`, ...) or per campaign for status updates.
pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, String>>,
    failing_status_updates: Mutex<HashSet<String>>,
    strategy: Mutex<String>,
    keyword_results: Mutex<Option<Vec<KeywordCreateResult>>>,
    next_id: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(FakePlatform {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            failing_status_updates: Mutex::new(HashSet::new()),
            strategy: Mutex::new("MANUAL_CPC".to_string()),
            keyword_results: Mutex::new(None),
            next_id: AtomicUsize::new(1),
        })
    }

    pub fn fail(&self, operation: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, message.to_string());
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn fail_status_update(&self, campaign_remote_id: &str) {
        self.failing_status_updates
            .lock()
            .unwrap()
            .insert(campaign_remote_id.to_string());
    }

    pub fn set_strategy(&self, strategy: &str) {
        *self.strategy.lock().unwrap() = strategy.to_string();
    }

    /// Overrides the next keyword batch response.
    pub fn set_keyword_results(&self, results: Vec<KeywordCreateResult>) {
        *self.keyword_results.lock().unwrap() = Some(results);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, operation: &'static str, call: Call) -> PlatformResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(operation) {
            Some(message) => Err(PlatformError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn next_remote(&self, collection: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("customers/1234567890/{collection}/{n}")
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn create_campaign(
        &self,
        credential: &Credential,
        spec: &CampaignSpec,
    ) -> PlatformResult<String> {
        self.record(
            "create_campaign",
            Call::CreateCampaign {
                customer_id: credential.customer_id.clone(),
                name: spec.name.clone(),
            },
        )?;
        Ok(self.next_remote("campaigns"))
    }

    async fn create_ad_group(
        &self,
        _credential: &Credential,
        campaign_remote_id: &str,
        spec: &AdGroupSpec,
    ) -> PlatformResult<String> {
        self.record(
            "create_ad_group",
            Call::CreateAdGroup {
                campaign: campaign_remote_id.to_string(),
                name: spec.name.clone(),
            },
        )?;
        Ok(self.next_remote("adGroups"))
    }

    async fn create_keywords_batch(
        &self,
        _credential: &Credential,
        ad_group_remote_id: &str,
        specs: &[KeywordSpec],
    ) -> PlatformResult<Vec<KeywordCreateResult>> {
        self.record(
            "create_keywords_batch",
            Call::CreateKeywords {
                ad_group: ad_group_remote_id.to_string(),
                texts: specs.iter().map(|s| s.text.clone()).collect(),
            },
        )?;
        if let Some(results) = self.keyword_results.lock().unwrap().take() {
            return Ok(results);
        }
        Ok(specs
            .iter()
            .map(|spec| KeywordCreateResult::new(self.next_remote("adGroupCriteria")).with_text(&spec.text))
            .collect())
    }

    async fn create_responsive_ad(
        &self,
        _credential: &Credential,
        ad_group_remote_id: &str,
        assets: &CreativeAssets,
    ) -> PlatformResult<String> {
        self.record(
            "create_responsive_ad",
            Call::CreateResponsiveAd {
                ad_group: ad_group_remote_id.to_string(),
                headlines: assets.headlines.clone(),
                descriptions: assets.descriptions.clone(),
                final_urls: assets.final_urls.clone(),
                path1: assets.path1.clone(),
                path2: assets.path2.clone(),
            },
        )?;
        Ok(self.next_remote("adGroupAds"))
    }

    async fn query_campaign_bidding_strategy(
        &self,
        _credential: &Credential,
        campaign_remote_id: &str,
    ) -> PlatformResult<String> {
        self.record(
            "query_campaign_bidding_strategy",
            Call::QueryStrategy {
                campaign: campaign_remote_id.to_string(),
            },
        )?;
        Ok(self.strategy.lock().unwrap().clone())
    }

    async fn update_campaign_bid_field(
        &self,
        _credential: &Credential,
        campaign_remote_id: &str,
        field: CampaignBidField,
        value: Micros,
    ) -> PlatformResult<()> {
        self.record(
            "update_campaign_bid_field",
            Call::UpdateCampaignBidField {
                campaign: campaign_remote_id.to_string(),
                field,
                value: value.value(),
            },
        )
    }

    async fn update_ad_group_bids_batch(
        &self,
        _credential: &Credential,
        ad_group_remote_ids: &[String],
        value: Micros,
    ) -> PlatformResult<()> {
        self.record(
            "update_ad_group_bids_batch",
            Call::UpdateAdGroupBids {
                ad_groups: ad_group_remote_ids.to_vec(),
                value: value.value(),
            },
        )
    }

    async fn update_campaign_status(
        &self,
        _credential: &Credential,
        campaign_remote_id: &str,
        status: EntityStatus,
    ) -> PlatformResult<()> {
        self.record(
            "update_campaign_status",
            Call::UpdateCampaignStatus {
                campaign: campaign_remote_id.to_string(),
                status,
            },
        )?;
        if self
            .failing_status_updates
            .lock()
            .unwrap()
            .contains(campaign_remote_id)
        {
            return Err(PlatformError::new(format!(
                "CAMPAIGN_NOT_MUTABLE: {campaign_remote_id}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

/// In-memory database, fake platform and the components wired over them.
pub struct Harness {
    pub db: Database,
    pub platform: Arc<FakePlatform>,
    pub locks: EntityLocks,
}

impl Harness {
    pub async fn new() -> Self {
        Harness {
            db: database().await,
            platform: FakePlatform::new(),
            locks: EntityLocks::new(),
        }
    }

    /// A harness over [`insert_chain`].
    pub async fn with_chain() -> Self {
        let harness = Self::new().await;
        insert_chain(&harness.db).await;
        harness
    }

    pub fn store(&self) -> Arc<SqliteEntityStore> {
        Arc::new(SqliteEntityStore::new(self.db.clone()))
    }

    pub fn credentials(&self) -> Arc<AccountCredentialProvider> {
        Arc::new(AccountCredentialProvider::new(self.db.clone()))
    }

    pub fn orchestrator(&self) -> SyncOrchestrator {
        SyncOrchestrator::new(
            self.store(),
            self.platform.clone(),
            self.credentials(),
            self.locks.clone(),
            CreativeLimits::default(),
        )
    }

    pub fn keyword_syncer(&self) -> BatchKeywordSyncer {
        BatchKeywordSyncer::new(
            self.store(),
            self.platform.clone(),
            self.credentials(),
            self.locks.clone(),
        )
    }

    pub fn bid_updater(&self) -> BidStrategyUpdater {
        BidStrategyUpdater::new(self.store(), self.platform.clone(), self.credentials())
    }

    pub fn pauser(&self, max_parallel_accounts: usize) -> BulkPauser {
        BulkPauser::new(
            self.store(),
            self.platform.clone(),
            self.credentials(),
            max_parallel_accounts,
        )
    }
}
