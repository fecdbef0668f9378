//! # Platform Client
//!
//! The engine's view of the ad platform API.
//!
//! ## Calls Made Per Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sync(Campaign)        create_campaign                                 │
//! │  sync(AdGroup)         create_ad_group ──► create_keywords_batch       │
//! │  sync(Keyword)         create_keywords_batch (one element)             │
//! │  sync(Creative)        create_responsive_ad                            │
//! │                                                                         │
//! │  update_bid            query_campaign_bidding_strategy, then ONE of:   │
//! │                          update_ad_group_bids_batch   (MANUAL_CPC)     │
//! │                          update_campaign_bid_field    (MAXIMIZE_CLICKS)│
//! │                          update_campaign_bid_field    (TARGET_CPA)     │
//! │                                                                         │
//! │  pause_all             update_campaign_status × N                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is a suspension point and any error it returns is treated as a
//! failure of the operation in progress. The engine never retries.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adlaunch_core::validation::CreativeAssets;
use adlaunch_core::{
    AdGroup, BudgetType, Campaign, Credential, EntityStatus, Keyword, MatchType, Micros,
};

use crate::error::SyncError;

/// An error returned by the platform, message kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        PlatformError {
            message: message.into(),
        }
    }
}

impl From<PlatformError> for SyncError {
    fn from(err: PlatformError) -> Self {
        SyncError::PlatformRequestFailed(err.message)
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

// =============================================================================
// Create Payloads
// =============================================================================

/// Payload for creating a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    pub budget: Micros,
    pub budget_type: BudgetType,
    pub status: EntityStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&Campaign> for CampaignSpec {
    fn from(campaign: &Campaign) -> Self {
        CampaignSpec {
            name: campaign.name.clone(),
            budget: campaign.budget(),
            budget_type: campaign.budget_type,
            status: campaign.status,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
        }
    }
}

/// Payload for creating an ad group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdGroupSpec {
    pub name: String,
    pub status: EntityStatus,
    pub cpc_bid: Option<Micros>,
}

impl From<&AdGroup> for AdGroupSpec {
    fn from(ad_group: &AdGroup) -> Self {
        AdGroupSpec {
            name: ad_group.name.clone(),
            status: ad_group.status,
            cpc_bid: ad_group.cpc_bid_micros.map(Micros::from_micros),
        }
    }
}

/// One keyword inside a batch create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSpec {
    pub text: String,
    pub match_type: MatchType,
    pub status: EntityStatus,
    pub final_url: Option<String>,
    pub is_negative: bool,
}

impl From<&Keyword> for KeywordSpec {
    fn from(keyword: &Keyword) -> Self {
        KeywordSpec {
            text: keyword.text.clone(),
            match_type: keyword.match_type,
            status: keyword.status,
            final_url: keyword.final_url.clone(),
            is_negative: keyword.is_negative,
        }
    }
}

/// One entry of a batch create response, aligned by index with the request.
///
/// Some platform responses echo the keyword text; when present it is used
/// to check the alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCreateResult {
    pub remote_id: String,
    pub text: Option<String>,
}

impl KeywordCreateResult {
    pub fn new(remote_id: impl Into<String>) -> Self {
        KeywordCreateResult {
            remote_id: remote_id.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

// =============================================================================
// Bid Fields
// =============================================================================

/// Campaign-level bid fields, one per campaign bidding strategy that keeps
/// its bid on the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignBidField {
    /// Ceiling on automatic CPC bids (MAXIMIZE_CLICKS).
    MaxCpcBidCeiling,
    /// Target cost per acquisition (TARGET_CPA).
    TargetCpa,
}

impl CampaignBidField {
    /// The platform field path this variant writes.
    pub const fn field_path(&self) -> &'static str {
        match self {
            CampaignBidField::MaxCpcBidCeiling => "maximize_clicks.cpc_bid_ceiling_micros",
            CampaignBidField::TargetCpa => "target_cpa.target_cpa_micros",
        }
    }
}

// =============================================================================
// Platform Client Trait
// =============================================================================

/// Remote create, update and query calls against the ad platform.
///
/// Implementations hold the transport (HTTP client, developer token) and
/// exchange the refresh credential for access as they see fit.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Creates a campaign and returns its remote id.
    async fn create_campaign(
        &self,
        credential: &Credential,
        spec: &CampaignSpec,
    ) -> PlatformResult<String>;

    /// Creates an ad group under a remote campaign and returns its remote id.
    async fn create_ad_group(
        &self,
        credential: &Credential,
        campaign_remote_id: &str,
        spec: &AdGroupSpec,
    ) -> PlatformResult<String>;

    /// Creates keywords under a remote ad group in one call.
    ///
    /// Results are index-aligned with `specs`.
    async fn create_keywords_batch(
        &self,
        credential: &Credential,
        ad_group_remote_id: &str,
        specs: &[KeywordSpec],
    ) -> PlatformResult<Vec<KeywordCreateResult>>;

    /// Creates a responsive search ad and returns its remote id.
    ///
    /// `assets.path1` / `assets.path2` are sent only when present.
    async fn create_responsive_ad(
        &self,
        credential: &Credential,
        ad_group_remote_id: &str,
        assets: &CreativeAssets,
    ) -> PlatformResult<String>;

    /// Reads the campaign's current bidding strategy name.
    async fn query_campaign_bidding_strategy(
        &self,
        credential: &Credential,
        campaign_remote_id: &str,
    ) -> PlatformResult<String>;

    /// Writes one campaign-level bid field.
    async fn update_campaign_bid_field(
        &self,
        credential: &Credential,
        campaign_remote_id: &str,
        field: CampaignBidField,
        value: Micros,
    ) -> PlatformResult<()>;

    /// Sets the same CPC bid on several ad groups in one call.
    async fn update_ad_group_bids_batch(
        &self,
        credential: &Credential,
        ad_group_remote_ids: &[String],
        value: Micros,
    ) -> PlatformResult<()>;

    /// Sets a campaign's serving status.
    async fn update_campaign_status(
        &self,
        credential: &Credential,
        campaign_remote_id: &str,
        status: EntityStatus,
    ) -> PlatformResult<()>;
}
