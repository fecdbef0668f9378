//! # Domain Types
//!
//! Core domain types used throughout AdLaunch.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │ PlatformAccount │  customer_id + refresh token, no creation status  │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Campaign     │   │    SyncState    │   │ CreationStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  account_id     │   │  remote_id      │   │  Draft          │       │
//! │  │  resource_id    │   │  creation_status│   │  Pending        │       │
//! │  │  budget_micros  │   │  creation_error │   │  Synced         │       │
//! │  └────────┬────────┘   │  last_sync_at   │   │  Failed         │       │
//! │           │            └─────────────────┘   └─────────────────┘       │
//! │  ┌────────▼────────┐                                                    │
//! │  │     AdGroup     │                                                    │
//! │  └───┬─────────┬───┘                                                    │
//! │      │         │                                                        │
//! │  ┌───▼────┐ ┌──▼───────┐                                                │
//! │  │Keyword │ │ Creative │                                                │
//! │  └────────┘ └──────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a local `id` (immutable, owner-scoped) and, once synced,
//! a `remote_id` assigned by the ad platform. `remote_id` is set exactly when
//! `creation_status` is `synced`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::graph::parent_kind;
use crate::micros::Micros;

// =============================================================================
// Entity Kind
// =============================================================================

/// The four syncable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Campaign,
    AdGroup,
    Keyword,
    Creative,
}

impl EntityKind {
    /// Every kind, parents before children.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Campaign,
        EntityKind::AdGroup,
        EntityKind::Keyword,
        EntityKind::Creative,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Campaign => "campaign",
            EntityKind::AdGroup => "ad_group",
            EntityKind::Keyword => "keyword",
            EntityKind::Creative => "creative",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownValue {
                field: "entity kind".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Parent Kind
// =============================================================================

/// What an entity's parent reference points at.
///
/// A campaign's parent is a [`PlatformAccount`], which is not itself an
/// entity and has no creation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Account,
    Campaign,
    AdGroup,
}

impl ParentKind {
    /// The entity kind of this parent, `None` for accounts.
    pub const fn as_entity(&self) -> Option<EntityKind> {
        match self {
            ParentKind::Account => None,
            ParentKind::Campaign => Some(EntityKind::Campaign),
            ParentKind::AdGroup => Some(EntityKind::AdGroup),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Account => "account",
            ParentKind::Campaign => "campaign",
            ParentKind::AdGroup => "ad_group",
        }
    }
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed pointer to an entity's parent row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParentRef {
    pub kind: ParentKind,
    pub id: String,
}

impl ParentRef {
    pub fn new(kind: ParentKind, id: impl Into<String>) -> Self {
        ParentRef {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

// =============================================================================
// Creation Status
// =============================================================================

/// Where an entity stands in its one-time creation on the platform.
///
/// ## Lifecycle
/// ```text
///   draft ──► pending ──► synced (terminal)
///                │
///                ▼
///   failed ◄─────┘
///     │
///     └──► pending (explicit retry only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreationStatus {
    /// Authored locally, never submitted.
    Draft,
    /// A remote create call is (or was, before a crash) in flight.
    Pending,
    /// Created on the platform; `remote_id` is set.
    Synced,
    /// The last remote create call failed; `creation_error` holds the reason.
    Failed,
}

impl CreationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CreationStatus::Draft => "draft",
            CreationStatus::Pending => "pending",
            CreationStatus::Synced => "synced",
            CreationStatus::Failed => "failed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub const fn can_transition_to(&self, next: CreationStatus) -> bool {
        matches!(
            (self, next),
            (CreationStatus::Draft, CreationStatus::Pending)
                | (CreationStatus::Failed, CreationStatus::Pending)
                | (CreationStatus::Pending, CreationStatus::Synced)
                | (CreationStatus::Pending, CreationStatus::Failed)
        )
    }

    /// Keywords in these states are picked up by the batch cascade.
    pub const fn awaits_creation(&self) -> bool {
        matches!(self, CreationStatus::Draft | CreationStatus::Pending)
    }
}

impl Default for CreationStatus {
    fn default() -> Self {
        CreationStatus::Draft
    }
}

impl fmt::Display for CreationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entity Status / Budget Type / Match Type
// =============================================================================

/// Serving status of an entity, independent of its creation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Enabled,
    Paused,
    Removed,
}

impl EntityStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Enabled => "ENABLED",
            EntityStatus::Paused => "PAUSED",
            EntityStatus::Removed => "REMOVED",
        }
    }
}

impl Default for EntityStatus {
    fn default() -> Self {
        EntityStatus::Enabled
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetType {
    Daily,
    Total,
}

impl Default for BudgetType {
    fn default() -> Self {
        BudgetType::Daily
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Broad,
    Phrase,
    Exact,
}

impl Default for MatchType {
    fn default() -> Self {
        MatchType::Broad
    }
}

// =============================================================================
// Sync State
// =============================================================================

/// The creation-tracking columns shared by every entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncState {
    /// Identifier assigned by the platform; set iff `creation_status` is synced.
    pub remote_id: Option<String>,
    pub creation_status: CreationStatus,
    /// Raw error text from the last failed attempt.
    pub creation_error: Option<String>,
    #[ts(as = "Option<String>")]
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl SyncState {
    /// A fresh, never-submitted state.
    pub fn draft() -> Self {
        SyncState::default()
    }

    /// A synced state carrying `remote_id`.
    pub fn synced(remote_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        SyncState {
            remote_id: Some(remote_id.into()),
            creation_status: CreationStatus::Synced,
            creation_error: None,
            last_sync_at: Some(at),
        }
    }

    #[inline]
    pub fn is_synced(&self) -> bool {
        self.creation_status == CreationStatus::Synced
    }

    /// Whether `remote_id` and `creation_status` agree.
    pub fn is_consistent(&self) -> bool {
        self.remote_id.is_some() == self.is_synced()
    }
}

/// How one creation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Synced { remote_id: String },
    Failed { error: String },
}

impl AttemptOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, AttemptOutcome::Synced { .. })
    }

    pub fn creation_status(&self) -> CreationStatus {
        match self {
            AttemptOutcome::Synced { .. } => CreationStatus::Synced,
            AttemptOutcome::Failed { .. } => CreationStatus::Failed,
        }
    }
}

// =============================================================================
// Platform Account
// =============================================================================

/// An owner's connection to an ad platform customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PlatformAccount {
    pub id: String,
    pub owner_id: String,
    /// Platform customer identifier (digits, no dashes).
    pub customer_id: String,
    /// OAuth refresh credential; never serialized outward.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub refresh_token: Option<String>,
    pub is_active: bool,
}

impl PlatformAccount {
    /// Active, has a customer id, and carries a non-empty refresh token.
    pub fn has_valid_credential(&self) -> bool {
        self.is_active
            && !self.customer_id.trim().is_empty()
            && self
                .refresh_token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty())
    }
}

/// A resolved credential for platform calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub customer_id: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(customer_id: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Credential {
            customer_id: customer_id.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("customer_id", &self.customer_id)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Campaign
// =============================================================================

/// A campaign under a platform account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Campaign {
    pub id: String,
    pub owner_id: String,
    /// Owning platform account (the campaign's parent).
    pub account_id: String,
    /// The offer/resource this campaign promotes; bulk pause scopes by it.
    pub resource_id: String,
    pub name: String,
    pub budget_micros: i64,
    pub budget_type: BudgetType,
    pub status: EntityStatus,
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    #[ts(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sync: SyncState,
}

impl Campaign {
    #[inline]
    pub fn budget(&self) -> Micros {
        Micros::from_micros(self.budget_micros)
    }
}

// =============================================================================
// Ad Group
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AdGroup {
    pub id: String,
    pub owner_id: String,
    pub campaign_id: String,
    pub name: String,
    pub status: EntityStatus,
    pub cpc_bid_micros: Option<i64>,
    #[serde(flatten)]
    #[ts(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sync: SyncState,
}

// =============================================================================
// Keyword
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Keyword {
    pub id: String,
    pub owner_id: String,
    pub ad_group_id: String,
    pub text: String,
    pub match_type: MatchType,
    pub status: EntityStatus,
    pub final_url: Option<String>,
    pub is_negative: bool,
    /// Batch submission order key (ties broken by `id`).
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    #[ts(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sync: SyncState,
}

// =============================================================================
// Creative
// =============================================================================

/// A responsive search ad.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Creative {
    pub id: String,
    pub owner_id: String,
    pub ad_group_id: String,
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub final_url: String,
    pub path1: Option<String>,
    pub path2: Option<String>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub sync: SyncState,
}

// =============================================================================
// Entity
// =============================================================================

/// Any one of the four syncable entities.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Campaign(Campaign),
    AdGroup(AdGroup),
    Keyword(Keyword),
    Creative(Creative),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Campaign(_) => EntityKind::Campaign,
            Entity::AdGroup(_) => EntityKind::AdGroup,
            Entity::Keyword(_) => EntityKind::Keyword,
            Entity::Creative(_) => EntityKind::Creative,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Campaign(c) => &c.id,
            Entity::AdGroup(g) => &g.id,
            Entity::Keyword(k) => &k.id,
            Entity::Creative(c) => &c.id,
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            Entity::Campaign(c) => &c.owner_id,
            Entity::AdGroup(g) => &g.owner_id,
            Entity::Keyword(k) => &k.owner_id,
            Entity::Creative(c) => &c.owner_id,
        }
    }

    pub fn sync(&self) -> &SyncState {
        match self {
            Entity::Campaign(c) => &c.sync,
            Entity::AdGroup(g) => &g.sync,
            Entity::Keyword(k) => &k.sync,
            Entity::Creative(c) => &c.sync,
        }
    }

    /// The row this entity must wait on before it may be created.
    ///
    /// The kind comes from [`graph::DEPENDENCY_TABLE`](crate::graph::DEPENDENCY_TABLE).
    pub fn parent(&self) -> ParentRef {
        ParentRef::new(parent_kind(self.kind()), self.parent_id())
    }

    /// The foreign key column that points at the parent row.
    pub fn parent_id(&self) -> &str {
        match self {
            Entity::Campaign(c) => &c.account_id,
            Entity::AdGroup(g) => &g.campaign_id,
            Entity::Keyword(k) => &k.ad_group_id,
            Entity::Creative(c) => &c.ad_group_id,
        }
    }
}

impl From<Campaign> for Entity {
    fn from(value: Campaign) -> Self {
        Entity::Campaign(value)
    }
}

impl From<AdGroup> for Entity {
    fn from(value: AdGroup) -> Self {
        Entity::AdGroup(value)
    }
}

impl From<Keyword> for Entity {
    fn from(value: Keyword) -> Self {
        Entity::Keyword(value)
    }
}

impl From<Creative> for Entity {
    fn from(value: Creative) -> Self {
        Entity::Creative(value)
    }
}

// =============================================================================
// Bidding Strategy
// =============================================================================

/// A campaign's bidding strategy as reported live by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiddingStrategy {
    /// Bids live on each ad group.
    ManualCpc,
    /// Campaign carries a max CPC ceiling.
    MaximizeClicks,
    /// Campaign carries a target cost per acquisition.
    TargetCpa,
    /// Anything else the platform reports, verbatim.
    Other(String),
}

impl BiddingStrategy {
    /// Names of the strategies a bid update knows how to apply.
    pub const SUPPORTED: [&'static str; 3] = ["MANUAL_CPC", "MAXIMIZE_CLICKS", "TARGET_CPA"];

    /// Parses the platform's strategy name. Unknown names are kept verbatim.
    pub fn from_remote(name: &str) -> Self {
        match name.trim() {
            "MANUAL_CPC" => BiddingStrategy::ManualCpc,
            "MAXIMIZE_CLICKS" => BiddingStrategy::MaximizeClicks,
            "TARGET_CPA" => BiddingStrategy::TargetCpa,
            other => BiddingStrategy::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BiddingStrategy::ManualCpc => "MANUAL_CPC",
            BiddingStrategy::MaximizeClicks => "MAXIMIZE_CLICKS",
            BiddingStrategy::TargetCpa => "TARGET_CPA",
            BiddingStrategy::Other(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, BiddingStrategy::Other(_))
    }
}

impl fmt::Display for BiddingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
