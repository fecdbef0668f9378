//! # adlaunch-sync: Creation Sync Engine for AdLaunch
//!
//! This crate pushes locally drafted campaigns, ad groups, keywords and
//! creatives to the ad platform in dependency order, and applies bid and
//! serving-status changes to entities that already exist there.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Engine Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     SyncEngine (public façade)                   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │      ┌────────────────┬───────┴────────┬────────────────────┐          │
//! │      ▼                ▼                ▼                    ▼           │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │ SyncOrches-  │ │ BatchKeyword │ │ BidStrategy  │ │  BulkPauser  │   │
//! │  │ trator       │ │ Syncer       │ │ Updater      │ │              │   │
//! │  │              │ │              │ │              │ │ per-account  │   │
//! │  │ draft ──►    │ │ one call per │ │ live strategy│ │ groups,      │   │
//! │  │ pending ──►  │ │ ad group,    │ │ → one update │ │ isolated     │   │
//! │  │ synced|failed│ │ index-aligned│ │   shape      │ │ failures     │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Collaborators (async traits, shared as Arc<dyn …>)              │  │
//! │  │  EntityStore ◄── SqliteEntityStore (adlaunch-db)                 │  │
//! │  │  CredentialProvider ◄── AccountCredentialProvider (adlaunch-db)  │  │
//! │  │  PlatformClient ◄── supplied by the caller                       │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `SyncEngine`, the entry point
//! - [`orchestrator`] - Single-entity creation state machine
//! - [`keywords`] - Batch keyword creation and result correlation
//! - [`bidding`] - Strategy-aware bid updates
//! - [`pause`] - Bulk pause across accounts
//! - [`platform`] - The `PlatformClient` trait and request specs
//! - [`credentials`] - Credential resolution
//! - [`store`] - The `EntityStore` trait and its SQLite implementation
//! - [`locks`] - Per-entity attempt locks
//! - [`config`] - Engine configuration (TOML + environment)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adlaunch_sync::{EngineConfig, SyncEngine};
//!
//! let config = EngineConfig::load_or_default(None);
//! let engine = SyncEngine::open(&config, platform_client).await?;
//!
//! engine.sync_campaign("cmp-1", owner_id).await?;
//! let outcome = engine.sync_ad_group("ag-1", owner_id).await?;
//! println!("{} keywords created", outcome.keywords.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bidding;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod locks;
pub mod orchestrator;
pub mod pause;
pub mod platform;
pub mod store;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use bidding::{BidStrategyUpdater, BidUpdateOutcome, BidUpdateShape};
pub use config::{DatabaseSettings, EngineConfig, PauseSettings};
pub use credentials::{AccountCredentialProvider, CredentialError, CredentialProvider};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{SyncError, SyncResult};
pub use keywords::{BatchKeywordSyncer, KeywordSyncResult};
pub use locks::{EntityGuard, EntityLocks};
pub use orchestrator::SyncOrchestrator;
pub use pause::{BulkPauser, CampaignPauseResult, PauseReport};
pub use platform::{
    AdGroupSpec, CampaignBidField, CampaignSpec, KeywordCreateResult, KeywordSpec, PlatformClient,
    PlatformError, PlatformResult,
};
pub use store::{EntityStore, SqliteEntityStore};
