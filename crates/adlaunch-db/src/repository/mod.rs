//! # Repository Module
//!
//! Database repository implementations for AdLaunch.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  adlaunch-sync (SqliteEntityStore)                                     │
//! │       │                                                                 │
//! │       │  db.keywords().list_awaiting_creation(ad_group, owner)          │
//! │       │  db.sync_state().mark_pending(kind, id, owner)                  │
//! │       ▼                                                                 │
//! │  ┌────────────────────────────┐   ┌──────────────────────────────────┐ │
//! │  │ Per-entity repositories    │   │ SyncStateRepository              │ │
//! │  │ account, campaign,         │   │ creation-status writes for any   │ │
//! │  │ ad_group, keyword,         │   │ kind, guarded by expected state  │ │
//! │  │ creative                   │   │                                  │ │
//! │  └────────────────────────────┘   └──────────────────────────────────┘ │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read and write is scoped by `owner_id`.
//!
//! ## Available Repositories
//!
//! - [`AccountRepository`](account::AccountRepository) - Platform accounts
//! - [`CampaignRepository`](campaign::CampaignRepository) - Campaigns, local status
//! - [`AdGroupRepository`](ad_group::AdGroupRepository) - Ad groups, bid targets
//! - [`KeywordRepository`](keyword::KeywordRepository) - Keywords, batch ordering
//! - [`CreativeRepository`](creative::CreativeRepository) - Responsive ads
//! - [`SyncStateRepository`](sync_state::SyncStateRepository) - Creation status

use adlaunch_core::EntityKind;

pub mod account;
pub mod ad_group;
pub mod campaign;
pub mod creative;
pub mod keyword;
pub mod sync_state;

/// The table holding rows of `kind`.
pub(crate) const fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Campaign => "campaigns",
        EntityKind::AdGroup => "ad_groups",
        EntityKind::Keyword => "keywords",
        EntityKind::Creative => "creatives",
    }
}

/// Creation-tracking columns shared by all entity tables.
pub(crate) const SYNC_COLUMNS: &str = "remote_id, creation_status, creation_error, last_sync_at";
