//! # adlaunch-db: Database Layer for AdLaunch
//!
//! This crate provides database access for AdLaunch: platform accounts and the
//! four syncable entity tables, stored in SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AdLaunch Data Flow                               │
//! │                                                                         │
//! │  SyncEngine (adlaunch-sync) ──► SqliteEntityStore                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   adlaunch-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ accounts      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ campaigns ... │    │ 001_initial  │  │   │
//! │  │   │               │    │ sync_state    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (~/.local/share/adlaunch/adlaunch.db by default)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adlaunch_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/adlaunch.db")).await?;
//!
//! let campaign = db.campaigns().get("cmp-1", "owner-1").await?;
//! db.sync_state().mark_pending(EntityKind::Campaign, "cmp-1", "owner-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::ad_group::AdGroupRepository;
pub use repository::campaign::CampaignRepository;
pub use repository::creative::CreativeRepository;
pub use repository::keyword::KeywordRepository;
pub use repository::sync_state::SyncStateRepository;
