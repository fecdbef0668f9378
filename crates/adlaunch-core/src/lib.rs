//! # adlaunch-core: Pure Domain Logic for AdLaunch
//!
//! This crate holds the advertising entity model and every rule that can be
//! decided without touching a database or the ad platform.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AdLaunch Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    adlaunch-sync (Engine)                       │   │
//! │  │   SyncOrchestrator • BatchKeywordSyncer • BidStrategyUpdater    │   │
//! │  │   BulkPauser • SyncEngine façade                                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ adlaunch-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   graph   │  │  micros   │  │ validation│  │   │
//! │  │   │ Campaign  │  │ parent of │  │  Micros   │  │ creative  │  │   │
//! │  │   │ AdGroup   │  │ each kind │  │ units→µ   │  │  assets   │  │   │
//! │  │   │ Keyword   │  │ cascades  │  │           │  │ bid value │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  adlaunch-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities, sync state, accounts, bidding strategies
//! - [`graph`] - The Account → Campaign → AdGroup → {Keyword, Creative} table
//! - [`micros`] - Platform micros (1 unit = 1 000 000 micros)
//! - [`error`] - Domain error types
//! - [`validation`] - Creative asset and bid value rules
//!
//! ## Example Usage
//!
//! ```rust
//! use adlaunch_core::graph::parent_kind;
//! use adlaunch_core::micros::Micros;
//! use adlaunch_core::types::{EntityKind, ParentKind};
//!
//! assert_eq!(parent_kind(EntityKind::Keyword), ParentKind::AdGroup);
//! assert_eq!(Micros::from_units(1.25).map(|m| m.value()), Some(1_250_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod graph;
pub mod micros;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use micros::Micros;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum number of headlines a responsive ad must carry.
pub const MIN_HEADLINES: usize = 3;

/// Platform maximum; extra headlines are dropped before submission.
pub const MAX_HEADLINES: usize = 15;

/// Minimum number of descriptions a responsive ad must carry.
pub const MIN_DESCRIPTIONS: usize = 2;

/// Platform maximum; extra descriptions are dropped before submission.
pub const MAX_DESCRIPTIONS: usize = 4;

/// Character limit per headline.
pub const HEADLINE_MAX_CHARS: usize = 30;

/// Character limit per description.
pub const DESCRIPTION_MAX_CHARS: usize = 90;

/// Micros in one currency unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;
