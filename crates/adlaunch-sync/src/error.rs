//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌──────────────────┐  ┌────────────────────┐ │
//! │  │   Preconditions     │  │     Remote       │  │   Configuration    │ │
//! │  │ (nothing mutated)   │  │                  │  │                    │ │
//! │  │                     │  │ PlatformRequest  │  │ InvalidConfig      │ │
//! │  │ AlreadySynced       │  │   Failed         │  │ ConfigLoadFailed   │ │
//! │  │ ParentNotSynced     │  │ Unsupported      │  │ ConfigSaveFailed   │ │
//! │  │ MissingCredential   │  │   BiddingStrategy│  │                    │ │
//! │  │ ValidationFailed    │  │ CredentialRes-   │  │                    │ │
//! │  │ EntityNotFound      │  │   olutionFailed  │  │                    │ │
//! │  │ NotSynced           │  │                  │  │                    │ │
//! │  │ NoAdGroupsToUpdate  │  └──────────────────┘  └────────────────────┘ │
//! │  │ SyncInProgress      │                                               │
//! │  │ StalePending        │  ┌──────────────────┐                         │
//! │  └─────────────────────┘  │  Store (local)   │                         │
//! │                           └──────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is process-fatal. A precondition error means no remote call
//! was made and no row changed; a remote error on a creation call means the
//! entity was moved to `failed` with the platform's message.

use thiserror::Error;

use adlaunch_core::{EntityKind, ParentRef, ValidationError};

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all engine failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Creation Preconditions
    // =========================================================================
    /// The entity already has a remote counterpart.
    #[error("{kind} {id} is already synced")]
    AlreadySynced { kind: EntityKind, id: String },

    /// The entity's parent has not been created on the platform yet.
    #[error("{kind} {id} cannot be synced before its parent {parent} is synced")]
    ParentNotSynced {
        kind: EntityKind,
        id: String,
        parent: ParentRef,
    },

    /// The owning platform account has no usable refresh credential.
    #[error("No platform credential for account {account_id}: {reason}")]
    MissingCredential { account_id: String, reason: String },

    /// The payload breaks a platform rule and was never submitted.
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// No entity with this id exists for the owner.
    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: String },

    /// The operation needs a synced entity.
    #[error("{kind} {id} has not been synced to the platform")]
    NotSynced { kind: EntityKind, id: String },

    /// A manual CPC bid change found nothing to apply to.
    #[error("Campaign {campaign_id} has no synced ad groups to update")]
    NoAdGroupsToUpdate { campaign_id: String },

    // =========================================================================
    // Attempt Tracking
    // =========================================================================
    /// Another attempt for this entity is running right now.
    #[error("A sync of {kind} {id} is already in progress")]
    SyncInProgress { kind: EntityKind, id: String },

    /// The entity is `pending` but no attempt is running: an earlier attempt
    /// was interrupted and the remote side is unknown.
    #[error("{kind} {id} was left pending by an interrupted attempt; mark it interrupted and verify the platform before retrying")]
    StalePending { kind: EntityKind, id: String },

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The platform rejected or failed a request. Carries its message verbatim.
    #[error("Platform request failed: {0}")]
    PlatformRequestFailed(String),

    /// The campaign uses a bidding strategy a bid update cannot be applied to.
    #[error("Unsupported bidding strategy '{found}' (supported: {})", .supported.join(", "))]
    UnsupportedBiddingStrategy {
        found: String,
        supported: Vec<String>,
    },

    /// An account's credential could not be resolved during a bulk operation.
    #[error("Credential resolution failed for account {account_id}: {reason}")]
    CredentialResolutionFailed { account_id: String, reason: String },

    // =========================================================================
    // Local Store Errors
    // =========================================================================
    /// Reading or writing local rows failed.
    #[error("Store error: {0}")]
    Store(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Conversions
// =============================================================================

impl From<adlaunch_db::DbError> for SyncError {
    fn from(err: adlaunch_db::DbError) -> Self {
        SyncError::Store(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(format!("TOML serialize error: {}", err))
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if the operation stopped before any remote call or row
    /// change.
    ///
    /// ## Precondition Errors
    /// - Entity state (already synced, stale, in progress, not found)
    /// - Parent not synced, missing credential
    /// - Payload validation
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SyncError::AlreadySynced { .. }
                | SyncError::ParentNotSynced { .. }
                | SyncError::MissingCredential { .. }
                | SyncError::ValidationFailed(_)
                | SyncError::EntityNotFound { .. }
                | SyncError::NotSynced { .. }
                | SyncError::NoAdGroupsToUpdate { .. }
                | SyncError::SyncInProgress { .. }
                | SyncError::StalePending { .. }
        )
    }

    /// Returns true if the platform (or its credential exchange) produced
    /// the error.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::PlatformRequestFailed(_)
                | SyncError::UnsupportedBiddingStrategy { .. }
                | SyncError::CredentialResolutionFailed { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
