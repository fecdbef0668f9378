//! # Sync Orchestrator
//!
//! Creates one entity on the platform, enforcing the dependency order.
//!
//! ## Attempt Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       sync(kind, id, owner)                             │
//! │                                                                         │
//! │  claim lock ─────────────── held ──────────────► SyncInProgress        │
//! │      │                                                                  │
//! │  load entity ────────────── missing ───────────► EntityNotFound        │
//! │      │                                                                  │
//! │  creation status ────────── synced ────────────► AlreadySynced         │
//! │      │                      pending ───────────► StalePending          │
//! │      │ draft / failed                                                   │
//! │  parent synced? ─────────── no ────────────────► ParentNotSynced       │
//! │      │                      (campaign: account holds a credential)     │
//! │  resolve credential ─────── fails ─────────────► MissingCredential     │
//! │      │                                                                  │
//! │  validate payload ───────── invalid ───────────► ValidationFailed      │
//! │      │                                                                  │
//! │  ═══ nothing written above this line ═══                               │
//! │      │                                                                  │
//! │  mark pending                                                          │
//! │      │                                                                  │
//! │  remote create ─── ok ────► synced + remote id + last_sync_at          │
//! │                 └─ error ─► failed + message, PlatformRequestFailed    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `pending` row with no lock held was left by an attempt that never
//! recorded its outcome. The platform may or may not have created the
//! entity, so it is not retried automatically; [`SyncOrchestrator::mark_interrupted`]
//! moves it to `failed` once an operator has checked.

use std::sync::Arc;

use tracing::{debug, info, warn};

use adlaunch_core::validation::{validate_creative_assets, CreativeAssets, CreativeLimits};
use adlaunch_core::{AttemptOutcome, CreationStatus, Credential, Entity, EntityKind, Keyword};

use crate::credentials::CredentialProvider;
use crate::error::{SyncError, SyncResult};
use crate::keywords::correlate;
use crate::locks::EntityLocks;
use crate::platform::{AdGroupSpec, CampaignSpec, KeywordSpec, PlatformClient, PlatformResult};
use crate::store::{owning_account_id, EntityStore};

/// Diagnostic stored on an entity moved out of a stale `pending`.
pub const INTERRUPTED_MESSAGE: &str =
    "sync attempt was interrupted before its outcome was recorded; verify the platform before retrying";

/// What gets sent for each kind, built before anything is written.
enum Submission {
    Campaign(CampaignSpec),
    AdGroup(AdGroupSpec),
    Keyword(Keyword),
    Creative(CreativeAssets),
}

/// Single-entity creation state machine.
#[derive(Clone)]
pub struct SyncOrchestrator {
    store: Arc<dyn EntityStore>,
    client: Arc<dyn PlatformClient>,
    credentials: Arc<dyn CredentialProvider>,
    locks: EntityLocks,
    limits: CreativeLimits,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        client: Arc<dyn PlatformClient>,
        credentials: Arc<dyn CredentialProvider>,
        locks: EntityLocks,
        limits: CreativeLimits,
    ) -> Self {
        SyncOrchestrator {
            store,
            client,
            credentials,
            locks,
            limits,
        }
    }

    /// Creates the entity on the platform.
    ///
    /// ## Returns
    /// * `Ok(remote_id)` - The entity is now `synced`
    /// * `Err(PlatformRequestFailed)` - The platform refused; the entity is
    ///   now `failed` with the message stored
    /// * `Err(_)` - Any other error left the entity untouched
    pub async fn sync(&self, kind: EntityKind, id: &str, owner_id: &str) -> SyncResult<String> {
        let _guard = self
            .locks
            .try_acquire(kind, id)
            .ok_or_else(|| SyncError::SyncInProgress {
                kind,
                id: id.to_string(),
            })?;

        let entity = self.load(kind, id, owner_id).await?;
        match entity.sync().creation_status {
            CreationStatus::Synced => {
                debug!(kind = %kind, entity_id = %id, "Already synced");
                return Err(SyncError::AlreadySynced {
                    kind,
                    id: id.to_string(),
                });
            }
            CreationStatus::Pending => {
                warn!(kind = %kind, entity_id = %id, "Found pending entity with no attempt running");
                return Err(SyncError::StalePending {
                    kind,
                    id: id.to_string(),
                });
            }
            CreationStatus::Draft | CreationStatus::Failed => {}
        }

        let parent_remote_id = self.check_parent(&entity, owner_id).await?;
        let account_id = owning_account_id(self.store.as_ref(), entity.parent(), owner_id).await?;
        let credential = self
            .credentials
            .resolve(&account_id, owner_id)
            .await
            .map_err(|e| SyncError::MissingCredential {
                account_id: account_id.clone(),
                reason: e.to_string(),
            })?;

        let submission = self.prepare(&entity)?;

        self.store.mark_pending(kind, id, owner_id).await?;
        info!(kind = %kind, entity_id = %id, account_id = %account_id, "Creating on platform");

        let outcome = self
            .submit(submission, parent_remote_id.as_deref(), &credential)
            .await;
        self.store.complete(kind, id, owner_id, &outcome).await?;

        match outcome {
            AttemptOutcome::Synced { remote_id } => {
                info!(kind = %kind, entity_id = %id, remote_id = %remote_id, "Entity synced");
                Ok(remote_id)
            }
            AttemptOutcome::Failed { error } => {
                warn!(kind = %kind, entity_id = %id, error = %error, "Entity creation failed");
                Err(SyncError::PlatformRequestFailed(error))
            }
        }
    }

    /// Moves an entity left `pending` by an interrupted attempt to `failed`.
    ///
    /// ## Returns
    /// * `Ok(true)` - The entity was pending and is now failed
    /// * `Ok(false)` - The entity was not pending; nothing changed
    /// * `Err(SyncInProgress)` - An attempt is actually running
    pub async fn mark_interrupted(
        &self,
        kind: EntityKind,
        id: &str,
        owner_id: &str,
    ) -> SyncResult<bool> {
        let _guard = self
            .locks
            .try_acquire(kind, id)
            .ok_or_else(|| SyncError::SyncInProgress {
                kind,
                id: id.to_string(),
            })?;

        let entity = self.load(kind, id, owner_id).await?;
        if entity.sync().creation_status != CreationStatus::Pending {
            return Ok(false);
        }

        let outcome = AttemptOutcome::Failed {
            error: INTERRUPTED_MESSAGE.to_string(),
        };
        self.store.complete(kind, id, owner_id, &outcome).await?;

        warn!(kind = %kind, entity_id = %id, "Marked interrupted attempt as failed");
        Ok(true)
    }

    async fn load(&self, kind: EntityKind, id: &str, owner_id: &str) -> SyncResult<Entity> {
        self.store
            .load_entity(kind, id, owner_id)
            .await?
            .ok_or_else(|| SyncError::EntityNotFound {
                kind,
                id: id.to_string(),
            })
    }

    /// Returns the parent's remote id, or `None` for a campaign whose
    /// account is usable.
    async fn check_parent(&self, entity: &Entity, owner_id: &str) -> SyncResult<Option<String>> {
        let parent = entity.parent();

        let parent_remote_id = match parent.kind.as_entity() {
            None => {
                let usable = self
                    .store
                    .load_account(&parent.id, owner_id)
                    .await?
                    .is_some_and(|account| account.has_valid_credential());
                if usable {
                    return Ok(None);
                }
                None
            }
            Some(parent_kind) => self
                .store
                .load_entity(parent_kind, &parent.id, owner_id)
                .await?
                .filter(|row| row.sync().is_synced())
                .and_then(|row| row.sync().remote_id.clone()),
        };

        match parent_remote_id {
            Some(remote_id) => Ok(Some(remote_id)),
            None => {
                debug!(
                    kind = %entity.kind(),
                    entity_id = %entity.id(),
                    parent = %parent,
                    "Parent not synced"
                );
                Err(SyncError::ParentNotSynced {
                    kind: entity.kind(),
                    id: entity.id().to_string(),
                    parent,
                })
            }
        }
    }

    fn prepare(&self, entity: &Entity) -> SyncResult<Submission> {
        let submission = match entity {
            Entity::Campaign(campaign) => Submission::Campaign(CampaignSpec::from(campaign)),
            Entity::AdGroup(ad_group) => Submission::AdGroup(AdGroupSpec::from(ad_group)),
            Entity::Keyword(keyword) => Submission::Keyword(keyword.clone()),
            Entity::Creative(creative) => Submission::Creative(
                validate_creative_assets(
                    &creative.headlines,
                    &creative.descriptions,
                    &creative.final_url,
                    &self.limits,
                )?
                .with_display_paths(creative.path1.as_deref(), creative.path2.as_deref()),
            ),
        };
        Ok(submission)
    }

    async fn submit(
        &self,
        submission: Submission,
        parent_remote_id: Option<&str>,
        credential: &Credential,
    ) -> AttemptOutcome {
        let parent = parent_remote_id.unwrap_or_default();

        let created: PlatformResult<String> = match submission {
            Submission::Campaign(spec) => self.client.create_campaign(credential, &spec).await,
            Submission::AdGroup(spec) => self.client.create_ad_group(credential, parent, &spec).await,
            Submission::Creative(assets) => {
                self.client
                    .create_responsive_ad(credential, parent, &assets)
                    .await
            }
            // a lone keyword goes through the batch call as a batch of one
            Submission::Keyword(keyword) => {
                let specs = [KeywordSpec::from(&keyword)];
                return match self.client.create_keywords_batch(credential, parent, &specs).await {
                    Ok(results) => correlate(std::slice::from_ref(&keyword), &results)
                        .pop()
                        .unwrap_or_else(|| AttemptOutcome::Failed {
                            error: "keyword batch produced no outcome".to_string(),
                        }),
                    Err(e) => AttemptOutcome::Failed { error: e.message },
                };
            }
        };

        match created {
            Ok(remote_id) => AttemptOutcome::Synced { remote_id },
            Err(e) => AttemptOutcome::Failed { error: e.message },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
