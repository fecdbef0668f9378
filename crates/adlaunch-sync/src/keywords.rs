//! # Batch Keyword Syncer
//!
//! Creates every waiting keyword of an ad group in one platform call, right
//! after the ad group itself was created.
//!
//! ## Positional Correlation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submitted (created_at, id order)     response (index-aligned)         │
//! │                                                                         │
//! │  0  kw-a  "running shoes"      ◄──►   0  criteria/11  "running shoes"  │
//! │  1  kw-b  "trail shoes"        ◄──►   1  criteria/12  "trail shoes"    │
//! │  2  kw-c  "marathon shoes"     ◄──►   2  criteria/13  "racing flats"   │
//! │                                          └── echoed text differs:      │
//! │                                              kw-c failed, no remote id │
//! │                                                                         │
//! │  whole call fails ──► every keyword failed with the same message       │
//! │  short response   ──► keywords past the end failed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A keyword never receives a remote id unless its position in the response
//! could be trusted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use adlaunch_core::{AttemptOutcome, Entity, EntityKind, Keyword, ParentKind, ParentRef};

use crate::credentials::CredentialProvider;
use crate::error::{SyncError, SyncResult};
use crate::locks::EntityLocks;
use crate::platform::{KeywordCreateResult, KeywordSpec, PlatformClient};
use crate::store::{owning_account_id, EntityStore};

/// How one keyword of a batch ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSyncResult {
    pub keyword_id: String,
    pub outcome: AttemptOutcome,
}

/// Matches batch results to submitted keywords by index.
///
/// Always returns one outcome per keyword.
pub(crate) fn correlate(keywords: &[Keyword], results: &[KeywordCreateResult]) -> Vec<AttemptOutcome> {
    if results.len() > keywords.len() {
        warn!(
            submitted = keywords.len(),
            returned = results.len(),
            "Keyword batch returned extra results; ignoring the surplus"
        );
    }

    keywords
        .iter()
        .enumerate()
        .map(|(index, keyword)| match results.get(index) {
            None => AttemptOutcome::Failed {
                error: format!(
                    "batch response had no result at position {index} ({} results for {} keywords)",
                    results.len(),
                    keywords.len()
                ),
            },
            Some(result) => match &result.text {
                Some(echoed) if !same_keyword_text(echoed, &keyword.text) => {
                    AttemptOutcome::Failed {
                        error: format!(
                            "batch result at position {index} echoed \"{echoed}\" but \"{}\" was submitted",
                            keyword.text
                        ),
                    }
                }
                _ if result.remote_id.trim().is_empty() => AttemptOutcome::Failed {
                    error: format!("batch result at position {index} carried no remote id"),
                },
                _ => AttemptOutcome::Synced {
                    remote_id: result.remote_id.clone(),
                },
            },
        })
        .collect()
}

/// The platform lowercases keyword text, including non-ASCII letters.
fn same_keyword_text(echoed: &str, submitted: &str) -> bool {
    echoed.trim().to_lowercase() == submitted.trim().to_lowercase()
}

/// Batch-creates the waiting keywords of a synced ad group.
#[derive(Clone)]
pub struct BatchKeywordSyncer {
    store: Arc<dyn EntityStore>,
    client: Arc<dyn PlatformClient>,
    credentials: Arc<dyn CredentialProvider>,
    locks: EntityLocks,
}

impl BatchKeywordSyncer {
    pub fn new(
        store: Arc<dyn EntityStore>,
        client: Arc<dyn PlatformClient>,
        credentials: Arc<dyn CredentialProvider>,
        locks: EntityLocks,
    ) -> Self {
        BatchKeywordSyncer {
            store,
            client,
            credentials,
            locks,
        }
    }

    /// Creates every draft or pending keyword under the ad group in one call.
    ///
    /// ## Returns
    /// * `Ok(results)` - One entry per submitted keyword, in submission
    ///   order; empty when nothing was waiting (no remote call is made)
    /// * `Err(SyncError)` - The ad group is missing or unsynced, its
    ///   credential could not be resolved, or the local store failed
    ///
    /// A failed platform call is not an `Err`: it shows up as a failed
    /// outcome on every keyword.
    pub async fn sync_pending_keywords(
        &self,
        ad_group_id: &str,
        owner_id: &str,
    ) -> SyncResult<Vec<KeywordSyncResult>> {
        let ad_group = match self
            .store
            .load_entity(EntityKind::AdGroup, ad_group_id, owner_id)
            .await?
        {
            Some(Entity::AdGroup(ad_group)) => ad_group,
            _ => {
                return Err(SyncError::EntityNotFound {
                    kind: EntityKind::AdGroup,
                    id: ad_group_id.to_string(),
                })
            }
        };

        let ad_group_remote_id = ad_group
            .sync
            .remote_id
            .clone()
            .filter(|_| ad_group.sync.is_synced())
            .ok_or_else(|| SyncError::NotSynced {
                kind: EntityKind::AdGroup,
                id: ad_group_id.to_string(),
            })?;

        let waiting = self
            .store
            .keywords_awaiting_creation(ad_group_id, owner_id)
            .await?;

        // keywords with an individual attempt in flight sit this batch out
        let mut guards = Vec::with_capacity(waiting.len());
        let mut batch = Vec::with_capacity(waiting.len());
        for keyword in waiting {
            match self.locks.try_acquire(EntityKind::Keyword, &keyword.id) {
                Some(guard) => {
                    guards.push(guard);
                    batch.push(keyword);
                }
                None => debug!(keyword_id = %keyword.id, "Keyword busy, leaving it out of the batch"),
            }
        }

        if batch.is_empty() {
            debug!(ad_group_id = %ad_group_id, "No keywords awaiting creation");
            return Ok(Vec::new());
        }

        let campaign = ParentRef::new(ParentKind::Campaign, &ad_group.campaign_id);
        let account_id = owning_account_id(self.store.as_ref(), campaign, owner_id).await?;
        let credential = self
            .credentials
            .resolve(&account_id, owner_id)
            .await
            .map_err(|e| SyncError::MissingCredential {
                account_id: account_id.clone(),
                reason: e.to_string(),
            })?;

        let ids: Vec<String> = batch.iter().map(|k| k.id.clone()).collect();
        self.store
            .mark_pending_batch(EntityKind::Keyword, &ids, owner_id)
            .await?;

        let specs: Vec<KeywordSpec> = batch.iter().map(KeywordSpec::from).collect();
        info!(
            ad_group_id = %ad_group_id,
            count = specs.len(),
            "Submitting keyword batch"
        );

        let outcomes = match self
            .client
            .create_keywords_batch(&credential, &ad_group_remote_id, &specs)
            .await
        {
            Ok(results) => correlate(&batch, &results),
            Err(e) => {
                warn!(ad_group_id = %ad_group_id, error = %e, "Keyword batch failed");
                vec![
                    AttemptOutcome::Failed {
                        error: e.message
                    };
                    batch.len()
                ]
            }
        };

        let recorded: Vec<(String, AttemptOutcome)> = ids.into_iter().zip(outcomes).collect();
        self.store
            .complete_batch(EntityKind::Keyword, owner_id, &recorded)
            .await?;

        let synced = recorded.iter().filter(|(_, o)| o.is_synced()).count();
        info!(
            ad_group_id = %ad_group_id,
            synced,
            failed = recorded.len() - synced,
            "Keyword batch recorded"
        );

        Ok(recorded
            .into_iter()
            .map(|(keyword_id, outcome)| KeywordSyncResult {
                keyword_id,
                outcome,
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
