//! # Credential Provider
//!
//! Resolves the platform credential of an account: its customer id and OAuth
//! refresh token.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use adlaunch_core::Credential;
use adlaunch_db::Database;

/// Why an account's credential could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No active account with this id for the owner.
    #[error("credentials not found")]
    NotFound,

    /// The account exists but holds no refresh token.
    #[error("refresh token missing")]
    MissingToken,

    /// The backing store could not be read.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Source of per-account platform credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, account_id: &str, owner_id: &str)
        -> Result<Credential, CredentialError>;
}

// =============================================================================
// SQLite-backed Provider
// =============================================================================

/// Reads credentials from the `platform_accounts` table.
#[derive(Debug, Clone)]
pub struct AccountCredentialProvider {
    db: Database,
}

impl AccountCredentialProvider {
    pub fn new(db: Database) -> Self {
        AccountCredentialProvider { db }
    }
}

#[async_trait]
impl CredentialProvider for AccountCredentialProvider {
    async fn resolve(
        &self,
        account_id: &str,
        owner_id: &str,
    ) -> Result<Credential, CredentialError> {
        let account = self
            .db
            .accounts()
            .get(account_id, owner_id)
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?
            .filter(|account| account.is_active && !account.customer_id.trim().is_empty())
            .ok_or(CredentialError::NotFound)?;

        let token = account
            .refresh_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(CredentialError::MissingToken)?;

        debug!(account_id = %account_id, "Resolved platform credential");
        Ok(Credential::new(account.customer_id, token))
    }
}
