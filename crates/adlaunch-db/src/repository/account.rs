//! # Platform Account Repository
//!
//! Accounts are the roots of every entity tree. They carry the platform
//! customer id and the OAuth refresh token used for every remote call made
//! on behalf of campaigns beneath them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use adlaunch_core::PlatformAccount;

const ACCOUNT_COLUMNS: &str = "id, owner_id, customer_id, refresh_token, is_active";

/// Repository for platform account operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account.
    pub async fn insert(&self, account: &PlatformAccount) -> DbResult<()> {
        debug!(account_id = %account.id, owner_id = %account.owner_id, "Inserting platform account");

        sqlx::query(
            r#"
            INSERT INTO platform_accounts (id, owner_id, customer_id, refresh_token, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.owner_id)
        .bind(&account.customer_id)
        .bind(&account.refresh_token)
        .bind(account.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an account by id, scoped to its owner.
    ///
    /// ## Returns
    /// * `Ok(Some(PlatformAccount))` - Account found
    /// * `Ok(None)` - No such account for this owner
    pub async fn get(&self, id: &str, owner_id: &str) -> DbResult<Option<PlatformAccount>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM platform_accounts WHERE id = ?1 AND owner_id = ?2"
        );

        let account = sqlx::query_as::<_, PlatformAccount>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Lists an owner's accounts, oldest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<PlatformAccount>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM platform_accounts WHERE owner_id = ?1 ORDER BY created_at, id"
        );

        let accounts = sqlx::query_as::<_, PlatformAccount>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Replaces (or clears) an account's refresh token.
    ///
    /// ## Returns
    /// `true` if the account exists for this owner.
    pub async fn set_refresh_token(
        &self,
        id: &str,
        owner_id: &str,
        refresh_token: Option<&str>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE platform_accounts
            SET refresh_token = ?3, updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(refresh_token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
