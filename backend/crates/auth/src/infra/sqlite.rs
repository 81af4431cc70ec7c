//! SQLite Credential Store
//!
//! The embedded backend. Same schema as PostgreSQL with UUIDs stored as
//! 16-byte blobs and timestamps as RFC 3339 text.

use chrono::Utc;
use kernel::id::AccountId;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::domain::entity::{account::Account, group::Group};
use crate::domain::repository::{CredentialStore, GroupStore};
use crate::domain::value_object::{
    password::PasswordDigest, totp_secret::TotpSecret, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::map_account_write_error;
use crate::infra::row::{AccountRow, GroupRow};

/// SQLite-backed credential store
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Private in-memory database with migrations applied (tests, demos).
    ///
    /// A single connection that never expires: every connection to
    /// `sqlite::memory:` is a separate, empty database.
    pub async fn in_memory() -> AuthResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the embedded SQLite migrations
    pub async fn migrate(&self) -> AuthResult<()> {
        sqlx::migrate!("../../database/migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::Internal(format!("Migration failed: {e}")))
    }
}

impl CredentialStore for SqliteCredentialStore {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                user_name,
                user_name_canonical,
                full_name,
                user_role,
                password_hash,
                totp_secret,
                created_at,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.full_name.as_deref())
        .bind(account.role.code())
        .bind(account.password.as_str())
        .bind(account.totp_secret.as_ref().map(TotpSecret::as_base32))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_account_write_error)?;

        Ok(())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                user_name,
                full_name,
                user_role,
                password_hash,
                totp_secret,
                created_at,
                updated_at
            FROM accounts
            WHERE user_name_canonical = ?
            "#,
        )
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                user_name,
                full_name,
                user_role,
                password_hash,
                totp_secret,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = ?
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn set_second_factor_secret(
        &self,
        account_id: &AccountId,
        secret: &TotpSecret,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts SET
                totp_secret = ?,
                updated_at = ?
            WHERE account_id = ? AND totp_secret IS NULL
            "#,
        )
        .bind(secret.as_base32())
        .bind(Utc::now())
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(());
        }

        match self.find_by_id(account_id).await? {
            Some(_) => Err(AuthError::SecondFactorAlreadyEnabled),
            None => Err(AuthError::AccountNotFound),
        }
    }

    async fn clear_second_factor_secret(&self, account_id: &AccountId) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE accounts SET totp_secret = NULL, updated_at = ? WHERE account_id = ?",
        )
        .bind(Utc::now())
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn list_all(&self) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                user_name,
                full_name,
                user_role,
                password_hash,
                totp_secret,
                created_at,
                updated_at
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts SET
                user_name = ?,
                user_name_canonical = ?,
                full_name = ?,
                user_role = ?,
                password_hash = ?,
                updated_at = ?
            WHERE account_id = ?
            "#,
        )
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.full_name.as_deref())
        .bind(account.role.code())
        .bind(account.password.as_str())
        .bind(account.updated_at)
        .bind(account.account_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_account_write_error)?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::AccountNotFound);
        }
        Ok(())
    }

    async fn update_password(
        &self,
        account_id: &AccountId,
        password: &PasswordDigest,
    ) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE accounts SET password_hash = ?, updated_at = ? WHERE account_id = ?",
        )
        .bind(password.as_str())
        .bind(Utc::now())
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE account_id = ?")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted == 1)
    }

    async fn count(&self) -> AuthResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl GroupStore for SqliteCredentialStore {
    async fn list_groups(&self) -> AuthResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT name, display_name FROM groups ORDER BY display_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupRow::into_group).collect())
    }

    async fn find_group(&self, name: &UserRole) -> AuthResult<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT name, display_name FROM groups WHERE name = ?",
        )
        .bind(name.code())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupRow::into_group))
    }
}
