//! PostgreSQL Credential Store

use chrono::Utc;
use kernel::id::AccountId;
use sqlx::PgPool;

use crate::domain::entity::{account::Account, group::Group};
use crate::domain::repository::{CredentialStore, GroupStore};
use crate::domain::value_object::{
    password::PasswordDigest, totp_secret::TotpSecret, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::map_account_write_error;
use crate::infra::row::{AccountRow, GroupRow};

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded PostgreSQL migrations
    pub async fn migrate(&self) -> AuthResult<()> {
        sqlx::migrate!("../../database/migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::Internal(format!("Migration failed: {e}")))
    }
}

impl CredentialStore for PgCredentialStore {
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
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
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
            WHERE user_name_canonical = $1
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
            WHERE account_id = $1
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
                totp_secret = $2,
                updated_at = $3
            WHERE account_id = $1 AND totp_secret IS NULL
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(secret.as_base32())
        .bind(Utc::now())
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
            "UPDATE accounts SET totp_secret = NULL, updated_at = $2 WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(Utc::now())
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
                user_name = $2,
                user_name_canonical = $3,
                full_name = $4,
                user_role = $5,
                password_hash = $6,
                updated_at = $7
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.original())
        .bind(account.user_name.canonical())
        .bind(account.full_name.as_deref())
        .bind(account.role.code())
        .bind(account.password.as_str())
        .bind(account.updated_at)
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
            "UPDATE accounts SET password_hash = $2, updated_at = $3 WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(password.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
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

impl GroupStore for PgCredentialStore {
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
            "SELECT name, display_name FROM groups WHERE name = $1",
        )
        .bind(name.code())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupRow::into_group))
    }
}
