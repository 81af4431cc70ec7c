//! Row types shared by both SQL backends

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use uuid::Uuid;

use crate::domain::entity::{account::Account, group::Group};
use crate::domain::value_object::{
    password::PasswordDigest, totp_secret::TotpSecret, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

#[derive(sqlx::FromRow)]
pub(crate) struct AccountRow {
    account_id: Uuid,
    user_name: String,
    full_name: Option<String>,
    user_role: String,
    password_hash: String,
    totp_secret: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    pub(crate) fn into_account(self) -> AuthResult<Account> {
        let account_id = self.account_id;

        let password = PasswordDigest::from_db(self.password_hash).map_err(|e| {
            AuthError::Internal(format!("Invalid password hash for {account_id}: {e}"))
        })?;

        let totp_secret = self
            .totp_secret
            .map(TotpSecret::from_base32)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret for {account_id}: {e}")))?;

        Ok(Account {
            account_id: AccountId::from_uuid(account_id),
            user_name: UserName::from_db(self.user_name),
            full_name: self.full_name,
            role: UserRole::from_db(self.user_role),
            password,
            totp_secret,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct GroupRow {
    name: String,
    display_name: String,
}

impl GroupRow {
    pub(crate) fn into_group(self) -> Group {
        Group {
            name: UserRole::from_db(self.name),
            display_name: self.display_name,
        }
    }
}
