//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer (PostgreSQL and SQLite).

use kernel::id::AccountId;

use crate::domain::entity::{account::Account, group::Group};
use crate::domain::value_object::{
    password::PasswordDigest, totp_secret::TotpSecret, user_name::UserName, user_role::UserRole,
};
use crate::error::AuthResult;

/// Credential store: one record per account
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Insert a new account.
    ///
    /// Fails with `DuplicateUsername` when the canonical user name is taken.
    /// The check is the storage layer's unique index, so two concurrent
    /// calls for the same name cannot both succeed.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Activate the second factor.
    ///
    /// Write-once: succeeds only while no secret is active, otherwise
    /// `SecondFactorAlreadyEnabled` (`AccountNotFound` for unknown ids).
    async fn set_second_factor_secret(
        &self,
        account_id: &AccountId,
        secret: &TotpSecret,
    ) -> AuthResult<()>;

    /// Deactivate the second factor. Returns false for unknown ids.
    async fn clear_second_factor_secret(&self, account_id: &AccountId) -> AuthResult<bool>;

    /// All accounts, newest first
    async fn list_all(&self) -> AuthResult<Vec<Account>>;

    /// Persist name, full name, role and password changes
    async fn update(&self, account: &Account) -> AuthResult<()>;

    /// Replace only the password hash. Returns false for unknown ids.
    async fn update_password(
        &self,
        account_id: &AccountId,
        password: &PasswordDigest,
    ) -> AuthResult<bool>;

    /// Returns false when no such account exists
    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool>;

    async fn count(&self) -> AuthResult<u64>;
}

/// Read access to the seeded groups
#[trait_variant::make(GroupStore: Send)]
pub trait LocalGroupStore {
    /// Ordered by display name
    async fn list_groups(&self) -> AuthResult<Vec<Group>>;

    async fn find_group(&self, name: &UserRole) -> AuthResult<Option<Group>>;
}
