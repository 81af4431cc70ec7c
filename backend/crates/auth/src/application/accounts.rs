//! Account Management Use Case
//!
//! Profile lookup, groups, admin user management and self-service signup.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, group::Group, identity::Identity};
use crate::domain::repository::{CredentialStore, GroupStore};
use crate::domain::value_object::{
    password::{PasswordDigest, RawPassword},
    user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct CreateAccountInput {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Falls back to the configured default role
    pub role: Option<String>,
}

/// Absent fields are left unchanged
#[derive(Default)]
pub struct UpdateAccountInput {
    pub username: Option<String>,
    /// An empty string clears the name
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

pub struct AccountsUseCase<S>
where
    S: CredentialStore + GroupStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> AccountsUseCase<S>
where
    S: CredentialStore + GroupStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    /// The caller's own account
    pub async fn me(&self, identity: &Identity) -> AuthResult<Account> {
        self.store
            .find_by_id(&identity.account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    pub async fn list(&self) -> AuthResult<Vec<Account>> {
        self.store.list_all().await
    }

    pub async fn groups(&self) -> AuthResult<Vec<Group>> {
        self.store.list_groups().await
    }

    /// Admin-initiated creation; any group or `admin`
    pub async fn create(&self, input: CreateAccountInput) -> AuthResult<Account> {
        let role = match input.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => self.resolve_role(role).await?,
            _ => self.config.default_role.clone(),
        };
        self.insert(input.username, input.password, input.full_name, role)
            .await
    }

    /// Self-service registration; always the default role, never admin
    pub async fn signup(
        &self,
        username: String,
        password: String,
        full_name: Option<String>,
    ) -> AuthResult<Account> {
        let role = self.config.default_role.clone();
        if role.is_admin() {
            return Err(AuthError::Forbidden);
        }
        self.insert(username, password, full_name, role).await
    }

    pub async fn update(
        &self,
        actor: &Identity,
        account_id: &AccountId,
        input: UpdateAccountInput,
    ) -> AuthResult<Account> {
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if let Some(username) = input.username {
            account.set_user_name(UserName::parse(username)?);
        }
        if let Some(full_name) = input.full_name {
            account.set_full_name(Some(full_name));
        }
        if let Some(role) = input.role {
            let role = self.resolve_role(&role).await?;
            if actor.account_id == *account_id && actor.is_admin() && !role.is_admin() {
                return Err(AuthError::Validation(
                    "you cannot remove your own admin role".to_string(),
                ));
            }
            account.set_role(role);
        }
        if let Some(password) = input.password {
            let password = Arc::new(RawPassword::new(password)?);
            account.set_password(PasswordDigest::hash(password, self.config.hash_algorithm).await?);
        }

        self.store.update(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            actor = %actor.account_id,
            "Account updated"
        );

        Ok(account)
    }

    pub async fn delete(&self, actor: &Identity, account_id: &AccountId) -> AuthResult<()> {
        if actor.account_id == *account_id {
            return Err(AuthError::Validation(
                "you cannot delete your own account".to_string(),
            ));
        }

        if !self.store.delete(account_id).await? {
            return Err(AuthError::AccountNotFound);
        }

        // Tokens already issued to the account stay valid until they expire.
        tracing::info!(account_id = %account_id, actor = %actor.account_id, "Account deleted");

        Ok(())
    }

    async fn insert(
        &self,
        username: String,
        password: String,
        full_name: Option<String>,
        role: UserRole,
    ) -> AuthResult<Account> {
        let user_name = UserName::parse(username)?;
        let password = Arc::new(RawPassword::new(password)?);
        let digest = PasswordDigest::hash(password, self.config.hash_algorithm).await?;

        let account = Account::new(user_name, full_name, role, digest);
        self.store.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account created"
        );

        Ok(account)
    }

    /// `admin` or the code of an existing group
    async fn resolve_role(&self, code: &str) -> AuthResult<UserRole> {
        let role = UserRole::parse(code)?;
        if role.is_admin() {
            return Ok(role);
        }
        self.store
            .find_group(&role)
            .await?
            .map(|group| group.name)
            .ok_or_else(|| AuthError::UnknownGroup(role.code().to_string()))
    }
}
