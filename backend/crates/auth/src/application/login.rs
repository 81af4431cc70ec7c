//! Login Use Case
//!
//! CredentialCheck -> SecondFactorCheck (only when enabled) -> TokenIssuance.
//!
//! Unknown users and wrong passwords fail identically with
//! `InvalidCredentials`, and both pay for one hash verification: an unknown
//! user name is checked against a decoy digest built with the configured
//! algorithm. A missing one-time code is reported separately as
//! `SecondFactorRequired` so the client knows to prompt for it.

use std::sync::Arc;

use chrono::Utc;
use platform::password::HashAlgorithm;
use tokio::sync::OnceCell;

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::entity::account::Account;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    password::{PasswordDigest, RawPassword},
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

pub struct LoginInput {
    pub username: String,
    pub password: String,
    pub second_factor_code: Option<String>,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub account: Account,
}

/// Digest that unknown user names are verified against.
///
/// Built on first use and shared through clones, so it is hashed once per
/// process rather than once per request.
#[derive(Clone, Default)]
pub struct DecoyDigest(Arc<OnceCell<PasswordDigest>>);

impl DecoyDigest {
    async fn get(&self, algorithm: HashAlgorithm) -> AuthResult<&PasswordDigest> {
        self.0
            .get_or_try_init(|| {
                let raw = RawPassword::for_verification(DECOY_PASSWORD.to_string());
                PasswordDigest::hash(Arc::new(raw), algorithm)
            })
            .await
    }

    /// Whether an unknown-user login has already run against it
    pub fn is_built(&self) -> bool {
        self.0.initialized()
    }
}

pub struct LoginUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
    decoy: DecoyDigest,
}

impl<S> LoginUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            tokens,
            config,
            decoy: DecoyDigest::default(),
        }
    }

    /// Share a decoy digest that outlives this use case
    pub fn with_decoy(mut self, decoy: DecoyDigest) -> Self {
        self.decoy = decoy;
        self
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        self.execute_at(input, Utc::now().timestamp()).await
    }

    /// Run the login as if the current time were `now` (unix seconds)
    pub async fn execute_at(&self, input: LoginInput, now: i64) -> AuthResult<LoginOutput> {
        // CredentialCheck
        let user_name =
            UserName::parse(&input.username).map_err(|_| AuthError::InvalidCredentials)?;

        let password = Arc::new(RawPassword::for_verification(input.password));
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(mut account) = self.store.find_by_user_name(&user_name).await? else {
            let decoy = self.decoy.get(self.config.hash_algorithm).await?;
            decoy.verify(password).await?;
            tracing::warn!(user_name = %user_name, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !account.password.verify(Arc::clone(&password)).await? {
            tracing::warn!(user_name = %user_name, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // SecondFactorCheck
        if let Some(secret) = &account.totp_secret {
            let code = input
                .second_factor_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .ok_or(AuthError::SecondFactorRequired)?;

            let at = u64::try_from(now).map_err(|_| AuthError::InvalidSecondFactor)?;
            if !secret.verify_at(code, at) {
                return Err(AuthError::InvalidSecondFactor);
            }
        }

        if account.password.needs_rehash(&self.config.hash_algorithm) {
            self.upgrade_password(&mut account, password).await;
        }

        // TokenIssuance
        let token = self.tokens.issue_at(&account, now)?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            second_factor = account.second_factor_enabled(),
            "User logged in"
        );

        Ok(LoginOutput { token, account })
    }

    /// Re-hash with the configured algorithm. Best effort: a failure only
    /// leaves the old (still valid) hash in place. Only the hash column is
    /// written, so concurrent profile edits are kept.
    async fn upgrade_password(&self, account: &mut Account, password: Arc<RawPassword>) {
        let digest = match PasswordDigest::hash(password, self.config.hash_algorithm).await {
            Ok(digest) => digest,
            Err(e) => {
                tracing::error!(account_id = %account.account_id, error = %e, "Password rehash failed");
                return;
            }
        };

        match self.store.update_password(&account.account_id, &digest).await {
            Ok(true) => {
                tracing::info!(account_id = %account.account_id, "Password hash upgraded");
                account.set_password(digest);
            }
            Ok(false) => {
                tracing::warn!(account_id = %account.account_id, "Account vanished before rehash");
            }
            Err(e) => {
                tracing::error!(account_id = %account.account_id, error = %e, "Password rehash not stored");
            }
        }
    }
}
