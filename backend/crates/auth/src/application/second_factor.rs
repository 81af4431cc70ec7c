//! Second Factor Use Case
//!
//! Enrollment is two-step: `enroll` hands out a fresh secret without
//! storing anything, `confirm` stores it once the user proves their
//! authenticator produces matching codes.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::totp_secret::TotpSecret;
use crate::error::{AuthError, AuthResult};

pub struct EnrollmentOutput {
    pub shared_secret_base32: String,
    /// otpauth:// URL
    pub provisioning_uri: String,
    /// QR code as base64-encoded PNG
    pub qr_code: String,
}

pub struct SecondFactorUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SecondFactorUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub fn enroll(&self, identity: &Identity) -> AuthResult<EnrollmentOutput> {
        let secret = TotpSecret::generate();
        let issuer = &self.config.totp_issuer;

        let qr_code = secret
            .qr_code_base64(issuer, &identity.user_name)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::debug!(account_id = %identity.account_id, "Second factor enrollment started");

        Ok(EnrollmentOutput {
            provisioning_uri: secret.provisioning_uri(issuer, &identity.user_name),
            shared_secret_base32: secret.as_base32().to_string(),
            qr_code,
        })
    }

    pub async fn confirm(&self, identity: &Identity, shared_secret: &str, code: &str) -> AuthResult<()> {
        self.confirm_at(identity, shared_secret, code, unix_now()).await
    }

    pub async fn confirm_at(
        &self,
        identity: &Identity,
        shared_secret: &str,
        code: &str,
        now: u64,
    ) -> AuthResult<()> {
        let secret =
            TotpSecret::from_base32(shared_secret).map_err(|_| AuthError::InvalidEnrollmentCode)?;

        if !secret.verify_at(code, now) {
            return Err(AuthError::InvalidEnrollmentCode);
        }

        self.store
            .set_second_factor_secret(&identity.account_id, &secret)
            .await?;

        tracing::info!(account_id = %identity.account_id, "Second factor enabled");

        Ok(())
    }

    pub async fn disable(&self, identity: &Identity, code: &str) -> AuthResult<()> {
        self.disable_at(identity, code, unix_now()).await
    }

    /// Requires a currently valid code so a stolen token alone cannot
    /// strip the second factor.
    pub async fn disable_at(&self, identity: &Identity, code: &str, now: u64) -> AuthResult<()> {
        let account = self
            .store
            .find_by_id(&identity.account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let secret = account
            .totp_secret
            .as_ref()
            .ok_or(AuthError::SecondFactorNotEnabled)?;

        if !secret.verify_at(code, now) {
            return Err(AuthError::InvalidSecondFactor);
        }

        if !self
            .store
            .clear_second_factor_secret(&identity.account_id)
            .await?
        {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %identity.account_id, "Second factor disabled");

        Ok(())
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}
