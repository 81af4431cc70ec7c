//! Session Token Issuer/Verifier
//!
//! HS256 JWTs carrying `{sub, username, role, iat, exp}`. Tokens are not
//! persisted: a token is valid exactly while its signature checks out and
//! `now < exp`. There is no revocation list.

use std::str::FromStr;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{account::Account, identity::Identity};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Why a token was rejected. Logged only; clients always see `invalid token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    role: String,
    iat: i64,
    exp: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: i64) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Internal(
                "token signing key must not be empty".to_string(),
            ));
        }
        if ttl_secs <= 0 {
            return Err(AuthError::Internal(
                "token lifetime must be positive".to_string(),
            ));
        }

        // Expiry is checked against an explicit clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, account: &Account) -> AuthResult<String> {
        self.issue_at(account, Utc::now().timestamp())
    }

    /// Mint a token as if the current time were `issued_at` (unix seconds)
    pub fn issue_at(&self, account: &Account, issued_at: i64) -> AuthResult<String> {
        let claims = Claims {
            sub: account.account_id.to_string(),
            username: account.user_name.original().to_string(),
            role: account.role.code().to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_secs),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenRejection> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (unix seconds)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, TokenRejection> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            })?;
        let claims = data.claims;

        if now >= claims.exp {
            return Err(TokenRejection::Expired);
        }

        let account_id =
            AccountId::from_str(&claims.sub).map_err(|_| TokenRejection::Malformed)?;
        let role = UserRole::parse(&claims.role).map_err(|_| TokenRejection::Malformed)?;

        Ok(Identity {
            account_id,
            user_name: claims.username,
            role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
