//! Password Value Objects
//!
//! Domain wrappers around `platform::password`. Hashing and verification
//! are CPU-bound (bcrypt cost 10 is tens of milliseconds), so both run on
//! the blocking pool and the request task only awaits the result.

use std::fmt;
use std::sync::Arc;

use platform::password::{
    ClearTextPassword, HashAlgorithm, HashedPassword, PasswordHashError, PasswordPolicyError,
};

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// A newly chosen password; the policy applies
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw).map(Self)
    }

    /// A submitted password to compare against a stored digest
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Password Digest (Hashed, for storage)
// ============================================================================

/// Salted one-way digest as stored in the credential store
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(HashedPassword);

impl PasswordDigest {
    pub async fn hash(raw: Arc<RawPassword>, algorithm: HashAlgorithm) -> AuthResult<Self> {
        let hashed = tokio::task::spawn_blocking(move || raw.0.hash(algorithm))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Self(hashed))
    }

    /// Constant-time comparison against this digest
    pub async fn verify(&self, raw: Arc<RawPassword>) -> AuthResult<bool> {
        let hashed = self.0.clone();
        tokio::task::spawn_blocking(move || hashed.verify(&raw.0))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))
    }

    pub fn from_db(stored: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_stored(stored).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn needs_rehash(&self, target: &HashAlgorithm) -> bool {
        self.0.needs_rehash(target)
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("hash", &"[HASH]")
            .finish()
    }
}
