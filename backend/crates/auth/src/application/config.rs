//! Application Configuration
//!
//! Configuration for the Auth application layer. Built by the binary from
//! the environment and shared as `Arc<AuthConfig>` by every use case.

use std::fmt;
use std::time::Duration;

use platform::password::HashAlgorithm;

use crate::domain::value_object::user_role::UserRole;

/// Minimum signing key length accepted in production (256 bits)
pub const MIN_SECRET_LENGTH: usize = 32;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(8 * 3600);
pub const DEFAULT_TOTP_ISSUER: &str = "Retomas";
pub const DEFAULT_ROLE: &str = "vendedor";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime (8 hours)
    pub token_ttl: Duration,
    /// Algorithm for new password hashes
    pub hash_algorithm: HashAlgorithm,
    /// Issuer shown in authenticator apps
    pub totp_issuer: String,
    /// Whether `POST /signup` is mounted
    pub allow_signup: bool,
    /// Role for accounts created without one
    pub default_role: UserRole,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
            hash_algorithm: HashAlgorithm::default(),
            totp_issuer: DEFAULT_TOTP_ISSUER.to_string(),
            allow_signup: false,
            default_role: UserRole::from_db(DEFAULT_ROLE),
        }
    }

    /// Config with a random per-process signing key (development)
    pub fn with_random_secret() -> Self {
        Self::new(platform::crypto::random_bytes(MIN_SECRET_LENGTH))
    }

    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("totp_issuer", &self.totp_issuer)
            .field("allow_signup", &self.allow_signup)
            .field("default_role", &self.default_role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new(b"k".repeat(32));
        assert_eq!(config.token_ttl_secs(), 28_800);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Bcrypt { cost: 10 });
        assert_eq!(config.totp_issuer, "Retomas");
        assert_eq!(config.default_role.code(), "vendedor");
        assert!(!config.allow_signup);
    }

    #[test]
    fn test_random_secret() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_eq!(a.jwt_secret.len(), MIN_SECRET_LENGTH);
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = AuthConfig::new(b"super-secret-signing-key-0123456".to_vec());
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
