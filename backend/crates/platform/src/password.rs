//! Password Hashing and Verification
//!
//! - bcrypt hashing with a tunable cost factor (default 10)
//! - Argon2id accepted for stored hashes and selectable for new ones
//! - Zeroization of clear text passwords on drop
//! - Policy checks for newly chosen passwords
//!
//! Both algorithms embed their random salt in the stored string, so no
//! salt column is needed. Both compare in constant time.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes (bcrypt ignores everything past 72)
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Accepted bcrypt work factors
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} bytes (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("bcrypt cost must be between {min} and {max} (got {actual})")]
    InvalidCost { min: u32, max: u32, actual: u32 },
}

// ============================================================================
// Hash Algorithm
// ============================================================================

/// Algorithm used for newly created hashes.
///
/// Verification always dispatches on the stored format, so switching the
/// algorithm never locks existing accounts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Bcrypt { cost: u32 },
    Argon2id,
}

impl HashAlgorithm {
    /// bcrypt with a validated cost factor
    pub fn bcrypt(cost: u32) -> Result<Self, PasswordHashError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(PasswordHashError::InvalidCost {
                min: MIN_BCRYPT_COST,
                max: MAX_BCRYPT_COST,
                actual: cost,
            });
        }
        Ok(Self::Bcrypt { cost })
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Bcrypt {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Not `Clone`, and `Debug` output is redacted.
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, HashAlgorithm};
///
/// let password = ClearTextPassword::new("Correct-Horse-42".to_string()).unwrap();
/// let hashed = password.hash(HashAlgorithm::bcrypt(4).unwrap()).unwrap();
/// assert!(hashed.verify(&password));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// A newly chosen password: NFKC-normalized, then checked against the policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::for_verification(raw);
        policy::check(&candidate.0)?;
        Ok(candidate)
    }

    /// Wrap a submitted password for comparison against a stored hash.
    ///
    /// No policy is applied: a login attempt must be checked against
    /// whatever the account was created with.
    pub fn for_verification(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password with the given algorithm
    pub fn hash(&self, algorithm: HashAlgorithm) -> Result<HashedPassword, PasswordHashError> {
        let hash = match algorithm {
            HashAlgorithm::Bcrypt { cost } => bcrypt::hash(self.as_bytes(), cost)
                .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?,
            HashAlgorithm::Argon2id => {
                let salt = SaltString::generate(OsRng);
                Argon2::default()
                    .hash_password(self.as_bytes(), &salt)
                    .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
                    .to_string()
            }
        };

        Ok(HashedPassword { hash })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Stored password hash: a bcrypt modular-crypt string or an Argon2 PHC string
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored hash (e.g., from the database)
    pub fn from_stored(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();

        if is_bcrypt(&hash) {
            hash.parse::<bcrypt::HashParts>()
                .map_err(|_| PasswordHashError::InvalidHashFormat)?;
        } else {
            PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        }

        Ok(Self { hash })
    }

    /// The string to persist
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        if is_bcrypt(&self.hash) {
            return bcrypt::verify(password.as_bytes(), &self.hash).unwrap_or(false);
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// True when this hash was produced with a different algorithm or a
    /// weaker bcrypt cost than `target`.
    pub fn needs_rehash(&self, target: &HashAlgorithm) -> bool {
        match target {
            HashAlgorithm::Bcrypt { cost } => match self.hash.parse::<bcrypt::HashParts>() {
                Ok(parts) => parts.get_cost() < *cost,
                Err(_) => true,
            },
            HashAlgorithm::Argon2id => match PasswordHash::new(&self.hash) {
                Ok(parsed) => parsed.algorithm != argon2::Algorithm::Argon2id.ident(),
                Err(_) => true,
            },
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$", "$2x$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

// ============================================================================
// Policy
// ============================================================================

mod policy {
    use super::{MAX_PASSWORD_BYTES, MIN_PASSWORD_LENGTH, PasswordPolicyError};

    const KEYBOARD_RUNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

    const WELL_KNOWN: &[&str] = &[
        "password",
        "password1",
        "password123",
        "senha123",
        "senha1234",
        "mudar123",
        "abcdefgh",
        "letmein1",
        "iloveyou",
        "trustno1",
    ];

    pub(super) fn check(password: &str) -> Result<(), PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let chars = password.chars().count();
        if chars < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: chars,
            });
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_BYTES,
                actual: password.len(),
            });
        }

        // Tab and newline are allowed, other control characters are not
        if password
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n'))
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_weak(&password.to_lowercase()) {
            return Err(PasswordPolicyError::CommonPattern);
        }
        Ok(())
    }

    fn is_weak(lower: &str) -> bool {
        WELL_KNOWN.contains(&lower)
            || KEYBOARD_RUNS.iter().any(|run| lower.contains(run))
            || is_one_repeated_char(lower)
            || is_digit_staircase(lower)
    }

    fn is_one_repeated_char(s: &str) -> bool {
        let mut chars = s.chars();
        chars.next().is_some_and(|first| chars.all(|c| c == first))
    }

    /// `12345678`, `98765432`, `7890123`: every digit one step from the last
    fn is_digit_staircase(s: &str) -> bool {
        let Some(digits) = s
            .bytes()
            .map(|b| b.is_ascii_digit().then(|| b - b'0'))
            .collect::<Option<Vec<u8>>>()
        else {
            return false;
        };
        if digits.len() < 4 {
            return false;
        }

        let next = |a: u8, b: u8| (a + 1) % 10 == b;
        digits.windows(2).all(|w| next(w[0], w[1])) || digits.windows(2).all(|w| next(w[1], w[0]))
    }
}

// ============================================================================
// Tests
// ============================================================================
