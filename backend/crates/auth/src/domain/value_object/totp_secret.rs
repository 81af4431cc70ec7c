//! TOTP Secret Value Object
//!
//! Shared secret of the second factor. Google Authenticator compatible:
//! SHA-1, 6 digits, 30 second step, one step of tolerance either side.

use std::fmt;
use thiserror::Error;
use totp_rs::{Algorithm, Secret, TOTP};

pub const TOTP_DIGITS: usize = 6;
pub const TOTP_STEP: u64 = 30;
pub const TOTP_SKEW: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TotpSecretError {
    #[error("Invalid base32 TOTP secret")]
    InvalidEncoding,

    #[error("Failed to render QR code: {0}")]
    QrCode(String),
}

/// Base32-encoded TOTP secret
#[derive(Clone, PartialEq, Eq)]
pub struct TotpSecret {
    secret_base32: String,
    bytes: Vec<u8>,
}

impl TotpSecret {
    /// Generate a new random 160-bit secret
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        let secret_base32 = secret.to_encoded().to_string();
        // A freshly generated raw secret always converts.
        let bytes = secret.to_bytes().unwrap_or_default();
        Self {
            secret_base32,
            bytes,
        }
    }

    /// Parse a base32 secret (client input or database value).
    ///
    /// Authenticator apps display secrets grouped and sometimes in lower
    /// case, so spaces are dropped and the text upper-cased first.
    pub fn from_base32(secret: impl AsRef<str>) -> Result<Self, TotpSecretError> {
        let secret_base32: String = secret
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if secret_base32.is_empty() {
            return Err(TotpSecretError::InvalidEncoding);
        }

        let bytes = Secret::Encoded(secret_base32.clone())
            .to_bytes()
            .map_err(|_| TotpSecretError::InvalidEncoding)?;
        if bytes.is_empty() {
            return Err(TotpSecretError::InvalidEncoding);
        }

        Ok(Self {
            secret_base32,
            bytes,
        })
    }

    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    // `new_unchecked` because legacy secrets may be shorter than the
    // 128 bits `TOTP::new` insists on.
    fn to_totp(&self, issuer: Option<&str>, account_name: &str) -> TOTP {
        TOTP::new_unchecked(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            self.bytes.clone(),
            issuer.map(str::to_string),
            account_name.to_string(),
        )
    }

    /// Check `code` against the step containing `unix_time` and its neighbours
    pub fn verify_at(&self, code: &str, unix_time: u64) -> bool {
        let code = code.trim();
        if code.len() != TOTP_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        self.to_totp(None, "").check(code, unix_time)
    }

    /// The code valid for the step containing `unix_time`
    pub fn code_at(&self, unix_time: u64) -> String {
        self.to_totp(None, "").generate(unix_time)
    }

    /// otpauth:// URL for manual entry
    pub fn provisioning_uri(&self, issuer: &str, account_name: &str) -> String {
        self.to_totp(Some(issuer), account_name).get_url()
    }

    /// QR code of the provisioning URI as base64-encoded PNG
    pub fn qr_code_base64(&self, issuer: &str, account_name: &str) -> Result<String, TotpSecretError> {
        self.to_totp(Some(issuer), account_name)
            .get_qr_base64()
            .map_err(TotpSecretError::QrCode)
    }
}

impl fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotpSecret")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
