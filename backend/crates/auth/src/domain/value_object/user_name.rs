//! User Name Value Object
//!
//! The login handle. Shown in the admin user list and used as the label of
//! the authenticator entry, so it stays short and plain ASCII.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Collide with routes or read as system identities.
/// `admin` is not here: it is the bootstrap account.
const RESERVED: &[&str] = &[
    "me", "self", "api", "auth", "login", "signup", "users", "groups", "root", "system", "null",
    "undefined", "anonymous",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("username is required")]
    Empty,

    #[error("username must be {USER_NAME_MIN_LENGTH}-{USER_NAME_MAX_LENGTH} characters (got {0})")]
    Length(usize),

    #[error("username may only use a-z, 0-9 and _ . - + (found '{0}')")]
    InvalidCharacter(char),

    #[error("username must start and end with a letter, digit or _")]
    InvalidEdge,

    #[error("username cannot contain '..'")]
    ConsecutiveDots,

    #[error("username needs at least one letter or digit")]
    NoAlphanumeric,

    #[error("'{0}' is reserved")]
    Reserved(String),
}

/// Validated user name.
///
/// `original` is what the user typed (NFKC, trimmed) and is what gets
/// displayed; `canonical` is its lower-case form, used for lookups and the
/// unique index, so `Ana` and `ana` are the same account.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    pub fn parse(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let normalized: String = input.as_ref().nfkc().collect();
        let original = normalized.trim().to_string();
        let canonical = original.to_lowercase();
        validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Rebuild from a stored value; the row was validated on insert.
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            canonical: original.to_lowercase(),
            original,
        }
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Same as [`canonical`](Self::canonical)
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

fn validate(name: &str) -> Result<(), UserNameError> {
    if name.is_empty() {
        return Err(UserNameError::Empty);
    }

    let length = name.chars().count();
    if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&length) {
        return Err(UserNameError::Length(length));
    }

    if let Some(bad) = name
        .chars()
        .find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || "_.-+".contains(c)))
    {
        return Err(UserNameError::InvalidCharacter(bad));
    }

    // Only ASCII is left, so byte indexing is safe
    let edge_ok = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let bytes = name.as_bytes();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return Err(UserNameError::InvalidEdge);
    }

    if name.contains("..") {
        return Err(UserNameError::ConsecutiveDots);
    }
    if !bytes.iter().any(u8::is_ascii_alphanumeric) {
        return Err(UserNameError::NoAlphanumeric);
    }
    if RESERVED.contains(&name) {
        return Err(UserNameError::Reserved(name.to_string()));
    }

    Ok(())
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.original).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_is_kept_but_not_significant() {
        let name = UserName::parse("  Vendedor_01  ").unwrap();
        assert_eq!(name.original(), "Vendedor_01");
        assert_eq!(name.canonical(), "vendedor_01");
        assert_eq!(name, UserName::from_db("Vendedor_01"));
    }

    #[test]
    fn test_full_width_input_is_normalized() {
        assert_eq!(UserName::parse("Ａna").unwrap().as_str(), "ana");
    }

    #[test]
    fn test_accepted_names() {
        for ok in ["admin", "abc", "ana.silva", "_ana_", "ana+loja", "joao-2", &"a".repeat(30)] {
            assert!(UserName::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejected_names() {
        let cases = [
            ("   ", UserNameError::Empty),
            ("ab", UserNameError::Length(2)),
            ("joão", UserNameError::InvalidCharacter('ã')),
            ("ana silva", UserNameError::InvalidCharacter(' ')),
            ("ana@loja", UserNameError::InvalidCharacter('@')),
            (".ana", UserNameError::InvalidEdge),
            ("ana-", UserNameError::InvalidEdge),
            ("ana..silva", UserNameError::ConsecutiveDots),
            ("___", UserNameError::NoAlphanumeric),
            ("Users", UserNameError::Reserved("users".to_string())),
        ];
        for (input, expected) in cases {
            assert_eq!(UserName::parse(input), Err(expected), "{input:?}");
        }
        assert_eq!(
            UserName::parse("a".repeat(31)),
            Err(UserNameError::Length(31))
        );
    }

    #[test]
    fn test_serde_keeps_original_case() {
        let name: UserName = serde_json::from_str(r#""  Ana.Silva ""#).unwrap();
        assert_eq!(name.canonical(), "ana.silva");
        assert_eq!(serde_json::to_string(&name).unwrap(), r#""Ana.Silva""#);
        assert!(serde_json::from_str::<UserName>(r#""a b""#).is_err());
    }
}
