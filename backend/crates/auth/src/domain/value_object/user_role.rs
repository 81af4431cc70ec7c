use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const ROLE_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRoleError {
    #[error("Role cannot be empty")]
    Empty,

    #[error("Role is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Invalid character '{0}' in role. Only a-z, 0-9, _ and - are allowed")]
    InvalidCharacter(char),
}

/// Role carried by an account and by its session tokens.
///
/// `admin` overrides every authorization check; any other value is the
/// code of the group the account belongs to (`vendedor`, `gerencia`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserRole(String);

impl UserRole {
    pub const ADMIN: &'static str = "admin";

    pub fn parse(code: impl AsRef<str>) -> Result<Self, UserRoleError> {
        let code = code.as_ref().trim().to_lowercase();
        if code.is_empty() {
            return Err(UserRoleError::Empty);
        }
        let length = code.chars().count();
        if length > ROLE_MAX_LENGTH {
            return Err(UserRoleError::TooLong {
                length,
                max: ROLE_MAX_LENGTH,
            });
        }
        if let Some(c) = code
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
        {
            return Err(UserRoleError::InvalidCharacter(c));
        }
        Ok(Self(code))
    }

    /// Rebuild from a stored value; the row was validated on insert.
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[inline]
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    /// Admins satisfy every requirement; others must match one of `allowed`.
    pub fn satisfies(&self, allowed: &[&str]) -> bool {
        self.is_admin() || allowed.iter().any(|role| *role == self.0)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserRole {
    type Error = UserRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.0
    }
}
