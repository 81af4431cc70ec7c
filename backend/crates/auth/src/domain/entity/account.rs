//! Account Entity
//!
//! One record per login: credentials, role and the optional second factor.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::value_object::{
    password::PasswordDigest, totp_secret::TotpSecret, user_name::UserName, user_role::UserRole,
};

/// Account entity
///
/// `totp_secret` is present exactly when the second factor is enabled.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Unique (case-insensitively) login handle
    pub user_name: UserName,
    pub full_name: Option<String>,
    /// `admin` or a group code
    pub role: UserRole,
    pub password: PasswordDigest,
    pub totp_secret: Option<TotpSecret>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_name: UserName,
        full_name: Option<String>,
        role: UserRole,
        password: PasswordDigest,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            user_name,
            full_name: normalize_full_name(full_name),
            role,
            password,
            totp_secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[inline]
    pub fn second_factor_enabled(&self) -> bool {
        self.totp_secret.is_some()
    }

    pub fn set_user_name(&mut self, user_name: UserName) {
        self.user_name = user_name;
        self.updated_at = Utc::now();
    }

    /// Blank names are stored as absent
    pub fn set_full_name(&mut self, full_name: Option<String>) {
        self.full_name = normalize_full_name(full_name);
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_password(&mut self, password: PasswordDigest) {
        self.password = password;
        self.updated_at = Utc::now();
    }
}

fn normalize_full_name(full_name: Option<String>) -> Option<String> {
    full_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
