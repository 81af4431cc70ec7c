//! Authenticated Identity
//!
//! What a verified session token says about the caller. Attached to the
//! request by the authentication middleware.

use kernel::id::AccountId;

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub user_name: String,
    pub role: UserRole,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds; the token is valid while `now < expires_at`
    pub expires_at: i64,
}

impl Identity {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
