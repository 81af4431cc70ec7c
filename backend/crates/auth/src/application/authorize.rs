//! Authorization Gate
//!
//! Pure per-request decisions over an already authenticated identity.
//! `admin` satisfies every requirement.

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Allow admins and any of the `allowed` groups
pub fn require_role(identity: &Identity, allowed: &[&str]) -> AuthResult<()> {
    if identity.role.satisfies(allowed) {
        Ok(())
    } else {
        tracing::debug!(
            account_id = %identity.account_id,
            role = %identity.role,
            ?allowed,
            "Role not permitted"
        );
        Err(AuthError::Forbidden)
    }
}

pub fn require_admin(identity: &Identity) -> AuthResult<()> {
    require_role(identity, &[UserRole::ADMIN])
}
