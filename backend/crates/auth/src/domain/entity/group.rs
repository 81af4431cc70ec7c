//! Group Entity
//!
//! Groups are seeded by migration; accounts reference one through their role.

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Code stored in `Account::role`
    pub name: UserRole,
    pub display_name: String,
}
