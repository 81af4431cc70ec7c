//! Value Object Module

pub mod password;
pub mod totp_secret;
pub mod user_name;
pub mod user_role;

pub use password::{PasswordDigest, RawPassword};
pub use totp_secret::{TotpSecret, TotpSecretError};
pub use user_name::{UserName, UserNameError};
pub use user_role::{UserRole, UserRoleError};
