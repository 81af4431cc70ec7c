//! Application Layer
//!
//! Use cases and application services.

pub mod accounts;
pub mod authorize;
pub mod bootstrap;
pub mod config;
pub mod login;
pub mod second_factor;
pub mod token;

// Re-exports
pub use accounts::{AccountsUseCase, CreateAccountInput, UpdateAccountInput};
pub use authorize::{require_admin, require_role};
pub use bootstrap::ensure_admin;
pub use config::AuthConfig;
pub use login::{DecoyDigest, LoginInput, LoginOutput, LoginUseCase};
pub use second_factor::{EnrollmentOutput, SecondFactorUseCase};
pub use token::{TokenRejection, TokenService};
