//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Accounts, value objects, credential store traits
//! - `application/` - Login, second factor, token and account use cases
//! - `infra/` - PostgreSQL and SQLite credential stores
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Username + password login issuing stateless HS256 bearer tokens
//! - Optional TOTP second factor (Google Authenticator compatible)
//! - Role gating where `admin` overrides every group requirement
//! - Admin user management and optional self-service signup
//!
//! ## Security Model
//! - Passwords hashed with bcrypt (Argon2id hashes accepted and upgraded)
//! - Unknown users and wrong passwords fail identically
//! - Every token rejection reason collapses to one client-visible error
//! - No revocation: a token stays valid until it expires

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::bootstrap::{BOOTSTRAP_USER_NAME, ensure_admin};
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{PgCredentialStore, SqliteCredentialStore};
pub use presentation::handlers::{AuthAppState, AuthBackend};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
