//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, AuthBackend};
pub use middleware::{ClientIp, RolePolicy, require_auth, require_roles};
pub use router::auth_router;
