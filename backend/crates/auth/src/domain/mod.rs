//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, group::Group, identity::Identity};
pub use repository::{CredentialStore, GroupStore};
