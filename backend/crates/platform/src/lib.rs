//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (bcrypt with tunable cost, Argon2id accepted)
//! - Password policy for newly chosen passwords
//! - Bearer token extraction from `Authorization` headers
//! - Client IP resolution for audit logging
//! - Secure random bytes

pub mod bearer;
pub mod client;
pub mod crypto;
pub mod password;
