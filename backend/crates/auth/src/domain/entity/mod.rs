//! Entity Module

pub mod account;
pub mod group;
pub mod identity;
