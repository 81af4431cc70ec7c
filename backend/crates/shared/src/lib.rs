//! Shared Kernel
//!
//! The small vocabulary every crate in the workspace agrees on:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP classification
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is identical across the whole backend belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
