//! Hooked Core - Fundamental types shared by every hooked crate
//!
//! This crate defines:
//! - Node identifiers inside a continuation tree (NodeId)
//! - Direction policies and the options merger (Policy, Overrides)
//! - Rejection reasons and error types (Reason, HookedError)

pub mod error;
pub mod id;
pub mod policy;

pub use error::*;
pub use id::*;
pub use policy::*;
