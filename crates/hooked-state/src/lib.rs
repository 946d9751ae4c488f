//! Hooked State - What every node of a continuation tree carries
//!
//! This crate implements the per-node halves of the two capabilities:
//! - Listener registry for the event channel
//! - Dotted-path key-value store
//!
//! Neither knows about trees. Propagation across nodes lives in
//! `hooked-propagation`, wiring to futures in `hooked-runtime`.

pub mod listeners;
pub mod store;

pub use listeners::*;
pub use store::*;
