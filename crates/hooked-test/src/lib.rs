//! Hooked Test Harness - Scenario testing for hooked futures
//!
//! This crate provides:
//! - Listener call recording
//! - Gates for stepping async executors by hand
//! - Declarative continuation trees
//! - End-to-end scenarios for events, stores and node lifecycles

pub mod harness;
pub mod tree_builder;

pub use harness::*;
pub use tree_builder::*;

#[cfg(test)]
mod event_flow;
#[cfg(test)]
mod timed;
