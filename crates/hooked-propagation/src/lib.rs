//! Hooked Propagation
//!
//! Signals travel along a continuation tree. Every node is derived from at
//! most one parent, and every continuation call on a node appends a child.
//!
//! # Directions
//!
//! - Local: deliver on the issuing node
//! - Upstream: walk toward the root, one parent at a time
//! - Downstream: fan out to every child, then to theirs
//!
//! # Echo suppression
//!
//! A hop toward the parent never turns back downstream, and a hop toward a
//! child never turns back upstream. Each reached node delivers exactly once and
//! no flood can loop, whatever the shape of the tree.

pub mod flood;
pub mod tree;

pub use flood::*;
pub use tree::*;
