//! Hooked Runtime - Futures that talk along their continuation tree
//!
//! A [`Hooked`] wraps one future and owns one node of a continuation tree.
//! Every `then`/`catch`/`finally` derives a child node. Each node carries:
//! 1. An event channel (`on`, `event`, `emit`, `broadcast`)
//! 2. A dotted-path key-value store (`set`, `get`)
//!
//! Executors and continuation handlers receive [`Hooks`] bound to their own
//! node, so a signal raised inside a handler starts from the child and may
//! travel up to the parent and down to the child's own descendants.
//!
//! ```no_run
//! use hooked_runtime::Hooked;
//!
//! let job = Hooked::<&str, u32>::from_task(|hooks| async move {
//!     hooks.emit("progress", 50u32);
//!     Ok("done")
//! });
//! job.on("progress", |pct: Option<&u32>| println!("{:?}%", pct));
//! ```

pub mod channel;
pub mod config;
pub mod hooked;
pub mod hooks;
pub mod node;
pub mod settle;
pub mod values;

pub use channel::*;
pub use config::*;
pub use hooked::*;
pub use hooks::*;
pub use node::*;
pub use settle::*;

pub use hooked_core::{
    HookedError, HookedResult, NodeId, Overrides, Policy, Reason, UnhandledFailure,
};
pub use hooked_propagation::FloodReport;
pub use hooked_state::{Listener, ListenerResult};
