//! Hooks - the capability bundle of one node

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use hooked_core::{HookedResult, NodeId, Overrides};
use hooked_propagation::FloodReport;
use hooked_state::{Listener, ListenerResult};

use crate::{channel, values, Signal, TreeHandle};

/// Event and store operations scoped to one node.
///
/// Handed to executors and continuation handlers, and exposed by every
/// [`Hooked`](crate::Hooked). Cloning yields another handle to the same node.
pub struct Hooks<T = Value> {
    tree: TreeHandle<T>,
    node: NodeId,
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Hooks {
            tree: self.tree.clone(),
            node: self.node,
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("node", &self.node).finish()
    }
}

impl<T> Hooks<T> {
    pub fn new(tree: TreeHandle<T>, node: NodeId) -> Self {
        Hooks { tree, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tree(&self) -> &TreeHandle<T> {
        &self.tree
    }
}

impl<T: 'static> Hooks<T> {

    // ---- Event channel ----

    /// Register a listener for `event` on this node
    pub fn on<F, R>(&self, event: &str, listener: F) -> &Self
    where
        F: Fn(Option<&T>) -> R + 'static,
        R: ListenerResult,
    {
        self.add_listener(event, Listener::new(listener))
    }

    /// Register an already built listener
    pub fn add_listener(&self, event: &str, listener: Listener<T>) -> &Self {
        self.tree.add_listener(self.node, event, listener);
        tracing::trace!(node = %self.node, event, "listener registered");
        self
    }

    /// Register a dynamically typed candidate.
    ///
    /// Fails with `InvalidListener` unless the candidate is a [`Listener<T>`],
    /// either directly or inside a `Box<dyn Any>`.
    pub fn try_on<C: Any>(&self, event: &str, candidate: C) -> HookedResult<&Self> {
        let listener = Listener::coerce(event, candidate)?;
        Ok(self.add_listener(event, listener))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.tree.listener_count(self.node, event)
    }

    /// Deliver `event` on this node only
    pub fn event(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.event_with(event, value, Overrides::new())
    }

    pub fn event_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.fire(Signal::Event, event, value.into(), overrides)
    }

    /// Deliver `event` on this node and its descendants
    pub fn emit(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.emit_with(event, value, Overrides::new())
    }

    pub fn emit_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.fire(Signal::Emit, event, value.into(), overrides)
    }

    /// Deliver `event` on this node, its ancestors and its descendants
    pub fn broadcast(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.broadcast_with(event, value, Overrides::new())
    }

    pub fn broadcast_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.fire(Signal::Broadcast, event, value.into(), overrides)
    }

    fn fire(
        &self,
        signal: Signal,
        event: &str,
        value: Option<T>,
        overrides: Overrides,
    ) -> FloodReport {
        channel::fire(&self.tree, self.node, signal, event, value.as_ref(), overrides)
    }

    // ---- Store ----

    /// Write `value` at the dotted path `key` on this node
    pub fn set(&self, key: &str, value: impl Into<Value>) -> FloodReport {
        self.set_with(key, value, Overrides::new())
    }

    pub fn set_with(&self, key: &str, value: impl Into<Value>, overrides: Overrides) -> FloodReport {
        values::write(&self.tree, self.node, key, &value.into(), overrides)
    }

    /// Read the dotted path `key` from this node's own store
    pub fn get(&self, key: &str) -> Option<Value> {
        self.tree.read(self.node, key)
    }

    /// Like [`get`](Self::get), falling back to `default` without storing it
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    pub fn get_as<D: DeserializeOwned>(&self, key: &str) -> HookedResult<Option<D>> {
        self.tree.read_as(self.node, key)
    }
}
