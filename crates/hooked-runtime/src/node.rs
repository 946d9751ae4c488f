//! Node - one slot of a continuation tree and the tree that holds them
//!
//! The tree lives behind `Rc<RefCell<..>>`. Borrows are kept short: nothing
//! holds a borrow while user code (listeners, executors, handlers) runs, so
//! user code may freely re-enter the tree.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use serde::de::DeserializeOwned;
use serde_json::Value;

use hooked_core::{HookedResult, NodeId, Policy, Reason, UnhandledFailure};
use hooked_propagation::{NodeTree, Topology};
use hooked_state::{Listener, Listeners, Store};

use crate::HookedConfig;

/// Settlement state of a node's future, as seen by the event channel
enum Settlement {
    /// Still pending; a listener failure rejects through the sender
    Pending(Option<oneshot::Sender<Reason>>),
    /// Fulfilled or rejected
    Settled,
}

/// Everything one node carries
pub struct NodeState<T> {
    pub listeners: Listeners<T>,
    pub store: Store,
    settlement: Settlement,
}

impl<T> NodeState<T> {
    fn pending(failures: oneshot::Sender<Reason>) -> Self {
        NodeState {
            listeners: Listeners::new(),
            store: Store::new(),
            settlement: Settlement::Pending(Some(failures)),
        }
    }

    /// Whether the node's outcome is decided, including a pending
    /// rejection not yet observed by its future
    pub fn is_settled(&self) -> bool {
        !matches!(self.settlement, Settlement::Pending(Some(_)))
    }
}

/// A continuation tree
pub struct Tree<T> {
    nodes: NodeTree<NodeState<T>>,
    config: HookedConfig,
    unhandled: VecDeque<UnhandledFailure>,
}

/// Shared handle to a continuation tree
pub struct TreeHandle<T> {
    inner: Rc<RefCell<Tree<T>>>,
}

impl<T> Clone for TreeHandle<T> {
    fn clone(&self) -> Self {
        TreeHandle {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> TreeHandle<T> {
    pub fn new(config: HookedConfig) -> Self {
        TreeHandle {
            inner: Rc::new(RefCell::new(Tree {
                nodes: NodeTree::new(),
                config,
                unhandled: VecDeque::new(),
            })),
        }
    }

    /// Add a root node. The receiver yields the first listener failure.
    pub fn insert_root(&self) -> (NodeId, oneshot::Receiver<Reason>) {
        let (tx, rx) = oneshot::channel();
        let id = self.inner.borrow_mut().nodes.insert_root(NodeState::pending(tx));
        tracing::debug!(node = %id, "root node created");
        (id, rx)
    }

    /// Add a child to `parent`. The receiver yields the first listener failure.
    pub fn insert_child(&self, parent: NodeId) -> (NodeId, oneshot::Receiver<Reason>) {
        let (tx, rx) = oneshot::channel();
        let id = self
            .inner
            .borrow_mut()
            .nodes
            .insert_child(parent, NodeState::pending(tx))
            .expect("parent node belongs to this tree");
        tracing::debug!(parent = %parent, node = %id, "child node derived");
        (id, rx)
    }

    /// Record that a node's future has settled.
    ///
    /// Returns `false` when the node was already settled or already
    /// rejected by a listener failure.
    pub fn mark_settled(&self, node: NodeId) -> bool {
        let previous = match self.inner.borrow_mut().nodes.get_mut(node) {
            Some(state) => std::mem::replace(&mut state.settlement, Settlement::Settled),
            None => return false,
        };
        tracing::trace!(node = %node, "node settled");
        matches!(previous, Settlement::Pending(Some(_)))
    }

    pub fn is_settled(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .map(NodeState::is_settled)
            .unwrap_or(true)
    }

    /// Turn a listener failure into a rejection of `node`.
    ///
    /// Only the first failure of a pending node rejects it. Anything later,
    /// or anything on a settled node, is reported as unhandled.
    pub fn fail(&self, node: NodeId, event: &str, reason: Reason) {
        let sender = match self.inner.borrow_mut().nodes.get_mut(node) {
            Some(NodeState {
                settlement: Settlement::Pending(sender),
                ..
            }) => sender.take(),
            _ => None,
        };

        let reason = match sender {
            Some(sender) => match sender.send(reason) {
                Ok(()) => {
                    tracing::debug!(node = %node, event, "listener failure rejects node");
                    return;
                }
                // The node's future is gone, nobody can observe the rejection
                Err(reason) => reason,
            },
            None => reason,
        };

        self.unhandled(UnhandledFailure {
            node,
            event: event.to_string(),
            reason,
        });
    }

    fn unhandled(&self, failure: UnhandledFailure) {
        tracing::warn!(
            node = %failure.node,
            event = %failure.event,
            reason = %failure.reason,
            "listener failed after its node settled"
        );

        let mut tree = self.inner.borrow_mut();
        let capacity = tree.config.unhandled_capacity;
        if capacity == 0 {
            return;
        }
        while tree.unhandled.len() >= capacity {
            tree.unhandled.pop_front();
        }
        tree.unhandled.push_back(failure);
    }

    /// Take every retained late failure, oldest first
    pub fn drain_unhandled(&self) -> Vec<UnhandledFailure> {
        self.inner.borrow_mut().unhandled.drain(..).collect()
    }

    pub fn base_policy(&self) -> Policy {
        self.inner.borrow().config.base_policy
    }

    pub fn config(&self) -> HookedConfig {
        self.inner.borrow().config.clone()
    }

    pub fn add_listener(&self, node: NodeId, event: &str, listener: Listener<T>) {
        if let Some(state) = self.inner.borrow_mut().nodes.get_mut(node) {
            state.listeners.add(event, listener);
        }
    }

    /// Detached copy of a node's listeners for `event`
    pub fn listeners(&self, node: NodeId, event: &str) -> Vec<Listener<T>> {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .map(|state| state.listeners.snapshot(event))
            .unwrap_or_default()
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .map(|state| state.listeners.count(event))
            .unwrap_or(0)
    }

    pub fn write(&self, node: NodeId, key: &str, value: Value) {
        if let Some(state) = self.inner.borrow_mut().nodes.get_mut(node) {
            state.store.set(key, value);
        }
    }

    pub fn read(&self, node: NodeId, key: &str) -> Option<Value> {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .and_then(|state| state.store.get(key).cloned())
    }

    pub fn read_as<D: DeserializeOwned>(&self, node: NodeId, key: &str) -> HookedResult<Option<D>> {
        match self.inner.borrow().nodes.get(node) {
            Some(state) => state.store.get_as(key),
            None => Ok(None),
        }
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.parent_of(node)
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().nodes.children_of(node).to_vec()
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().nodes.is_empty()
    }

    pub fn same_tree(&self, other: &TreeHandle<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakTreeHandle<T> {
        WeakTreeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning handle, for callbacks that must not keep a tree alive
pub struct WeakTreeHandle<T> {
    inner: Weak<RefCell<Tree<T>>>,
}

impl<T> WeakTreeHandle<T> {
    pub fn upgrade(&self) -> Option<TreeHandle<T>> {
        self.inner.upgrade().map(|inner| TreeHandle { inner })
    }
}

impl<T> Clone for WeakTreeHandle<T> {
    fn clone(&self) -> Self {
        WeakTreeHandle {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> Topology for TreeHandle<T> {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children_of(node)
    }
}
