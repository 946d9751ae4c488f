//! Tree - The arena holding a continuation tree
//!
//! Nodes are addressed by [`NodeId`]. Parent links are plain identifiers, so
//! a child never owns its parent and the arena has no reference cycles.
//! Nodes are never removed: child lists only grow.

use std::cell::RefCell;

use hooked_core::NodeId;

/// Read access to the shape of a tree
pub trait Topology {
    /// Parent of a node, `None` for roots and unknown nodes
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of a node in creation order
    fn children(&self, node: NodeId) -> Vec<NodeId>;
}

#[derive(Debug, Clone)]
struct Slot<S> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    state: S,
}

/// Arena of nodes, each carrying a state `S`
#[derive(Debug, Clone)]
pub struct NodeTree<S> {
    slots: Vec<Slot<S>>,
}

impl<S> NodeTree<S> {
    /// Create an empty tree
    pub fn new() -> Self {
        NodeTree { slots: Vec::new() }
    }

    /// Add a node without a parent
    pub fn insert_root(&mut self, state: S) -> NodeId {
        self.push(None, state)
    }

    /// Add a node derived from `parent`, appended to its child list.
    ///
    /// Returns `None` when `parent` does not belong to this tree.
    pub fn insert_child(&mut self, parent: NodeId, state: S) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = self.push(Some(parent), state);
        self.slots[parent.index()].children.push(id);
        Some(id)
    }

    fn push(&mut self, parent: Option<NodeId>, state: S) -> NodeId {
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Slot {
            parent,
            children: Vec::new(),
            state,
        });
        id
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.slots.len()
    }

    pub fn get(&self, node: NodeId) -> Option<&S> {
        self.slots.get(node.index()).map(|slot| &slot.state)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut S> {
        self.slots.get_mut(node.index()).map(|slot| &mut slot.state)
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.slots.get(node.index()).and_then(|slot| slot.parent)
    }

    /// Children of a node in creation order
    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.slots
            .get(node.index())
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_, S> {
        Ancestors {
            tree: self,
            next: self.parent_of(node),
        }
    }

    /// Strict descendants in pre-order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children_of(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children_of(next).iter().rev());
        }
        out
    }

    /// Number of hops to the root
    pub fn depth(&self, node: NodeId) -> usize {
        self.ancestors(node).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &S)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (NodeId::from_index(index), &slot.state))
    }
}

impl<S> Default for NodeTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the strict ancestors of a node
pub struct Ancestors<'a, S> {
    tree: &'a NodeTree<S>,
    next: Option<NodeId>,
}

impl<S> Iterator for Ancestors<'_, S> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent_of(current);
        Some(current)
    }
}

impl<S> Topology for NodeTree<S> {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children_of(node).to_vec()
    }
}

/// Shared trees are read with one short borrow per query, so delivery
/// callbacks are free to mutate the tree between hops.
impl<G: Topology> Topology for RefCell<G> {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.borrow().parent(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.borrow().children(node)
    }
}
