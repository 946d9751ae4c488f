//! Identity types for continuation trees
//!
//! A node is addressed by its slot in the tree arena. Identifiers are only
//! meaningful inside the tree that issued them.

use std::fmt;

/// Node identity - index of a node in its tree arena
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The first node of every tree
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`. A tree never holds that
    /// many nodes.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node index fits in u32"))
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == NodeId::ROOT
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(#{})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
