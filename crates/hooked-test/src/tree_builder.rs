//! Declarative continuation trees
//!
//! Nodes are numbered in insertion order, the root being `0`.

use hooked_runtime::{Hooked, HookedConfig};
use serde_json::Value;

use crate::Recorder;

/// Shape of a continuation tree, built into live nodes by [`TreeBuilder::build`]
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    config: HookedConfig,
    parents: Vec<Option<usize>>,
}

impl TreeBuilder {
    /// A tree holding only the root
    pub fn new() -> Self {
        Self::with_config(HookedConfig::default())
    }

    pub fn with_config(config: HookedConfig) -> Self {
        TreeBuilder {
            config,
            parents: vec![None],
        }
    }

    /// Append a child of `parent`. Panics on an unknown parent.
    pub fn child(mut self, parent: usize) -> Self {
        assert!(parent < self.parents.len(), "unknown parent {}", parent);
        self.parents.push(Some(parent));
        self
    }

    /// Append `count` children of `parent`
    pub fn children(self, parent: usize, count: usize) -> Self {
        (0..count).fold(self, |builder, _| builder.child(parent))
    }

    /// A straight chain below the root
    pub fn chain(depth: usize) -> Self {
        (0..depth).fold(Self::new(), |builder, i| builder.child(i))
    }

    /// Node `i + 1` hangs off node `picks[i] % (i + 1)`
    pub fn random(picks: &[usize]) -> Self {
        picks
            .iter()
            .enumerate()
            .fold(Self::new(), |builder, (i, pick)| builder.child(pick % (i + 1)))
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    /// Strict ancestors of `node`, nearest first
    pub fn ancestors(&self, node: usize) -> Vec<usize> {
        std::iter::successors(self.parent(node), |&n| self.parent(n)).collect()
    }

    /// `node` and everything below it
    pub fn subtree(&self, node: usize) -> Vec<usize> {
        (0..self.len())
            .filter(|&n| n == node || self.ancestors(n).contains(&node))
            .collect()
    }

    /// Instantiate the tree with unit-valued nodes
    pub fn build<T: 'static>(&self) -> BuiltTree<T> {
        let mut nodes: Vec<Hooked<(), T>> = Vec::with_capacity(self.len());
        for parent in &self.parents {
            let node = match parent {
                None => Hooked::builder(self.config.clone()).empty(),
                Some(parent) => nodes[*parent].chain(),
            };
            nodes.push(node);
        }
        BuiltTree { nodes }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Live nodes of a built tree, indexed like the builder
pub struct BuiltTree<T = Value> {
    nodes: Vec<Hooked<(), T>>,
}

impl<T: Clone + 'static> BuiltTree<T> {
    pub fn node(&self, index: usize) -> &Hooked<(), T> {
        &self.nodes[index]
    }

    pub fn root(&self) -> &Hooked<(), T> {
        self.node(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hooked<(), T>> {
        self.nodes.iter()
    }

    /// Attach one recorder for `event` to every node
    pub fn record(&self, event: &str) -> Vec<Recorder<T>> {
        self.nodes
            .iter()
            .map(|node| {
                let recorder = Recorder::new();
                node.on(event, recorder.listener());
                recorder
            })
            .collect()
    }
}

/// Indices whose recorder has been called at least once
pub fn reached<T: Clone + 'static>(recorders: &[Recorder<T>]) -> Vec<usize> {
    recorders
        .iter()
        .enumerate()
        .filter(|(_, recorder)| !recorder.is_empty())
        .map(|(i, _)| i)
        .collect()
}
