//! Flood - The directional propagation engine
//!
//! One call delivers a payload to the nodes selected by a [`Policy`]:
//!
//! 1. `local`: deliver on the node
//! 2. `upstream`: forward to the parent with [`Policy::toward_ancestors`]
//! 3. `downstream`: forward to each child with [`Policy::toward_descendants`]
//!
//! The walk runs on an explicit work stack but visits nodes in exactly the
//! order the recursive formulation would, including reading a node's child
//! list only after its upstream hop has finished.

use hooked_core::{NodeId, Policy};

use crate::Topology;

/// Outcome of one flood
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloodReport {
    /// Nodes reached by the walk
    pub visited: usize,
    /// Nodes whose local delivery succeeded
    pub delivered: usize,
    /// Nodes whose local delivery failed
    pub failed: usize,
}

enum Step {
    /// Deliver on a node and schedule its hops
    Visit(NodeId, Policy),
    /// Fan out to the children of a node
    Fan(NodeId, Policy),
}

/// Flood `origin` and its surroundings according to `policy`.
///
/// `deliver` runs once on every reached node that must deliver locally. When
/// it fails, `on_failure` receives the error and nothing is forwarded from
/// that node any more; work already scheduled for other branches still runs.
pub fn flood<G, E, D, F>(
    topology: &G,
    origin: NodeId,
    policy: Policy,
    mut deliver: D,
    mut on_failure: F,
) -> FloodReport
where
    G: Topology + ?Sized,
    D: FnMut(NodeId) -> Result<(), E>,
    F: FnMut(NodeId, E),
{
    let mut report = FloodReport::default();
    let mut stack = vec![Step::Visit(origin, policy)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(node, policy) => {
                report.visited += 1;
                tracing::trace!(node = %node, ?policy, "flood hop");

                if policy.local {
                    match deliver(node) {
                        Ok(()) => report.delivered += 1,
                        Err(err) => {
                            report.failed += 1;
                            on_failure(node, err);
                            continue;
                        }
                    }
                }

                // Pushed first so it runs after the whole upstream chain
                if policy.downstream {
                    stack.push(Step::Fan(node, policy.toward_descendants()));
                }
                if policy.upstream {
                    if let Some(parent) = topology.parent(node) {
                        stack.push(Step::Visit(parent, policy.toward_ancestors()));
                    }
                }
            }
            Step::Fan(node, policy) => {
                let children = topology.children(node);
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|child| Step::Visit(child, policy)),
                );
            }
        }
    }

    report
}
