//! Scoped writes into the per-node stores

use std::convert::Infallible;

use serde_json::Value;

use hooked_core::{NodeId, Overrides};
use hooked_propagation::{flood, FloodReport};

use crate::TreeHandle;

/// Write `value` at `key` on every node the merged policy reaches.
///
/// Each node receives its own copy.
pub fn write<T>(
    tree: &TreeHandle<T>,
    origin: NodeId,
    key: &str,
    value: &Value,
    overrides: Overrides,
) -> FloodReport {
    let policy = tree.base_policy().merge(overrides);

    let report = flood(
        tree,
        origin,
        policy,
        |node| {
            tree.write(node, key, value.clone());
            Ok::<(), Infallible>(())
        },
        |_, never| match never {},
    );

    tracing::trace!(origin = %origin, key, written = report.delivered, "value stored");
    report
}
