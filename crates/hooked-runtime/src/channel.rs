//! Event channel - deliver a named event to the listeners of a tree

use std::fmt;

use hooked_core::{NodeId, Overrides};
use hooked_propagation::{flood, FloodReport};
use hooked_state::dispatch;

use crate::TreeHandle;

/// The three ways of raising an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Local by default
    Event,
    /// Toward descendants by default
    Emit,
    /// Toward ancestors and descendants by default
    Broadcast,
}

impl Signal {
    /// Apply this signal's directional defaults to caller overrides.
    ///
    /// Explicit caller values always win.
    pub fn overrides(self, overrides: Overrides) -> Overrides {
        match self {
            Signal::Event => overrides,
            Signal::Emit => overrides.or_downstream(true),
            Signal::Broadcast => overrides.or_upstream(true).or_downstream(true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Event => "event",
            Signal::Emit => "emit",
            Signal::Broadcast => "broadcast",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raise `event` at `origin`.
///
/// Every reached node calls its listeners in registration order. The first
/// failing listener stops delivery on that node, rejects the node and cuts
/// propagation from there.
pub fn fire<T>(
    tree: &TreeHandle<T>,
    origin: NodeId,
    signal: Signal,
    event: &str,
    value: Option<&T>,
    overrides: Overrides,
) -> FloodReport {
    let policy = tree.base_policy().merge(signal.overrides(overrides));

    let report = flood(
        tree,
        origin,
        policy,
        |node| dispatch(&tree.listeners(node, event), value),
        |node, reason| tree.fail(node, event, reason),
    );

    tracing::trace!(
        origin = %origin,
        %signal,
        event,
        delivered = report.delivered,
        failed = report.failed,
        "event delivered"
    );
    report
}
