//! Direction policies
//!
//! Every event or store write is governed by a resolved [`Policy`]: deliver on
//! the issuing node, forward toward its ancestors, forward toward its
//! descendants. Callers pass partial [`Overrides`] which are merged field by
//! field over a base policy.

/// Resolved direction policy for one propagation call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Policy {
    /// Deliver on the node itself
    pub local: bool,
    /// Forward to the parent node
    pub upstream: bool,
    /// Forward to every child node
    pub downstream: bool,
}

impl Policy {
    /// Deliver locally only. The default for `event` and `set`.
    pub const LOCAL: Policy = Policy {
        local: true,
        upstream: false,
        downstream: false,
    };

    /// Deliver nowhere
    pub const SILENT: Policy = Policy {
        local: false,
        upstream: false,
        downstream: false,
    };

    /// Deliver everywhere reachable
    pub const FLOOD: Policy = Policy {
        local: true,
        upstream: true,
        downstream: true,
    };

    pub const fn new(local: bool, upstream: bool, downstream: bool) -> Self {
        Policy {
            local,
            upstream,
            downstream,
        }
    }

    /// Resolve caller overrides against this policy, field by field
    pub fn merge(self, overrides: Overrides) -> Policy {
        Policy {
            local: overrides.local.unwrap_or(self.local),
            upstream: overrides.upstream.unwrap_or(self.upstream),
            downstream: overrides.downstream.unwrap_or(self.downstream),
        }
    }

    /// Policy carried by the hop to the parent.
    ///
    /// The hop never turns back downstream, otherwise the signal would echo
    /// into the subtree it came from.
    pub fn toward_ancestors(self) -> Policy {
        Policy {
            local: true,
            upstream: self.upstream,
            downstream: false,
        }
    }

    /// Policy carried by the hop to each child. Never turns back upstream.
    pub fn toward_descendants(self) -> Policy {
        Policy {
            local: true,
            upstream: false,
            downstream: self.downstream,
        }
    }

    /// Does this policy reach any node at all?
    pub fn is_silent(self) -> bool {
        !(self.local || self.upstream || self.downstream)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::LOCAL
    }
}

/// Partial direction policy supplied by a caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Overrides {
    pub local: Option<bool>,
    pub upstream: Option<bool>,
    pub downstream: Option<bool>,
}

impl Overrides {
    /// No overrides - the base policy applies unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Every direction switched off
    pub fn silent() -> Self {
        Overrides::from(Policy::SILENT)
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = Some(local);
        self
    }

    pub fn with_upstream(mut self, upstream: bool) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_downstream(mut self, downstream: bool) -> Self {
        self.downstream = Some(downstream);
        self
    }

    /// Fill `upstream` unless the caller set it explicitly
    pub fn or_upstream(mut self, upstream: bool) -> Self {
        self.upstream.get_or_insert(upstream);
        self
    }

    /// Fill `downstream` unless the caller set it explicitly
    pub fn or_downstream(mut self, downstream: bool) -> Self {
        self.downstream.get_or_insert(downstream);
        self
    }
}

impl From<Policy> for Overrides {
    fn from(policy: Policy) -> Self {
        Overrides {
            local: Some(policy.local),
            upstream: Some(policy.upstream),
            downstream: Some(policy.downstream),
        }
    }
}
