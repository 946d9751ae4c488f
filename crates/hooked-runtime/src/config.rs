//! Tree configuration

use hooked_core::Policy;

/// Configuration shared by every node of one tree
#[derive(Clone, Debug)]
pub struct HookedConfig {
    /// Policy that caller overrides are merged over
    pub base_policy: Policy,
    /// How many late listener failures are retained for `drain_unhandled`
    pub unhandled_capacity: usize,
}

impl Default for HookedConfig {
    fn default() -> Self {
        HookedConfig {
            base_policy: Policy::LOCAL,
            unhandled_capacity: 32,
        }
    }
}

impl HookedConfig {
    pub fn with_base_policy(mut self, policy: Policy) -> Self {
        self.base_policy = policy;
        self
    }

    /// Zero keeps nothing; late failures are still logged
    pub fn with_unhandled_capacity(mut self, capacity: usize) -> Self {
        self.unhandled_capacity = capacity;
        self
    }
}
