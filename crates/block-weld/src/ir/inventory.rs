//! Compile-time inventory of host action sets
//!
//! Action sets can be registered from any crate with [`register_actions!`]
//! and collected at generation time through the `linkme` distributed slice.
//! The slice is read-only, so separate generation runs never share state.

use crate::ir::{ActionSet, HostActions};

/// Distributed slice for collecting host action sets at compile time
#[linkme::distributed_slice]
pub static HOST_ACTIONS: [fn() -> HostActions];

/// Collect all registered action sets from the distributed slice
pub fn collect_host_actions() -> Vec<HostActions> {
    HOST_ACTIONS.iter().map(|f| f()).collect()
}

/// Registry for collecting action sets by hand (alternative to linkme)
#[derive(Debug, Default)]
pub struct ActionRegistry {
    hosts: Vec<HostActions>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from the distributed slice
    pub fn from_inventory() -> Self {
        Self {
            hosts: collect_host_actions(),
        }
    }

    /// Register an action set
    pub fn register(&mut self, host: HostActions) {
        self.hosts.push(host);
    }

    /// Register a type implementing [`ActionSet`]
    pub fn register_set<A: ActionSet>(&mut self) {
        self.hosts.push(A::host_actions());
    }

    /// Look up an action set by host name
    pub fn get(&self, name: &str) -> Option<&HostActions> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Get all registered action sets
    pub fn hosts(&self) -> &[HostActions] {
        &self.hosts
    }

    /// Take ownership of the action sets
    pub fn into_hosts(self) -> Vec<HostActions> {
        self.hosts
    }
}

/// Register an [`ActionSet`] type in the distributed slice
///
/// ```ignore
/// block_weld::register_actions!(MockActions);
/// ```
#[macro_export]
macro_rules! register_actions {
    ($ty:ty) => {
        const _: () = {
            #[$crate::linkme::distributed_slice($crate::ir::HOST_ACTIONS)]
            #[linkme(crate = $crate::linkme)]
            static _BLOCK_WELD_ACTIONS: fn() -> $crate::ir::HostActions =
                <$ty as $crate::ir::ActionSet>::host_actions;
        };
    };
}
