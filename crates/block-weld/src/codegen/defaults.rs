//! Per-block defaults tables
//!
//! The registry is an explicit value threaded through the generators of one
//! run; nothing about it is global.

use crate::ir::DefaultDescriptor;
use std::collections::BTreeMap;

/// Defaults of every input, keyed by block id then slot name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsRegistry {
    blocks: BTreeMap<String, Vec<(String, DefaultDescriptor)>>,
}

impl DefaultsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block with an empty table
    ///
    /// Registering a block again clears its table.
    pub fn register_block(&mut self, block_id: impl Into<String>) {
        self.blocks.insert(block_id.into(), Vec::new());
    }

    /// Record the default of one input
    pub fn record(&mut self, block_id: &str, slot: impl Into<String>, default: DefaultDescriptor) {
        let slot = slot.into();
        let table = self.blocks.entry(block_id.to_string()).or_default();
        match table.iter_mut().find(|(s, _)| *s == slot) {
            Some(entry) => entry.1 = default,
            None => table.push((slot, default)),
        }
    }

    /// Look up the default of one input
    pub fn get(&self, block_id: &str, slot: &str) -> Option<&DefaultDescriptor> {
        self.blocks
            .get(block_id)?
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(_, d)| d)
    }

    /// The defaults table of a block, in input order
    pub fn table(&self, block_id: &str) -> Option<&[(String, DefaultDescriptor)]> {
        self.blocks.get(block_id).map(Vec::as_slice)
    }

    /// Whether a block has been registered
    pub fn contains_block(&self, block_id: &str) -> bool {
        self.blocks.contains_key(block_id)
    }

    /// Number of registered blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been registered
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
