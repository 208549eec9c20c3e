//! Per-transaction warm sets (EIP-2929)

use std::collections::{HashMap, HashSet};

use ember_primitives::{Address, U256};

/// Warm addresses and, per address, warm storage slots
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList {
    entries: HashMap<Address, HashSet<U256>>,
}

impl AccessList {
    /// Create an empty access list
    pub fn new() -> Self {
        Self::default()
    }

    /// Address is warm
    pub fn contains_address(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    /// (address warm, slot warm)
    pub fn contains_slot(&self, address: &Address, key: &U256) -> (bool, bool) {
        match self.entries.get(address) {
            Some(slots) => (true, slots.contains(key)),
            None => (false, false),
        }
    }

    /// Returns true when the address was newly added
    pub(crate) fn insert_address(&mut self, address: Address) -> bool {
        if self.entries.contains_key(&address) {
            return false;
        }
        self.entries.insert(address, HashSet::new());
        true
    }

    /// Returns (address newly added, slot newly added)
    pub(crate) fn insert_slot(&mut self, address: Address, key: U256) -> (bool, bool) {
        let address_added = self.insert_address(address);
        let slot_added = self.entries.entry(address).or_default().insert(key);
        (address_added, slot_added)
    }

    pub(crate) fn remove_address(&mut self, address: &Address) {
        self.entries.remove(address);
    }

    pub(crate) fn remove_slot(&mut self, address: &Address, key: &U256) {
        if let Some(slots) = self.entries.get_mut(address) {
            slots.remove(key);
        }
    }

    /// Number of warm addresses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no address is warm
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
