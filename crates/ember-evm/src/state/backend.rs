//! Persistence port consulted for accounts not yet in the journaled state

use std::collections::HashMap;

use ember_primitives::{Address, H256, U256};

use crate::error::StateError;
use crate::state::account::AccountInfo;

/// Read-only state source
///
/// Called synchronously from inside the interpreter; implementations may
/// block.
pub trait StateBackend {
    /// Account at `address`, `None` if it does not exist
    fn get_account(&self, address: &Address) -> Result<Option<AccountInfo>, StateError>;

    /// Storage value, zero if absent
    fn get_storage(&self, address: &Address, key: &U256) -> Result<U256, StateError>;

    /// Root of the committed state trie this backend reads, if it is one
    fn trie_root(&self) -> Option<H256> {
        None
    }

    /// Trie node or code preimage under `hash`. Only meaningful when
    /// [`StateBackend::trie_root`] is `Some`.
    fn trie_node(&self, _hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(None)
    }
}

/// Hash-map backed [`StateBackend`]
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    accounts: HashMap<Address, AccountInfo>,
    storage: HashMap<(Address, U256), U256>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account
    pub fn insert_account(&mut self, address: Address, info: AccountInfo) {
        self.accounts.insert(address, info);
    }

    /// Set a storage value
    pub fn insert_storage(&mut self, address: Address, key: U256, value: U256) {
        self.storage.insert((address, key), value);
    }
}

impl StateBackend for MemoryBackend {
    fn get_account(&self, address: &Address) -> Result<Option<AccountInfo>, StateError> {
        Ok(self.accounts.get(address).cloned())
    }

    fn get_storage(&self, address: &Address, key: &U256) -> Result<U256, StateError> {
        Ok(self
            .storage
            .get(&(*address, *key))
            .copied()
            .unwrap_or_default())
    }
}
