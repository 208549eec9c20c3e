//! Reversible change log

use bytes::Bytes;
use ember_primitives::{Address, H256, U256};

use crate::state::account::Account;

/// One reversible change, carrying what is needed to undo it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    /// Account created or replaced; `prev` is what the slot held before
    CreateAccount {
        /// Address
        address: Address,
        /// Previous account, `None` if it did not exist
        prev: Option<Box<Account>>,
    },
    /// Balance changed
    Balance {
        /// Address
        address: Address,
        /// Previous balance
        prev: U256,
    },
    /// Nonce changed
    Nonce {
        /// Address
        address: Address,
        /// Previous nonce
        prev: u64,
    },
    /// Code replaced
    Code {
        /// Address
        address: Address,
        /// Previous code
        prev_code: Bytes,
        /// Previous code hash
        prev_hash: H256,
    },
    /// Persistent storage slot written
    Storage {
        /// Address
        address: Address,
        /// Slot
        key: U256,
        /// Previous value
        prev: U256,
    },
    /// Transient storage slot written (EIP-1153)
    Transient {
        /// Address
        address: Address,
        /// Slot
        key: U256,
        /// Previous value
        prev: U256,
    },
    /// SELFDESTRUCT marked the account
    Suicide {
        /// Address
        address: Address,
        /// Previous flag
        prev_suicided: bool,
        /// Balance before it was zeroed
        prev_balance: U256,
    },
    /// Account touched for the first time this transaction
    Touched {
        /// Address
        address: Address,
    },
    /// Address warmed
    AccessListAdd {
        /// Address
        address: Address,
    },
    /// Storage slot warmed
    AccessListSlotAdd {
        /// Address
        address: Address,
        /// Slot
        key: U256,
    },
    /// Refund counter changed
    Refund {
        /// Previous counter
        prev: u64,
    },
    /// Log appended
    AddLog,
}

/// Ordered list of journal entries. A snapshot is the journal length.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Current snapshot id
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the journal is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return entries recorded after `snapshot`, newest first
    pub fn drain_after(&mut self, snapshot: usize) -> impl Iterator<Item = JournalEntry> {
        let tail = if snapshot < self.entries.len() {
            self.entries.split_off(snapshot)
        } else {
            Vec::new()
        };
        tail.into_iter().rev()
    }

    /// Entries, oldest first
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
