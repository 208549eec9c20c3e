//! Account record held by the journaled state

use std::collections::HashMap;

use bytes::Bytes;
use ember_crypto::{keccak256, KECCAK_EMPTY};
use ember_primitives::{H256, U256};

/// Storage slot with its value at transaction start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageSlot {
    /// Committed value at the start of the current transaction
    pub original: U256,
    /// Current value
    pub present: U256,
}

impl StorageSlot {
    /// Slot whose original and present values are both `value`
    pub fn new(value: U256) -> Self {
        Self {
            original: value,
            present: value,
        }
    }
}

/// Account data as served by a state backend
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountInfo {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: U256,
    /// Deployed code
    pub code: Bytes,
}

/// One account in the journaled state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: U256,
    /// Deployed code
    pub code: Bytes,
    /// keccak256 of `code`, `KECCAK_EMPTY` when there is none
    pub code_hash: H256,
    /// Storage slots loaded or written so far
    pub storage: HashMap<U256, StorageSlot>,
    /// Storage starts empty: absent slots are zero and never read from the
    /// backend. Set for accounts created in memory.
    pub fresh_storage: bool,
    /// SELFDESTRUCT executed this transaction
    pub suicided: bool,
    /// Created by CREATE/CREATE2 this transaction (EIP-6780)
    pub created: bool,
    /// Touched this transaction (EIP-161)
    pub touched: bool,
}

impl Account {
    /// Create a new empty account
    pub fn new() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            code: Bytes::new(),
            code_hash: KECCAK_EMPTY,
            storage: HashMap::new(),
            fresh_storage: true,
            suicided: false,
            created: false,
            touched: false,
        }
    }

    /// Account loaded from a backend; storage is read through on demand
    pub fn from_info(info: AccountInfo) -> Self {
        let mut account = Self::new()
            .with_nonce(info.nonce)
            .with_balance(info.balance)
            .with_code(info.code);
        account.fresh_storage = false;
        account
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the balance
    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    /// Set the code and its hash
    pub fn with_code(mut self, code: impl Into<Bytes>) -> Self {
        self.set_code(code.into());
        self
    }

    /// Seed committed storage. Zero values are dropped.
    pub fn with_storage(mut self, slots: impl IntoIterator<Item = (U256, U256)>) -> Self {
        for (key, value) in slots {
            if !value.is_zero() {
                self.storage.insert(key, StorageSlot::new(value));
            }
        }
        self
    }

    pub(crate) fn set_code(&mut self, code: Bytes) {
        self.code_hash = if code.is_empty() {
            KECCAK_EMPTY
        } else {
            keccak256(&code)
        };
        self.code = code;
    }

    /// Empty per EIP-161: zero nonce, zero balance, no code
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code_hash == KECCAK_EMPTY
    }

    /// Check if account has code
    pub fn has_code(&self) -> bool {
        self.code_hash != KECCAK_EMPTY
    }

    /// Current non-zero storage values, unordered
    pub fn storage_values(&self) -> impl Iterator<Item = (U256, U256)> + '_ {
        self.storage
            .iter()
            .filter(|(_, slot)| !slot.present.is_zero())
            .map(|(key, slot)| (*key, slot.present))
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}
