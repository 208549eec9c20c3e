//! Secure-trie world state

use bytes::Bytes;
use ember_crypto::{keccak256, KECCAK_EMPTY};
use ember_evm::{AccountInfo, JournaledState, StateBackend, StateError};
use ember_primitives::{Address, H256, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use tracing::debug;

use crate::error::{TrieError, TrieResult};
use crate::store::{MemoryNodeStore, NodeStore};
use crate::trie::{read, Trie};
use crate::EMPTY_ROOT;

/// Account leaf of the state trie
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrieAccount {
    /// Nonce
    pub nonce: u64,
    /// Balance in wei
    pub balance: U256,
    /// Root of the account's storage trie
    pub storage_root: H256,
    /// Keccak-256 of the code
    pub code_hash: H256,
}

impl Default for TrieAccount {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            storage_root: EMPTY_ROOT,
            code_hash: KECCAK_EMPTY,
        }
    }
}

impl Encodable for TrieAccount {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.nonce);
        s.append(&self.balance);
        s.append(&self.storage_root);
        s.append(&self.code_hash);
    }
}

impl Decodable for TrieAccount {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            nonce: rlp.val_at(0)?,
            balance: rlp.val_at(1)?,
            storage_root: rlp.val_at(2)?,
            code_hash: rlp.val_at(3)?,
        })
    }
}

fn slot_key(key: &U256) -> H256 {
    keccak256(H256::from_word(*key).as_bytes())
}

/// Write every cached account of `state` into `store` and return the state
/// root. Accounts the state never loaded are not included; use
/// [`commit_onto`] for a state reading through a trie.
pub fn commit_state<S: NodeStore>(state: &JournaledState, store: &mut S) -> TrieResult<H256> {
    commit_onto(state, store, EMPTY_ROOT)
}

/// Apply the cached accounts and slots of `state` to the state trie under
/// `base` and return the new root. Accounts cached as absent are removed;
/// zero slots are deleted. `store` must hold the nodes of `base`.
pub fn commit_onto<S: NodeStore>(state: &JournaledState, store: &mut S, base: H256) -> TrieResult<H256> {
    let mut leaves = Vec::new();
    for (address, account) in state.accounts() {
        let key = keccak256(address.as_bytes());
        let storage_base = if account.fresh_storage {
            EMPTY_ROOT
        } else {
            match read(&*store, &base, key.as_bytes())? {
                Some(bytes) => rlp::decode::<TrieAccount>(&bytes)?.storage_root,
                None => EMPTY_ROOT,
            }
        };

        let mut storage = Trie::open(storage_base, &mut *store);
        for (slot, value) in &account.storage {
            let encoded = if value.present.is_zero() {
                Vec::new()
            } else {
                rlp::encode(&value.present).to_vec()
            };
            storage.insert(slot_key(slot).as_bytes(), encoded)?;
        }
        let storage_root = storage.commit()?;

        if account.has_code() {
            store.put(account.code_hash, account.code.to_vec())?;
        }
        let leaf = TrieAccount {
            nonce: account.nonce,
            balance: account.balance,
            storage_root,
            code_hash: account.code_hash,
        };
        leaves.push((key, rlp::encode(&leaf).to_vec()));
    }
    for address in state.absent_addresses() {
        leaves.push((keccak256(address.as_bytes()), Vec::new()));
    }

    let mut trie = Trie::open(base, store);
    let updated = leaves.len();
    for (key, value) in leaves {
        trie.insert(key.as_bytes(), value)?;
    }
    let root = trie.commit()?;
    debug!(%base, %root, updated, "state committed");
    Ok(root)
}

/// [`StateBackend`] reading a committed state trie
#[derive(Debug)]
pub struct TrieBackend<S = MemoryNodeStore> {
    root: H256,
    store: S,
}

impl TrieBackend<MemoryNodeStore> {
    /// Commit `state` into a fresh memory store
    pub fn from_state(state: &JournaledState) -> TrieResult<Self> {
        let mut store = MemoryNodeStore::new();
        let root = commit_state(state, &mut store)?;
        Ok(Self { root, store })
    }
}

impl<S: NodeStore> TrieBackend<S> {
    /// Backend over the state committed under `root`
    pub fn new(root: H256, store: S) -> Self {
        Self { root, store }
    }

    /// State root
    pub fn root(&self) -> H256 {
        self.root
    }

    /// Underlying node store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Raw account leaf
    pub fn trie_account(&self, address: &Address) -> TrieResult<Option<TrieAccount>> {
        let key = keccak256(address.as_bytes());
        match read(&self.store, &self.root, key.as_bytes())? {
            Some(bytes) => Ok(Some(rlp::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn code(&self, code_hash: &H256) -> TrieResult<Bytes> {
        if *code_hash == KECCAK_EMPTY {
            return Ok(Bytes::new());
        }
        let code = self
            .store
            .get(code_hash)?
            .ok_or(TrieError::MissingCode(*code_hash))?;
        Ok(Bytes::from(code))
    }
}

impl<S: NodeStore> StateBackend for TrieBackend<S> {
    fn get_account(&self, address: &Address) -> Result<Option<AccountInfo>, StateError> {
        let Some(account) = self.trie_account(address)? else {
            return Ok(None);
        };
        Ok(Some(AccountInfo {
            nonce: account.nonce,
            balance: account.balance,
            code: self.code(&account.code_hash)?,
        }))
    }

    fn get_storage(&self, address: &Address, key: &U256) -> Result<U256, StateError> {
        let Some(account) = self.trie_account(address)? else {
            return Ok(U256::zero());
        };
        let value = read(&self.store, &account.storage_root, slot_key(key).as_bytes())?;
        match value {
            Some(bytes) => Ok(rlp::decode(&bytes).map_err(TrieError::from)?),
            None => Ok(U256::zero()),
        }
    }

    fn trie_root(&self) -> Option<H256> {
        Some(self.root)
    }

    fn trie_node(&self, hash: &H256) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.store.get(hash)?)
    }
}
