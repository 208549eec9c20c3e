//! Post-state digests

use ember_crypto::keccak256;
use ember_evm::{JournaledState, Log, StateBackend};
use ember_primitives::H256;
use rlp::RlpStream;

use crate::backend::{commit_onto, commit_state};
use crate::error::{TrieError, TrieResult};
use crate::store::{MemoryNodeStore, NodeStore};

/// Root of the secure state trie over every live account in `state`.
///
/// A state reading through a trie backend is applied on top of the
/// backend's root. Any other backend is rejected, since its accounts cannot
/// be enumerated.
pub fn state_root(state: &JournaledState) -> TrieResult<H256> {
    match state.backend() {
        None => commit_state(state, &mut MemoryNodeStore::new()),
        Some(backend) => {
            let base = backend.trie_root().ok_or(TrieError::UntrackedBackend)?;
            let mut overlay = Overlay {
                backend,
                written: MemoryNodeStore::new(),
            };
            commit_onto(state, &mut overlay, base)
        }
    }
}

/// New nodes in memory over a backend's committed nodes
struct Overlay<'a> {
    backend: &'a dyn StateBackend,
    written: MemoryNodeStore,
}

impl NodeStore for Overlay<'_> {
    fn get(&self, hash: &H256) -> TrieResult<Option<Vec<u8>>> {
        if let Some(node) = self.written.get(hash)? {
            return Ok(Some(node));
        }
        self.backend
            .trie_node(hash)
            .map_err(|e| TrieError::Store(e.to_string()))
    }

    fn put(&mut self, hash: H256, data: Vec<u8>) -> TrieResult<()> {
        self.written.put(hash, data)
    }
}

/// `keccak256(rlp(logs))`, each log encoded as `[address, [topics], data]`
pub fn logs_hash(logs: &[Log]) -> H256 {
    let mut stream = RlpStream::new_list(logs.len());
    for log in logs {
        stream.begin_list(3);
        stream.append(&log.address);
        stream.append_list::<H256, H256>(&log.topics);
        stream.append(&log.data.to_vec());
    }
    keccak256(&stream.out())
}
