//! Node stores: `keccak256(node) -> node bytes`

use std::collections::HashMap;

use ember_primitives::H256;

use crate::error::TrieResult;

/// Content-addressed node storage
///
/// Called synchronously; implementations over disk may block.
pub trait NodeStore {
    /// Bytes stored under `hash`
    fn get(&self, hash: &H256) -> TrieResult<Option<Vec<u8>>>;

    /// Store `data` under `hash`
    fn put(&mut self, hash: H256, data: Vec<u8>) -> TrieResult<()>;
}

impl<S: NodeStore + ?Sized> NodeStore for &mut S {
    fn get(&self, hash: &H256) -> TrieResult<Option<Vec<u8>>> {
        (**self).get(hash)
    }

    fn put(&mut self, hash: H256, data: Vec<u8>) -> TrieResult<()> {
        (**self).put(hash, data)
    }
}

/// Hash-map backed [`NodeStore`]
#[derive(Clone, Debug, Default)]
pub struct MemoryNodeStore {
    nodes: HashMap<H256, Vec<u8>>,
}

impl MemoryNodeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if `hash` is stored
    pub fn contains(&self, hash: &H256) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Consume the store, yielding every entry
    pub fn into_entries(self) -> impl Iterator<Item = (H256, Vec<u8>)> {
        self.nodes.into_iter()
    }
}

impl NodeStore for MemoryNodeStore {
    fn get(&self, hash: &H256) -> TrieResult<Option<Vec<u8>>> {
        Ok(self.nodes.get(hash).cloned())
    }

    fn put(&mut self, hash: H256, data: Vec<u8>) -> TrieResult<()> {
        self.nodes.insert(hash, data);
        Ok(())
    }
}
