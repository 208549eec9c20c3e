//! # ember-trie
//!
//! Merkle-Patricia trie for the Ember EVM.
//!
//! - [`Trie`]: insert/get/remove over a content-addressed [`NodeStore`]
//! - [`TrieBackend`]: secure-trie world state implementing
//!   [`ember_evm::StateBackend`]
//! - [`state_root`] and [`logs_hash`] for post-state checks
//!
//! ## Layout
//!
//! Account keys are `keccak256(address)` and account values are
//! `rlp([nonce, balance, storage_root, code_hash])`. Storage keys are
//! `keccak256(slot)` with `rlp(value)` values. Contract code lives in the same
//! node store under its code hash.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod error;
mod nibbles;
mod node;
mod root;
mod store;
mod trie;

use ember_primitives::H256;

pub use backend::{commit_onto, commit_state, TrieAccount, TrieBackend};
pub use error::{TrieError, TrieResult};
pub use nibbles::{decode_compact, encode_compact, to_nibbles};
pub use node::Node;
pub use root::{logs_hash, state_root};
pub use store::{MemoryNodeStore, NodeStore};
pub use trie::{read, Trie};

/// Root of the empty trie, `keccak256(rlp(""))`
pub const EMPTY_ROOT: H256 = H256::from_bytes([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6,
    0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0,
    0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);
