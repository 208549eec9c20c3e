//! Trie error types

use ember_evm::StateError;
use ember_primitives::H256;
use thiserror::Error;

/// Trie errors
#[derive(Debug, Error)]
pub enum TrieError {
    /// A hash reference points at a node the store does not hold
    #[error("missing trie node {0}")]
    MissingNode(H256),

    /// Account references code the store does not hold
    #[error("missing code {0}")]
    MissingCode(H256),

    /// Node bytes have the wrong shape
    #[error("invalid trie node: {0}")]
    InvalidNode(String),

    /// RLP decoding failed
    #[error("rlp decode error: {0}")]
    Rlp(#[from] rlp::DecoderError),

    /// Node store failure
    #[error("node store error: {0}")]
    Store(String),

    /// The state reads through a backend that is not a committed trie
    #[error("state backend has no trie root")]
    UntrackedBackend,
}

/// Result type for trie operations
pub type TrieResult<T> = Result<T, TrieError>;

impl From<TrieError> for StateError {
    fn from(err: TrieError) -> Self {
        match err {
            TrieError::MissingNode(_) | TrieError::MissingCode(_) => {
                StateError::Missing(err.to_string())
            }
            _ => StateError::Corrupt(err.to_string()),
        }
    }
}
