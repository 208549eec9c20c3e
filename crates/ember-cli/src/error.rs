//! CLI error types

use ember_evm::GenesisError;
use ember_evm_tests::TestError;
use ember_primitives::PrimitiveError;
use ember_trie::TrieError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid hex string or number
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fork name not recognised
    #[error("Unknown fork: {0}")]
    UnknownFork(String),

    /// Genesis file failed to load
    #[error("Genesis error: {0}")]
    Genesis(#[from] GenesisError),

    /// State-test harness error
    #[error("State test error: {0}")]
    Test(#[from] TestError),

    /// State-root computation failed
    #[error("Trie error: {0}")]
    Trie(#[from] TrieError),

    /// Some state tests failed
    #[error("{0} state test(s) failed")]
    TestsFailed(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<PrimitiveError> for CliError {
    fn from(e: PrimitiveError) -> Self {
        CliError::InvalidHex(e.to_string())
    }
}
