//! Error types for the state-test harness

use ember_crypto::CryptoError;
use ember_evm::TxError;
use ember_primitives::PrimitiveError;
use ember_trie::TrieError;
use thiserror::Error;

/// Test error type
#[derive(Error, Debug)]
pub enum TestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fixture field failed to parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// Secret key does not derive a sender
    #[error("Invalid secret key: {0}")]
    SecretKey(#[from] CryptoError),

    /// Transaction rejected where the fixture expects it to apply
    #[error("Transaction rejected: {0}")]
    Rejected(#[from] TxError),

    /// State-root computation failed
    #[error("Trie error: {0}")]
    Trie(#[from] TrieError),

    /// Post-state differs from the expectation
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Fork name the harness does not know
    #[error("Unsupported fork: {0}")]
    UnsupportedFork(String),
}

impl From<PrimitiveError> for TestError {
    fn from(e: PrimitiveError) -> Self {
        TestError::Parse(e.to_string())
    }
}

/// Test result type
pub type TestResult<T> = Result<T, TestError>;
