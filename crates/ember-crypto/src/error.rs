//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// r or s is zero or not below the curve order
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// v is neither 0/1 nor 27/28
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// No public key matches the signature
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Secret key is zero, too large, or the wrong length
    #[error("invalid private key")]
    InvalidPrivateKey,
}
