//! Common error types for primitives

use thiserror::Error;

use crate::address::AddressError;
use crate::hash::HashError;

/// Primitive parsing error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Malformed hex or decimal number
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// Malformed hex byte string
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
