//! # ember-primitives
//!
//! Primitive types shared by the Ember EVM crates.
//!
//! Addresses and hashes are fixed-size byte arrays; machine words are
//! `primitive_types::U256` (with `U512` for full-width intermediate products).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
pub mod parse;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{Hash, HashError, H256};
pub use parse::{parse_bytes, parse_u256, parse_u64};

// Re-export primitive-types for U256
pub use primitive_types::{U256, U512};

/// Block number type
pub type BlockNumber = u64;

/// Account nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;
