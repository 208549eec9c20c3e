//! # ember-crypto
//!
//! Cryptographic primitives for the Ember EVM.
//!
//! - Keccak-256, SHA-256 and RIPEMD-160 hashing
//! - secp256k1 public key recovery (ECRECOVER)
//! - Address derivation from keys

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::{keccak256, ripemd160, sha256, KECCAK_EMPTY};
pub use signature::{
    public_key_to_address, recover_address, recover_public_key, secret_key_to_address, sign,
    PrivateKey, PublicKey, Signature, SECP256K1_N,
};
