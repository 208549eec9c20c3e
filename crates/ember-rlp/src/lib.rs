//! # ember-rlp
//!
//! RLP (Recursive Length Prefix) helpers for the Ember EVM.
//!
//! Wraps the `rlp` crate with the encodings the EVM needs directly:
//! contract address derivation for CREATE/CREATE2 and the account/log
//! shapes consumed by the state trie.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

use ember_crypto::keccak256;

// Re-export rlp crate for direct use
pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

pub use ember_primitives::{Address, H256, U256};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}

/// Address of a contract created with CREATE:
/// `keccak256(rlp([sender, nonce]))[12..]`
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    address_from_hash(&keccak256(&stream.out()))
}

/// Address of a contract created with CREATE2:
/// `keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))[12..]`
pub fn create2_address(sender: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    let mut preimage = Vec::with_capacity(85);
    preimage.push(0xff);
    preimage.extend_from_slice(sender.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    preimage.extend_from_slice(init_code_hash.as_bytes());
    address_from_hash(&keccak256(&preimage))
}

fn address_from_hash(hash: &H256) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// RLP encoding utilities
pub mod utils {
    use super::*;

    /// Encode a u64 with minimal bytes (no leading zeros)
    pub fn encode_u64(value: u64) -> Vec<u8> {
        rlp::encode(&value).to_vec()
    }

    /// Encode a 256-bit integer as a minimal big-endian string
    pub fn encode_u256(value: &U256) -> Vec<u8> {
        rlp::encode(value).to_vec()
    }

    /// Compute list payload length header
    pub fn list_header(payload_len: usize) -> Vec<u8> {
        if payload_len < 56 {
            vec![0xc0 + payload_len as u8]
        } else {
            let len_bytes = encode_length(payload_len);
            let mut header = vec![0xf7 + len_bytes.len() as u8];
            header.extend(len_bytes);
            header
        }
    }

    /// Encode length as minimal big-endian bytes
    fn encode_length(len: usize) -> Vec<u8> {
        let bytes = (len as u64).to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        bytes[start..].to_vec()
    }
}
