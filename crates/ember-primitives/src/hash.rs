//! 32-byte hash / storage word type

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use thiserror::Error;

/// Hash parsing error
#[derive(Debug, Error)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// 256-bit hash (32 bytes)
///
/// Also used for storage keys and values, which are stored big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct H256([u8; 32]);

/// Alias for H256
pub type Hash = H256;

impl H256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        if slice.len() != 32 {
            return Err(HashError::InvalidLength {
                expected: 32,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(H256(bytes))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Big-endian encoding of a word
    pub fn from_word(word: U256) -> Self {
        let mut bytes = [0u8; 32];
        word.to_big_endian(&mut bytes);
        H256(bytes)
    }

    /// Interpret as a big-endian word
    pub fn to_word(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for H256 {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl From<U256> for H256 {
    fn from(word: U256) -> Self {
        H256::from_word(word)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for H256 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for H256 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            H256::from_hex(&s).map_err(de::Error::custom)
        }
    }
}

// RLP implementations (behind feature flag)
#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

    impl Encodable for H256 {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.0);
        }
    }

    impl Decodable for H256 {
        fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
            let bytes: Vec<u8> = rlp.as_val()?;
            if bytes.len() != 32 {
                return Err(DecoderError::RlpInvalidLength);
            }
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&bytes);
            Ok(H256(arr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h256_from_hex() {
        let hash = H256::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert!(!hash.is_zero());
        assert_eq!(hash.as_bytes()[31], 1);
        assert!(H256::ZERO.is_zero());
    }

    #[test]
    fn test_h256_from_hex_errors() {
        match H256::from_hex("0x") {
            Err(HashError::InvalidLength { expected: 32, got: 0 }) => {}
            other => panic!("Expected InvalidLength, got {:?}", other),
        }
        match H256::from_hex(
            "0xgggggggggggggggggggggggggggggggggggggggggggggggggggggggggggggggg",
        ) {
            Err(HashError::InvalidHex(_)) => {}
            other => panic!("Expected InvalidHex, got {:?}", other),
        }
        assert!(H256::from_slice(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_h256_word_roundtrip() {
        let word = U256::from(0x7bu64);
        let hash = H256::from_word(word);
        assert_eq!(hash.as_bytes()[31], 0x7b);
        assert_eq!(hash.to_word(), word);
        assert_eq!(H256::from(U256::MAX).as_bytes(), &[0xff; 32]);
    }

    #[test]
    fn test_h256_display() {
        let hash = H256::from_bytes([0x11; 32]);
        assert_eq!(hash.to_hex().len(), 66);
        assert!(format!("{:?}", hash).starts_with("H256(0x1111"));
    }

    #[test]
    fn test_h256_ordering() {
        let low = H256::from_word(U256::from(1u64));
        let high = H256::from_word(U256::from(2u64));
        assert!(low < high);
    }

    #[cfg(feature = "rlp")]
    #[test]
    fn test_h256_rlp() {
        let hash = H256::from_bytes([0x42; 32]);
        let encoded = rlp::encode(&hash);
        assert_eq!(encoded[0], 0xa0);
        let decoded: H256 = rlp::decode(&encoded).unwrap();
        assert_eq!(decoded, hash);
    }
}
