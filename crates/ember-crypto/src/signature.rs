//! secp256k1 signing and public key recovery

use ember_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use crate::{keccak256, CryptoError};

/// Half of the secp256k1 curve order (n/2)
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D,
    0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Full secp256k1 curve order (n)
pub const SECP256K1_N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// ECDSA signature with recovery id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// recovery id stored as 27 or 28
    pub v: u8,
}

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

impl Signature {
    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Recovery id (0 or 1)
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// Check if signature has low-s value (EIP-2)
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_N_DIV_2
    }
}

/// n - s, used to flip a signature between its high-s and low-s forms
fn subtract_from_n(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: u16 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_N[i] as u16)
            .wrapping_sub(s[i] as u16)
            .wrapping_sub(borrow);
        result[i] = diff as u8;
        borrow = if diff > 255 { 1 } else { 0 };
    }

    result
}

/// Sign a message hash, producing a low-s signature
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let r_bytes: [u8; 32] = signature.r().to_bytes().into();
    let mut s_bytes: [u8; 32] = signature.s().to_bytes().into();

    if s_bytes > SECP256K1_N_DIV_2 {
        s_bytes = subtract_from_n(&s_bytes);
        recovery_id = RecoveryId::try_from(recovery_id.to_byte() ^ 1)
            .map_err(|_| CryptoError::SigningFailed("invalid recovery id".to_string()))?;
    }

    Ok(Signature {
        r: r_bytes,
        s: s_bytes,
        v: recovery_id.to_byte() + 27,
    })
}

/// Recover the signer's public key.
///
/// High-s signatures are accepted: the signature is folded to its low-s
/// twin with the recovery id flipped, which recovers the same key.
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let mut recid = signature.recovery_id();
    if recid > 1 {
        return Err(CryptoError::InvalidRecoveryId(signature.v));
    }
    let mut s = signature.s;
    if !signature.is_low_s() {
        s = subtract_from_n(&s);
        recid ^= 1;
    }

    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = s.into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id =
        RecoveryId::try_from(recid).map_err(|_| CryptoError::InvalidRecoveryId(signature.v))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signer's address
pub fn recover_address(message_hash: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(message_hash, signature).map(|key| public_key_to_address(&key))
}

/// Derive address from public key: last 20 bytes of keccak256(x || y)
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let bytes = encoded.as_bytes();

    let hash = keccak256(&bytes[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}

/// Derive address from a raw 32-byte secret key
pub fn secret_key_to_address(secret: &[u8]) -> Result<Address, CryptoError> {
    let key = SigningKey::from_slice(secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(public_key_to_address(key.verifying_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_and_recover() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test message");

        let signature = sign(&message_hash, &private_key).unwrap();
        assert!(signature.is_low_s());

        let recovered = recover_public_key(&message_hash, &signature).unwrap();
        assert_eq!(private_key.verifying_key(), &recovered);
    }

    #[test]
    fn test_recover_high_s_twin() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"malleable");
        let signature = sign(&message_hash, &private_key).unwrap();

        let twin = Signature::new(
            signature.r,
            subtract_from_n(&signature.s),
            if signature.v == 27 { 28 } else { 27 },
        );
        assert!(!twin.is_low_s());

        let expected = public_key_to_address(private_key.verifying_key());
        assert_eq!(recover_address(&message_hash, &twin).unwrap(), expected);
    }

    #[test]
    fn test_recover_rejects_zero_r() {
        let hash = keccak256(b"x");
        let signature = Signature::new([0u8; 32], [1u8; 32], 27);
        assert!(recover_address(&hash, &signature).is_err());
    }

    #[test]
    fn test_recover_rejects_bad_v() {
        let hash = keccak256(b"x");
        let signature = Signature::new([1u8; 32], [1u8; 32], 30);
        match recover_address(&hash, &signature) {
            Err(CryptoError::InvalidRecoveryId(30)) => {}
            other => panic!("Expected InvalidRecoveryId, got {:?}", other),
        }
    }

    #[test]
    fn test_secret_key_to_address_known_vector() {
        // Well-known state test sender key
        let secret =
            hex::decode("45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8")
                .unwrap();
        let address = secret_key_to_address(&secret).unwrap();
        assert_eq!(address.to_hex(), "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b");
    }

    #[test]
    fn test_secret_key_invalid() {
        assert!(secret_key_to_address(&[0u8; 32]).is_err());
        assert!(secret_key_to_address(&[1u8; 5]).is_err());
    }
}
