//! Hash and copy precompiles (0x01..0x04)

use ember_crypto::{recover_address, ripemd160, sha256, Signature, SECP256K1_N};
use ember_primitives::H256;

use super::{linear_cost, right_pad, Precompile};
use crate::error::PrecompileError;

/// 0x01: signer address of (hash, v, r, s)
pub struct EcRecover;

impl EcRecover {
    const GAS: u64 = 3000;
}

fn valid_scalar(bytes: &[u8; 32]) -> bool {
    bytes.iter().any(|b| *b != 0) && *bytes < SECP256K1_N
}

impl Precompile for EcRecover {
    fn name(&self) -> &'static str {
        "ecrecover"
    }

    fn required_gas(&self, _input: &[u8]) -> u64 {
        Self::GAS
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let input = right_pad::<128>(input);

        // v must be exactly 27 or 28 as a full word
        if input[32..63].iter().any(|b| *b != 0) || !matches!(input[63], 27 | 28) {
            return Ok(Vec::new());
        }

        let mut hash = [0u8; 32];
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        hash.copy_from_slice(&input[..32]);
        r.copy_from_slice(&input[64..96]);
        s.copy_from_slice(&input[96..128]);
        if !valid_scalar(&r) || !valid_scalar(&s) {
            return Ok(Vec::new());
        }

        let signature = Signature::new(r, s, input[63]);
        match recover_address(&H256::from_bytes(hash), &signature) {
            Ok(address) => {
                let mut out = vec![0u8; 32];
                out[12..].copy_from_slice(address.as_bytes());
                Ok(out)
            }
            Err(_) => Ok(Vec::new()),
        }
    }
}

/// 0x02: SHA-256
pub struct Sha256;

impl Precompile for Sha256 {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 60, 12)
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        Ok(sha256(input).to_vec())
    }
}

/// 0x03: RIPEMD-160, left-padded to a word
pub struct Ripemd160;

impl Precompile for Ripemd160 {
    fn name(&self) -> &'static str {
        "ripemd160"
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 600, 120)
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let mut out = vec![0u8; 32];
        out[12..].copy_from_slice(&ripemd160(input));
        Ok(out)
    }
}

/// 0x04: returns its input
pub struct Identity;

impl Precompile for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 15, 3)
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        Ok(input.to_vec())
    }
}
