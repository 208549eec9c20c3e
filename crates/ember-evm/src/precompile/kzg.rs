//! 0x0a: KZG point evaluation (EIP-4844) over BLS12-381

use std::ops::Neg;

use ark_bls12_381::{Bls12_381, Fr, G1Affine, G2Affine};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{BigInteger, One, PrimeField};
use ark_serialize::CanonicalDeserialize;
use ember_crypto::sha256;
use hex_literal::hex;

use super::Precompile;
use crate::error::PrecompileError;

/// versioned_hash(32) ‖ z(32) ‖ y(32) ‖ commitment(48) ‖ proof(48)
const INPUT_LEN: usize = 192;

/// Version byte of KZG versioned hashes
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

/// FIELD_ELEMENTS_PER_BLOB ‖ BLS_MODULUS, both as words
const RETURN_VALUE: [u8; 64] = hex!(
    "0000000000000000000000000000000000000000000000000000000000001000"
    "73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001"
);

/// `[τ]₂` from the Ethereum KZG ceremony, compressed
const TRUSTED_SETUP_TAU_G2: [u8; 96] = hex!(
    "b5bfd7dd8cdeb128843bc287230af38926187075cbfbefa81009a2ce615ac53d"
    "2914e5870cb452d2afaaab24f3499f72185cbfee53492714734429b7b38608e2"
    "3926c911cceceac9a36851477ba4c60b087041de621000edc98edada20c1def2"
);

/// Verifies that a blob polynomial evaluates to `y` at `z`
pub struct PointEvaluation;

/// `0x01 ‖ sha256(commitment)[1..]`
pub fn kzg_to_versioned_hash(commitment: &[u8]) -> [u8; 32] {
    let mut hash = sha256(commitment);
    hash[0] = VERSIONED_HASH_VERSION_KZG;
    hash
}

fn read_g1(bytes: &[u8]) -> Result<G1Affine, PrecompileError> {
    G1Affine::deserialize_compressed(bytes).map_err(|_| PrecompileError::Kzg("invalid G1 point"))
}

/// Scalars must be canonical (below the field modulus)
fn read_scalar(bytes: &[u8]) -> Result<Fr, PrecompileError> {
    let fr = Fr::from_be_bytes_mod_order(bytes);
    if fr.into_bigint().to_bytes_be().as_slice() != bytes {
        return Err(PrecompileError::Kzg("non-canonical field element"));
    }
    Ok(fr)
}

/// Checks `e(C - [y]G₁, -G₂) · e(π, [τ]G₂ - [z]G₂) == 1`
fn verify_proof(
    commitment: &[u8],
    z: &[u8],
    y: &[u8],
    proof: &[u8],
) -> Result<bool, PrecompileError> {
    let commitment = read_g1(commitment)?;
    let proof = read_g1(proof)?;
    let z = read_scalar(z)?;
    let y = read_scalar(y)?;
    let tau = G2Affine::deserialize_compressed_unchecked(&TRUSTED_SETUP_TAU_G2[..])
        .map_err(|_| PrecompileError::Kzg("trusted setup"))?;

    let g1 = G1Affine::generator();
    let g2 = G2Affine::generator();

    let p_minus_y = (commitment.into_group() - g1.mul_bigint(y.into_bigint())).into_affine();
    let x_minus_z = (tau.into_group() - g2.mul_bigint(z.into_bigint())).into_affine();

    let result = Bls12_381::multi_pairing([p_minus_y, proof], [g2.neg(), x_minus_z]);
    Ok(result.0.is_one())
}

impl Precompile for PointEvaluation {
    fn name(&self) -> &'static str {
        "kzgPointEvaluation"
    }

    fn required_gas(&self, _input: &[u8]) -> u64 {
        50_000
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        if input.len() != INPUT_LEN {
            return Err(PrecompileError::Kzg("invalid input length"));
        }
        let versioned_hash = &input[..32];
        let z = &input[32..64];
        let y = &input[64..96];
        let commitment = &input[96..144];
        let proof = &input[144..192];

        if kzg_to_versioned_hash(commitment) != versioned_hash {
            return Err(PrecompileError::Kzg("mismatched versioned hash"));
        }
        if !verify_proof(commitment, z, y, proof)? {
            return Err(PrecompileError::Kzg("proof verification failed"));
        }
        Ok(RETURN_VALUE.to_vec())
    }
}
