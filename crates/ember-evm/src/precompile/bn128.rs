//! alt_bn128 curve operations (0x06..0x08), Istanbul pricing

use bn::{AffineG1, AffineG2, Fq, Fq2, Fr, Group, Gt, G1, G2};

use super::{right_pad, Precompile};
use crate::error::PrecompileError;

/// Bytes in an Fq element
const FQ_LEN: usize = 32;
/// Bytes in a scalar
const SCALAR_LEN: usize = 32;
/// Bytes in an Fq2 element
const FQ2_LEN: usize = 2 * FQ_LEN;
/// Uncompressed G1 point
const G1_LEN: usize = 2 * FQ_LEN;
/// Uncompressed G2 point
const G2_LEN: usize = 2 * FQ2_LEN;
/// One (G1, G2) pairing element
pub const PAIR_ELEMENT_LEN: usize = G1_LEN + G2_LEN;

/// 0x06: G1 point addition
pub struct Bn128Add;

/// 0x07: G1 scalar multiplication
pub struct Bn128Mul;

/// 0x08: pairing check
pub struct Bn128Pairing;

impl Bn128Pairing {
    const BASE: u64 = 45_000;
    const PER_PAIR: u64 = 34_000;
}

fn read_fq(input: &[u8]) -> Result<Fq, PrecompileError> {
    Fq::from_slice(&input[..FQ_LEN]).map_err(|_| PrecompileError::InvalidPoint)
}

/// The imaginary part is encoded first
fn read_fq2(input: &[u8]) -> Result<Fq2, PrecompileError> {
    let y = read_fq(&input[..FQ_LEN])?;
    let x = read_fq(&input[FQ_LEN..FQ2_LEN])?;
    Ok(Fq2::new(x, y))
}

/// (0, 0) encodes the point at infinity
fn read_g1(input: &[u8]) -> Result<G1, PrecompileError> {
    let x = read_fq(&input[..FQ_LEN])?;
    let y = read_fq(&input[FQ_LEN..G1_LEN])?;
    if x == Fq::zero() && y == Fq::zero() {
        return Ok(G1::zero());
    }
    AffineG1::new(x, y)
        .map(Into::into)
        .map_err(|_| PrecompileError::InvalidPoint)
}

fn read_g2(input: &[u8]) -> Result<G2, PrecompileError> {
    let x = read_fq2(&input[..FQ2_LEN])?;
    let y = read_fq2(&input[FQ2_LEN..G2_LEN])?;
    if x.is_zero() && y.is_zero() {
        return Ok(G2::zero());
    }
    AffineG2::new(x, y)
        .map(Into::into)
        .map_err(|_| PrecompileError::InvalidPoint)
}

/// Affine big-endian (x, y); infinity encodes as zeros
fn encode_g1(point: G1) -> Result<Vec<u8>, PrecompileError> {
    let mut out = vec![0u8; G1_LEN];
    if let Some(affine) = AffineG1::from_jacobian(point) {
        affine
            .x()
            .to_big_endian(&mut out[..FQ_LEN])
            .map_err(|_| PrecompileError::InvalidPoint)?;
        affine
            .y()
            .to_big_endian(&mut out[FQ_LEN..])
            .map_err(|_| PrecompileError::InvalidPoint)?;
    }
    Ok(out)
}

impl Precompile for Bn128Add {
    fn name(&self) -> &'static str {
        "bn256Add"
    }

    fn required_gas(&self, _input: &[u8]) -> u64 {
        150
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let input = right_pad::<{ 2 * G1_LEN }>(input);
        let p1 = read_g1(&input[..G1_LEN])?;
        let p2 = read_g1(&input[G1_LEN..])?;
        encode_g1(p1 + p2)
    }
}

impl Precompile for Bn128Mul {
    fn name(&self) -> &'static str {
        "bn256ScalarMul"
    }

    fn required_gas(&self, _input: &[u8]) -> u64 {
        6_000
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let input = right_pad::<{ G1_LEN + SCALAR_LEN }>(input);
        let point = read_g1(&input[..G1_LEN])?;
        // Non-canonical scalars are reduced
        let scalar = Fr::from_slice(&input[G1_LEN..])
            .map_err(|_| PrecompileError::InvalidInput("bn256 scalar"))?;
        encode_g1(point * scalar)
    }
}

impl Precompile for Bn128Pairing {
    fn name(&self) -> &'static str {
        "bn256Pairing"
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        let pairs = (input.len() / PAIR_ELEMENT_LEN) as u64;
        Self::BASE.saturating_add(Self::PER_PAIR.saturating_mul(pairs))
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        if input.len() % PAIR_ELEMENT_LEN != 0 {
            return Err(PrecompileError::InvalidInput("bn256 pairing input length"));
        }

        let mut pairs = Vec::with_capacity(input.len() / PAIR_ELEMENT_LEN);
        for element in input.chunks_exact(PAIR_ELEMENT_LEN) {
            let g1 = read_g1(&element[..G1_LEN])?;
            let g2 = read_g2(&element[G1_LEN..])?;
            if !g1.is_zero() && !g2.is_zero() {
                pairs.push((g1, g2));
            }
        }

        let success = pairs.is_empty() || bn::pairing_batch(&pairs) == Gt::one();
        let mut out = vec![0u8; 32];
        out[31] = success as u8;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // G1 generator (1, 2)
    const G1_GEN: [u8; 64] = hex!(
        "0000000000000000000000000000000000000000000000000000000000000001"
        "0000000000000000000000000000000000000000000000000000000000000002"
    );

    // 2 * G1 generator
    const G1_DOUBLE: [u8; 64] = hex!(
        "030644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd3"
        "15ed738c0e0a7c92e7845f96b2ae9c0a68a6a449e3538fc7ff3ebf7a5a18a2c4"
    );

    #[test]
    fn test_add_doubling() {
        let mut input = G1_GEN.to_vec();
        input.extend_from_slice(&G1_GEN);
        assert_eq!(Bn128Add.run(&input).unwrap(), G1_DOUBLE.to_vec());
    }

    #[test]
    fn test_add_empty_is_infinity() {
        assert_eq!(Bn128Add.run(&[]).unwrap(), vec![0u8; 64]);
    }

    #[test]
    fn test_add_invalid_point() {
        let mut input = vec![0u8; 128];
        input[31] = 1;
        input[63] = 1;
        assert_eq!(Bn128Add.run(&input), Err(PrecompileError::InvalidPoint));
    }

    #[test]
    fn test_mul_by_two() {
        let mut input = G1_GEN.to_vec();
        let mut scalar = [0u8; 32];
        scalar[31] = 2;
        input.extend_from_slice(&scalar);
        assert_eq!(Bn128Mul.run(&input).unwrap(), G1_DOUBLE.to_vec());
    }

    #[test]
    fn test_pairing_empty_input_succeeds() {
        let out = Bn128Pairing.run(&[]).unwrap();
        assert_eq!(out[31], 1);
        assert_eq!(Bn128Pairing.required_gas(&[]), 45_000);
    }

    #[test]
    fn test_pairing_bad_length() {
        assert!(Bn128Pairing.run(&[0u8; 100]).is_err());
        assert_eq!(
            Bn128Pairing.required_gas(&[0u8; 2 * PAIR_ELEMENT_LEN]),
            45_000 + 2 * 34_000
        );
    }

    #[test]
    fn test_pairing_infinity_pairs_succeed() {
        let out = Bn128Pairing.run(&[0u8; PAIR_ELEMENT_LEN]).unwrap();
        assert_eq!(out[31], 1);
    }
}
