//! Precompiled contracts at 0x01..0x0a

mod blake2;
mod bn128;
mod kzg;
mod modexp;
mod simple;

use bytes::Bytes;
use ember_primitives::Address;

use crate::config::Rules;
use crate::error::PrecompileError;

pub use blake2::Blake2F;
pub use bn128::{Bn128Add, Bn128Mul, Bn128Pairing};
pub use kzg::{kzg_to_versioned_hash, PointEvaluation};
pub use modexp::ModExp;
pub use simple::{EcRecover, Identity, Ripemd160, Sha256};

/// A native contract with its own gas schedule
pub trait Precompile: Send + Sync {
    /// Name used in traces
    fn name(&self) -> &'static str;

    /// Gas charged for `input`
    fn required_gas(&self, input: &[u8]) -> u64;

    /// Execute on `input`
    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError>;
}

/// Successful precompile call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Returned bytes
    pub output: Bytes,
    /// Supplied gas minus the required gas
    pub gas_left: u64,
}

static ECRECOVER: EcRecover = EcRecover;
static SHA256: Sha256 = Sha256;
static RIPEMD160: Ripemd160 = Ripemd160;
static IDENTITY: Identity = Identity;
static MODEXP: ModExp = ModExp;
static BN128_ADD: Bn128Add = Bn128Add;
static BN128_MUL: Bn128Mul = Bn128Mul;
static BN128_PAIRING: Bn128Pairing = Bn128Pairing;
static BLAKE2F: Blake2F = Blake2F;
static POINT_EVALUATION: PointEvaluation = PointEvaluation;

/// Highest precompile address byte active under `rules`
fn last_index(rules: &Rules) -> u8 {
    if rules.is_cancun {
        0x0a
    } else if rules.is_istanbul {
        0x09
    } else if rules.is_byzantium {
        0x08
    } else {
        0x04
    }
}

/// Precompile at `address`, if one is active under `rules`
pub fn get(address: &Address, rules: &Rules) -> Option<&'static dyn Precompile> {
    let bytes = address.as_bytes();
    if bytes[..19].iter().any(|b| *b != 0) {
        return None;
    }
    let index = bytes[19];
    if index == 0 || index > last_index(rules) {
        return None;
    }
    let precompile: &'static dyn Precompile = match index {
        0x01 => &ECRECOVER,
        0x02 => &SHA256,
        0x03 => &RIPEMD160,
        0x04 => &IDENTITY,
        0x05 => &MODEXP,
        0x06 => &BN128_ADD,
        0x07 => &BN128_MUL,
        0x08 => &BN128_PAIRING,
        0x09 => &BLAKE2F,
        0x0a => &POINT_EVALUATION,
        _ => return None,
    };
    Some(precompile)
}

/// Whether `address` is an active precompile
pub fn is_precompile(address: &Address, rules: &Rules) -> bool {
    get(address, rules).is_some()
}

/// Addresses of all active precompiles, pre-warmed at transaction start
pub fn addresses(rules: &Rules) -> impl Iterator<Item = Address> {
    (1..=last_index(rules)).map(|i| Address::from_low_u64(i as u64))
}

/// Charge and run a precompile.
///
/// Fails with [`PrecompileError::OutOfGas`] when `gas` does not cover the
/// requirement; any error leaves no gas to return.
pub fn execute(
    precompile: &dyn Precompile,
    input: &[u8],
    gas: u64,
) -> Result<PrecompileOutput, PrecompileError> {
    let required = precompile.required_gas(input);
    if gas < required {
        return Err(PrecompileError::OutOfGas);
    }
    let output = precompile.run(input)?;
    Ok(PrecompileOutput {
        output: output.into(),
        gas_left: gas - required,
    })
}

/// `base + word * ceil(len / 32)`, saturating
pub(crate) fn linear_cost(len: usize, base: u64, word: u64) -> u64 {
    let words = (len as u64).saturating_add(31) / 32;
    base.saturating_add(word.saturating_mul(words))
}

/// Copy `data` into a zero-filled array of `N` bytes, truncating or padding
/// on the right
pub(crate) fn right_pad<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut padded = [0u8; N];
    let len = data.len().min(N);
    padded[..len].copy_from_slice(&data[..len]);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;

    #[test]
    fn test_get_by_address() {
        let rules = Rules::cancun();
        for i in 1..=10u64 {
            assert!(get(&Address::from_low_u64(i), &rules).is_some(), "0x{i:02x}");
        }
        assert!(get(&Address::ZERO, &rules).is_none());
        assert!(get(&Address::from_low_u64(11), &rules).is_none());

        let mut high = [0u8; 20];
        high[0] = 1;
        high[19] = 1;
        assert!(get(&Address::from_bytes(high), &rules).is_none());
    }

    #[test]
    fn test_point_evaluation_requires_cancun() {
        let shanghai = ChainConfig::for_fork("Shanghai").unwrap().rules(0, 0);
        assert!(!is_precompile(&Address::from_low_u64(10), &shanghai));
        assert!(is_precompile(&Address::from_low_u64(9), &shanghai));
        assert_eq!(addresses(&shanghai).count(), 9);
        assert_eq!(addresses(&Rules::cancun()).count(), 10);
    }

    #[test]
    fn test_execute_out_of_gas() {
        let identity = get(&Address::from_low_u64(4), &Rules::cancun()).unwrap();
        assert_eq!(
            execute(identity, &[1, 2, 3], 17),
            Err(PrecompileError::OutOfGas)
        );
        let out = execute(identity, &[1, 2, 3], 20).unwrap();
        assert_eq!(out.output.as_ref(), &[1, 2, 3]);
        assert_eq!(out.gas_left, 2);
    }

    #[test]
    fn test_linear_cost() {
        assert_eq!(linear_cost(0, 15, 3), 15);
        assert_eq!(linear_cost(1, 15, 3), 18);
        assert_eq!(linear_cost(32, 15, 3), 18);
        assert_eq!(linear_cost(33, 15, 3), 21);
    }

    #[test]
    fn test_right_pad() {
        assert_eq!(right_pad::<4>(&[1, 2]), [1, 2, 0, 0]);
        assert_eq!(right_pad::<2>(&[1, 2, 3]), [1, 2]);
    }
}
