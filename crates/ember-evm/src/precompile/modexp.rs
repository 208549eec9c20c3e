//! 0x05: big-integer modular exponentiation with EIP-2565 pricing

use std::cmp::{max, min};

use ember_primitives::U256;

use super::{right_pad, Precompile};
use crate::error::PrecompileError;

const HEADER_LEN: usize = 96;

/// `base^exp mod modulus` over arbitrary-length big-endian integers
pub struct ModExp;

/// Parsed length header
struct Header {
    base_len: u64,
    exp_len: u64,
    mod_len: u64,
}

impl Header {
    fn parse(input: &[u8]) -> Self {
        let word = |offset: usize| {
            let bytes = right_pad::<32>(input.get(offset..).unwrap_or_default());
            let value = U256::from_big_endian(&bytes);
            if value > U256::from(u64::MAX) {
                u64::MAX
            } else {
                value.low_u64()
            }
        };
        Self {
            base_len: word(0),
            exp_len: word(32),
            mod_len: word(64),
        }
    }
}

/// Bytes `[offset, offset + len)` of `data`, zero-filled past its end
fn padded_slice(data: &[u8], offset: u64, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if let Ok(offset) = usize::try_from(offset) {
        if offset < data.len() {
            let available = min(len, data.len() - offset);
            out[..available].copy_from_slice(&data[offset..offset + available]);
        }
    }
    out
}

/// Leading (up to) 32 bytes of the exponent
fn exponent_head(body: &[u8], header: &Header) -> U256 {
    let head_len = min(header.exp_len, 32) as usize;
    let head = padded_slice(body, header.base_len, head_len);
    U256::from_big_endian(&head)
}

fn iteration_count(exp_len: u64, exp_head: &U256) -> u64 {
    let count = if exp_len <= 32 {
        if exp_head.is_zero() {
            0
        } else {
            exp_head.bits() as u64 - 1
        }
    } else {
        8u64.saturating_mul(exp_len - 32)
            .saturating_add(max(1, exp_head.bits() as u64) - 1)
    };
    max(count, 1)
}

fn berlin_gas(header: &Header, exp_head: &U256) -> u64 {
    let max_len = max(header.base_len, header.mod_len);
    let words = U256::from(max_len.div_ceil(8));
    let complexity = words.saturating_mul(words);
    let gas = complexity.saturating_mul(U256::from(iteration_count(header.exp_len, exp_head))) / 3;
    if gas > U256::from(u64::MAX) {
        u64::MAX
    } else {
        max(200, gas.low_u64())
    }
}

impl Precompile for ModExp {
    fn name(&self) -> &'static str {
        "modexp"
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        let header = Header::parse(input);
        let body = input.get(HEADER_LEN..).unwrap_or_default();
        berlin_gas(&header, &exponent_head(body, &header))
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let header = Header::parse(input);
        if header.base_len == 0 && header.mod_len == 0 {
            return Ok(Vec::new());
        }
        let too_large = PrecompileError::InvalidInput("modexp operand length");
        let base_len = usize::try_from(header.base_len).map_err(|_| too_large.clone())?;
        let exp_len = usize::try_from(header.exp_len).map_err(|_| too_large.clone())?;
        let mod_len = usize::try_from(header.mod_len).map_err(|_| too_large)?;

        let body = input.get(HEADER_LEN..).unwrap_or_default();
        let base = padded_slice(body, 0, base_len);
        let exponent = padded_slice(body, header.base_len, exp_len);
        let modulus = padded_slice(body, header.base_len.saturating_add(header.exp_len), mod_len);

        let result = aurora_engine_modexp::modexp(&base, &exponent, &modulus);
        let mut out = vec![0u8; mod_len];
        let take = min(result.len(), mod_len);
        out[mod_len - take..].copy_from_slice(&result[result.len() - take..]);
        Ok(out)
    }
}
