//! Parsing of the hex and decimal strings found in JSON fixtures

use crate::error::PrimitiveError;
use crate::U256;

/// Parse a `0x`-prefixed hex or plain decimal number.
///
/// An empty string or a bare `0x` is zero.
pub fn parse_u256(s: &str) -> Result<U256, PrimitiveError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some("") => return Ok(U256::zero()),
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None if s.is_empty() => return Ok(U256::zero()),
        None => U256::from_dec_str(s).ok(),
    };
    parsed.ok_or_else(|| PrimitiveError::InvalidNumber(s.to_string()))
}

/// Parse a [`parse_u256`] string that must fit in 64 bits
pub fn parse_u64(s: &str) -> Result<u64, PrimitiveError> {
    let value = parse_u256(s)?;
    if value > U256::from(u64::MAX) {
        return Err(PrimitiveError::InvalidNumber(s.to_string()));
    }
    Ok(value.as_u64())
}

/// Decode hex bytes with an optional `0x` prefix
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|_| PrimitiveError::InvalidHex(s.to_string()))
}
