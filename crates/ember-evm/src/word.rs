//! 256-bit word arithmetic with EVM semantics.
//!
//! Unsigned operations wrap modulo 2^256. Signed views interpret bit 255 as
//! the sign (two's complement). Division and modulo by zero yield zero.

use ember_primitives::{U256, U512};

/// Two's complement negation
#[inline]
pub fn negate(x: U256) -> U256 {
    (!x).overflowing_add(U256::one()).0
}

/// Bit 255 set
#[inline]
pub fn is_negative(x: &U256) -> bool {
    x.bit(255)
}

/// Absolute value under the signed view
#[inline]
fn abs(x: U256) -> U256 {
    if is_negative(&x) {
        negate(x)
    } else {
        x
    }
}

/// Low 256 bits of a 512-bit value
#[inline]
fn low_half(x: U512) -> U256 {
    let U512(ref limbs) = x;
    U256([limbs[0], limbs[1], limbs[2], limbs[3]])
}

/// Wrapping addition
#[inline]
pub fn add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

/// Wrapping subtraction
#[inline]
pub fn sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

/// Wrapping multiplication
#[inline]
pub fn mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

/// Unsigned division, zero divisor yields zero
#[inline]
pub fn div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

/// Unsigned modulo, zero modulus yields zero
#[inline]
pub fn rem(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// Signed division truncating toward zero. `MIN / -1 = MIN`.
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let quotient = abs(a) / abs(b);
    if is_negative(&a) != is_negative(&b) {
        negate(quotient)
    } else {
        quotient
    }
}

/// Signed modulo; the result takes the sign of the dividend
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(&a) {
        negate(remainder)
    } else {
        remainder
    }
}

/// (a + b) mod m over the full 257-bit sum
pub fn addmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        return U256::zero();
    }
    low_half((U512::from(a) + U512::from(b)) % U512::from(m))
}

/// (a * b) mod m over the full 512-bit product
pub fn mulmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        return U256::zero();
    }
    low_half(a.full_mul(b) % U512::from(m))
}

/// a^e mod 2^256
pub fn exp(base: U256, exponent: U256) -> U256 {
    base.overflowing_pow(exponent).0
}

/// Number of bytes in `x` after stripping leading zeroes
#[inline]
pub fn byte_len(x: &U256) -> u64 {
    (x.bits() as u64).div_ceil(8)
}

/// Extend the sign bit of byte `b` (counted from the least significant end)
pub fn signextend(b: U256, x: U256) -> U256 {
    if b >= U256::from(31u64) {
        return x;
    }
    let bit = (b.low_u64() * 8 + 7) as usize;
    let mask = (U256::one() << (bit + 1)) - U256::one();
    if x.bit(bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// Signed less-than
pub fn slt(a: &U256, b: &U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater-than
pub fn sgt(a: &U256, b: &U256) -> bool {
    slt(b, a)
}

/// i-th byte counting from the most significant end; zero when i >= 32
pub fn byte(i: U256, x: U256) -> U256 {
    if i >= U256::from(32u64) {
        return U256::zero();
    }
    U256::from(x.byte(31 - i.low_u64() as usize))
}

/// Logical shift left
pub fn shl(shift: U256, x: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        x << shift.low_u64() as usize
    }
}

/// Logical shift right
pub fn shr(shift: U256, x: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        x >> shift.low_u64() as usize
    }
}

/// Arithmetic shift right
pub fn sar(shift: U256, x: U256) -> U256 {
    let negative = is_negative(&x);
    if shift >= U256::from(256u64) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!x) >> shift)
    } else {
        x >> shift
    }
}

/// Boolean to word
#[inline]
pub fn from_bool(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

/// Convert to u64, or None when the value does not fit
#[inline]
pub fn to_u64(x: &U256) -> Option<u64> {
    if x.bits() > 64 {
        None
    } else {
        Some(x.low_u64())
    }
}

/// Convert to u64, clamping at u64::MAX
#[inline]
pub fn saturating_u64(x: &U256) -> u64 {
    to_u64(x).unwrap_or(u64::MAX)
}

/// Word from up to 32 big-endian bytes, right-padded with zeroes when short
pub fn from_padded_be(bytes: &[u8], width: usize) -> U256 {
    let mut buf = [0u8; 32];
    let n = bytes.len().min(width).min(32);
    buf[32 - width..32 - width + n].copy_from_slice(&bytes[..n]);
    U256::from_big_endian(&buf)
}

/// Big-endian 32-byte encoding
#[inline]
pub fn to_be_bytes(x: &U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    x.to_big_endian(&mut buf);
    buf
}
