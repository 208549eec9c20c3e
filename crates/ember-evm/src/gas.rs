//! Gas cost calculations

use ember_primitives::U256;

use crate::config::Rules;
use crate::word;

/// Gas costs for EVM operations
pub mod cost {
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;

    /// Exp gas
    pub const EXP: u64 = 10;
    /// Exp byte gas
    pub const EXP_BYTE: u64 = 50;
    /// SHA3 base gas
    pub const SHA3: u64 = 30;
    /// SHA3 word gas
    pub const SHA3_WORD: u64 = 6;

    /// Warm account or slot read (EIP-2929)
    pub const WARM_ACCESS: u64 = 100;
    /// Cold account access (EIP-2929)
    pub const COLD_ACCOUNT_ACCESS: u64 = 2600;
    /// Cold storage slot access (EIP-2929)
    pub const COLD_SLOAD: u64 = 2100;

    /// Sstore set gas
    pub const SSTORE_SET: u64 = 20000;
    /// Sstore reset gas (5000 minus the cold slot surcharge)
    pub const SSTORE_RESET: u64 = 2900;
    /// Sstore clear refund (EIP-3529)
    pub const SSTORE_CLEARS_REFUND: u64 = 4800;
    /// Sstore clear refund before London (EIP-2200)
    pub const SSTORE_CLEARS_REFUND_LEGACY: u64 = 15000;
    /// SSTORE fails when no more than this much gas is left (EIP-2200)
    pub const SSTORE_SENTRY: u64 = 2300;

    /// Log gas
    pub const LOG: u64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: u64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: u64 = 8;

    /// Create gas
    pub const CREATE: u64 = 32000;
    /// Initcode word gas (EIP-3860)
    pub const INITCODE_WORD: u64 = 2;
    /// Code deposit gas per byte
    pub const CODE_DEPOSIT: u64 = 200;
    /// Call value transfer gas
    pub const CALL_VALUE: u64 = 9000;
    /// Call new account gas
    pub const NEW_ACCOUNT: u64 = 25000;
    /// Call stipend
    pub const CALL_STIPEND: u64 = 2300;

    /// Memory gas per word
    pub const MEMORY: u64 = 3;
    /// Copy gas per word
    pub const COPY: u64 = 3;

    /// Transaction gas
    pub const TX: u64 = 21000;
    /// Transaction create gas
    pub const TX_CREATE: u64 = 32000;
    /// Transaction data zero byte
    pub const TX_DATA_ZERO: u64 = 4;
    /// Transaction data non-zero byte
    pub const TX_DATA_NONZERO: u64 = 16;
    /// Access list address gas
    pub const ACCESS_LIST_ADDRESS: u64 = 2400;
    /// Access list storage key gas
    pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;

    /// Selfdestruct gas
    pub const SELFDESTRUCT: u64 = 5000;
    /// Selfdestruct refund before London
    pub const SELFDESTRUCT_REFUND: u64 = 24000;

    /// Blob gas per blob (EIP-4844)
    pub const BLOB_GAS_PER_BLOB: u64 = 131072;
    /// Minimum blob base fee
    pub const MIN_BLOB_BASE_FEE: u64 = 1;
    /// Blob base fee update fraction (Cancun)
    pub const BLOB_BASE_FEE_UPDATE_FRACTION: u64 = 3338477;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Max code size (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
    /// Max init code size (EIP-3860)
    pub const MAX_INIT_CODE_SIZE: usize = 49152;
}

/// Number of 32-byte words covering `len` bytes
#[inline]
pub fn words(len: u64) -> u64 {
    len.div_ceil(32)
}

/// Total memory cost for a memory of `words` words: `3w + w²/512`
pub fn memory_gas(words: u64) -> u64 {
    let w = words as u128;
    let total = cost::MEMORY as u128 * w + w * w / 512;
    u64::try_from(total).unwrap_or(u64::MAX)
}

/// Surcharge for growing memory from `current_words` to `new_words`
pub fn memory_expansion_gas(current_words: u64, new_words: u64) -> u64 {
    if new_words <= current_words {
        return 0;
    }
    memory_gas(new_words).saturating_sub(memory_gas(current_words))
}

/// Per-word copy cost (CALLDATACOPY, CODECOPY, RETURNDATACOPY, EXTCODECOPY, MCOPY)
pub fn copy_gas(len: u64) -> u64 {
    cost::COPY.saturating_mul(words(len))
}

/// KECCAK256 cost: `30 + 6·words`
pub fn sha3_gas(len: u64) -> u64 {
    cost::SHA3.saturating_add(cost::SHA3_WORD.saturating_mul(words(len)))
}

/// LOGn cost: `375 + 375·n + 8·len`
pub fn log_gas(topics: usize, len: u64) -> u64 {
    cost::LOG
        .saturating_add(cost::LOG_TOPIC * topics as u64)
        .saturating_add(cost::LOG_DATA.saturating_mul(len))
}

/// EXP cost: `10 + 50·byte_len(exponent)`
pub fn exp_gas(exponent: &U256) -> u64 {
    cost::EXP + cost::EXP_BYTE * word::byte_len(exponent)
}

/// EIP-3860 initcode charge, also part of the create intrinsic gas
pub fn initcode_gas(len: u64) -> u64 {
    cost::INITCODE_WORD.saturating_mul(words(len))
}

/// CREATE2 hashing charge for the initcode
pub fn create2_hash_gas(len: u64) -> u64 {
    cost::SHA3_WORD.saturating_mul(words(len))
}

/// Surcharge on top of the warm base cost for touching an account
pub fn account_access_gas(is_cold: bool) -> u64 {
    if is_cold {
        cost::COLD_ACCOUNT_ACCESS - cost::WARM_ACCESS
    } else {
        0
    }
}

/// SLOAD cost: 2100 cold, 100 warm
pub fn sload_gas(is_cold: bool) -> u64 {
    if is_cold {
        cost::COLD_SLOAD
    } else {
        cost::WARM_ACCESS
    }
}

/// Gas and refund delta of one SSTORE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SstoreCost {
    /// Gas to charge, including the cold slot surcharge
    pub gas: u64,
    /// Signed change to the refund counter
    pub refund: i64,
}

/// SSTORE cost under EIP-2200 with EIP-2929 access costs and EIP-3529
/// refunds.
///
/// `original` is the slot value at transaction start, `current` the value
/// before this store, `new` the value being written.
pub fn sstore_gas(original: U256, current: U256, new: U256, is_cold: bool, rules: &Rules) -> SstoreCost {
    let clears_refund = if rules.is_london {
        cost::SSTORE_CLEARS_REFUND
    } else {
        cost::SSTORE_CLEARS_REFUND_LEGACY
    } as i64;
    let access = if is_cold { cost::COLD_SLOAD } else { 0 };

    // No-op
    if current == new {
        return SstoreCost {
            gas: access + cost::WARM_ACCESS,
            refund: 0,
        };
    }

    // Clean slot
    if original == current {
        if original.is_zero() {
            return SstoreCost {
                gas: access + cost::SSTORE_SET,
                refund: 0,
            };
        }
        let refund = if new.is_zero() { clears_refund } else { 0 };
        return SstoreCost {
            gas: access + cost::SSTORE_RESET,
            refund,
        };
    }

    // Dirty slot
    let mut refund = 0i64;
    if !original.is_zero() {
        if current.is_zero() {
            refund -= clears_refund;
        } else if new.is_zero() {
            refund += clears_refund;
        }
    }
    if original == new {
        refund += if original.is_zero() {
            (cost::SSTORE_SET - cost::WARM_ACCESS) as i64
        } else {
            (cost::SSTORE_RESET - cost::WARM_ACCESS) as i64
        };
    }
    SstoreCost {
        gas: access + cost::WARM_ACCESS,
        refund,
    }
}

/// All but one 64th of `gas` (EIP-150)
pub fn all_but_one_64th(gas: u64) -> u64 {
    gas - gas / 64
}

/// Gas forwarded to a child frame: the requested amount capped at all but
/// one 64th of what is left after the call's own charges.
pub fn call_gas(available: u64, requested: U256, rules: &Rules) -> u64 {
    let requested = word::saturating_u64(&requested);
    if rules.is_eip150 {
        requested.min(all_but_one_64th(available))
    } else {
        requested
    }
}

/// Extra CALL charges on top of the warm base cost
pub fn call_extra_gas(is_cold: bool, transfers_value: bool, creates_account: bool) -> u64 {
    let mut gas = account_access_gas(is_cold);
    if transfers_value {
        gas += cost::CALL_VALUE;
    }
    if creates_account {
        gas += cost::NEW_ACCOUNT;
    }
    gas
}

/// Transaction intrinsic gas: base, calldata bytes, access list and, for
/// creations, the create surcharge plus initcode words (Shanghai).
pub fn intrinsic_gas(
    data: &[u8],
    is_create: bool,
    access_list_addresses: usize,
    access_list_keys: usize,
    rules: &Rules,
) -> u64 {
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    let nonzeros = data.len() as u64 - zeros;

    let mut gas = cost::TX;
    gas = gas.saturating_add(zeros * cost::TX_DATA_ZERO);
    gas = gas.saturating_add(nonzeros * cost::TX_DATA_NONZERO);
    if is_create {
        gas = gas.saturating_add(cost::TX_CREATE);
        if rules.is_shanghai {
            gas = gas.saturating_add(initcode_gas(data.len() as u64));
        }
    }
    gas = gas.saturating_add(access_list_addresses as u64 * cost::ACCESS_LIST_ADDRESS);
    gas.saturating_add(access_list_keys as u64 * cost::ACCESS_LIST_STORAGE_KEY)
}

/// `factor · e^(numerator / denominator)` by Taylor expansion (EIP-4844)
pub fn fake_exponential(factor: u64, numerator: u64, denominator: u64) -> U256 {
    let numerator = U256::from(numerator);
    let denominator = U256::from(denominator);
    let mut i = U256::one();
    let mut output = U256::zero();
    let mut accum = U256::from(factor).saturating_mul(denominator);
    while !accum.is_zero() {
        output = output.saturating_add(accum);
        accum = accum.saturating_mul(numerator) / denominator.saturating_mul(i);
        i += U256::one();
    }
    output / denominator
}

/// Blob base fee for a block's excess blob gas
pub fn blob_base_fee(excess_blob_gas: u64) -> U256 {
    fake_exponential(
        cost::MIN_BLOB_BASE_FEE,
        excess_blob_gas,
        cost::BLOB_BASE_FEE_UPDATE_FRACTION,
    )
}

/// Blob gas consumed by a transaction carrying `blobs` blobs
pub fn blob_gas(blobs: usize) -> u64 {
    cost::BLOB_GAS_PER_BLOB.saturating_mul(blobs as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;

    fn word(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_memory_gas() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        // 3·32 + 32²/512
        assert_eq!(memory_gas(32), 98);
        assert_eq!(memory_gas(1024), 3 * 1024 + 2048);
    }

    #[test]
    fn test_memory_expansion_gas() {
        // No expansion
        assert_eq!(memory_expansion_gas(1, 1), 0);
        assert_eq!(memory_expansion_gas(2, 1), 0);

        assert_eq!(memory_expansion_gas(0, 1), 3);
        assert_eq!(memory_expansion_gas(1, 2), 3);
        assert_eq!(
            memory_expansion_gas(10, 1000),
            memory_gas(1000) - memory_gas(10)
        );
        // Saturates instead of overflowing
        assert_eq!(memory_expansion_gas(0, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_copy_gas_word_rounding() {
        assert_eq!(copy_gas(0), 0);
        assert_eq!(copy_gas(1), 3);
        assert_eq!(copy_gas(32), 3);
        assert_eq!(copy_gas(33), 6);
        assert_eq!(copy_gas(64), 6);
    }

    #[test]
    fn test_sha3_gas() {
        assert_eq!(sha3_gas(0), 30);
        assert_eq!(sha3_gas(32), 36);
        assert_eq!(sha3_gas(33), 42);
    }

    #[test]
    fn test_log_gas() {
        assert_eq!(log_gas(0, 0), 375);
        assert_eq!(log_gas(4, 0), 375 * 5);
        assert_eq!(log_gas(2, 10), 375 * 3 + 80);
    }

    #[test]
    fn test_exp_gas_byte_count() {
        assert_eq!(exp_gas(&U256::zero()), 10);
        assert_eq!(exp_gas(&word(1)), 60);
        assert_eq!(exp_gas(&word(0x100)), 110);
        assert_eq!(exp_gas(&U256::MAX), 10 + 32 * 50);
    }

    #[test]
    fn test_initcode_and_create2_gas() {
        assert_eq!(initcode_gas(0), 0);
        assert_eq!(initcode_gas(33), 4);
        assert_eq!(create2_hash_gas(64), 12);
    }

    #[test]
    fn test_eip2929_cold_warm_costs() {
        assert_eq!(sload_gas(true), 2100);
        assert_eq!(sload_gas(false), 100);
        assert_eq!(account_access_gas(true) + cost::WARM_ACCESS, 2600);
        assert_eq!(account_access_gas(false), 0);
    }

    #[test]
    fn test_sstore_noop() {
        let rules = Rules::cancun();
        let c = sstore_gas(word(1), word(1), word(1), false, &rules);
        assert_eq!(c, SstoreCost { gas: 100, refund: 0 });
        let c = sstore_gas(word(0), word(0), word(0), true, &rules);
        assert_eq!(c, SstoreCost { gas: 2200, refund: 0 });
    }

    #[test]
    fn test_sstore_fresh_slot() {
        let rules = Rules::cancun();
        let c = sstore_gas(word(0), word(0), word(123), true, &rules);
        assert_eq!(c, SstoreCost { gas: 22100, refund: 0 });
    }

    #[test]
    fn test_sstore_reset_and_clear() {
        let rules = Rules::cancun();
        let c = sstore_gas(word(1), word(1), word(2), false, &rules);
        assert_eq!(c, SstoreCost { gas: 2900, refund: 0 });
        let c = sstore_gas(word(1), word(1), word(0), true, &rules);
        assert_eq!(c, SstoreCost { gas: 5000, refund: 4800 });
    }

    #[test]
    fn test_sstore_dirty_transitions() {
        let rules = Rules::cancun();
        // Restore a freshly set slot back to zero
        let c = sstore_gas(word(0), word(5), word(0), false, &rules);
        assert_eq!(c, SstoreCost { gas: 100, refund: 19900 });
        // Restore a modified slot to its original value
        let c = sstore_gas(word(1), word(2), word(1), false, &rules);
        assert_eq!(c, SstoreCost { gas: 100, refund: 2800 });
        // Undo an earlier clear
        let c = sstore_gas(word(1), word(0), word(2), false, &rules);
        assert_eq!(c, SstoreCost { gas: 100, refund: -4800 });
        // Clear a dirty slot
        let c = sstore_gas(word(1), word(2), word(0), false, &rules);
        assert_eq!(c, SstoreCost { gas: 100, refund: 4800 });
    }

    #[test]
    fn test_sstore_berlin_refund() {
        let berlin = ChainConfig::for_fork("Berlin").unwrap().rules(0, 0);
        let c = sstore_gas(word(1), word(1), word(0), false, &berlin);
        assert_eq!(c.refund, 15000);
    }

    #[test]
    fn test_call_gas_all_but_one_64th() {
        let rules = Rules::cancun();
        assert_eq!(all_but_one_64th(64), 63);
        assert_eq!(all_but_one_64th(6400), 6300);
        assert_eq!(call_gas(6400, word(1000), &rules), 1000);
        assert_eq!(call_gas(6400, U256::MAX, &rules), 6300);
    }

    #[test]
    fn test_call_extra_gas() {
        assert_eq!(call_extra_gas(false, false, false), 0);
        assert_eq!(call_extra_gas(true, false, false), 2500);
        assert_eq!(call_extra_gas(false, true, false), 9000);
        assert_eq!(call_extra_gas(true, true, true), 2500 + 9000 + 25000);
    }

    #[test]
    fn test_intrinsic_gas() {
        let rules = Rules::cancun();
        assert_eq!(intrinsic_gas(&[], false, 0, 0, &rules), 21000);
        assert_eq!(intrinsic_gas(&[0, 1, 0, 2], false, 0, 0, &rules), 21000 + 8 + 32);
        assert_eq!(intrinsic_gas(&[], true, 0, 0, &rules), 53000);
        // 33 bytes of initcode: two words
        assert_eq!(intrinsic_gas(&[1; 33], true, 0, 0, &rules), 53000 + 33 * 16 + 4);
        assert_eq!(intrinsic_gas(&[], false, 2, 3, &rules), 21000 + 4800 + 5700);
    }

    #[test]
    fn test_intrinsic_gas_pre_shanghai_create() {
        let london = ChainConfig::for_fork("London").unwrap().rules(0, 0);
        assert_eq!(intrinsic_gas(&[1; 33], true, 0, 0, &london), 53000 + 33 * 16);
    }

    #[test]
    fn test_blob_base_fee() {
        assert_eq!(blob_base_fee(0), U256::one());
        assert_eq!(blob_base_fee(cost::BLOB_GAS_PER_BLOB), U256::one());
        assert!(blob_base_fee(100 * cost::BLOB_BASE_FEE_UPDATE_FRACTION) > U256::from(u64::MAX));
        assert_eq!(blob_gas(3), 393216);
    }

    #[test]
    fn test_fake_exponential() {
        assert_eq!(fake_exponential(1, 0, 1), word(1));
        assert_eq!(fake_exponential(38493, 0, 1000), word(38493));
        assert_eq!(fake_exponential(0, 1234, 2345), word(0));
        assert_eq!(fake_exponential(1, 2, 1), word(6));
        assert_eq!(fake_exponential(2, 5, 2), word(23));
    }
}
