//! EVM error types

use ember_primitives::U256;
use thiserror::Error;

/// Frame-fatal execution errors.
///
/// Any of these halts the current frame, consumes its remaining gas and
/// unwinds its journal slice. `DepthLimit` and `InsufficientBalance` raised
/// by a CALL/CREATE opcode never reach the caller's frame: the opcode pushes
/// zero and execution continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas: {op} needs {needed}, have {have}")]
    OutOfGas {
        /// Mnemonic of the charging operation
        op: &'static str,
        /// Gas required
        needed: u64,
        /// Gas available
        have: u64,
    },

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid or not-yet-activated opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// State modification attempted inside a STATICCALL
    #[error("write protection")]
    WriteProtection,

    /// Call depth exceeded
    #[error("max call depth exceeded")]
    DepthLimit,

    /// Insufficient balance for value transfer
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// RETURNDATACOPY beyond the return data buffer
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Contract creation collision
    #[error("contract address collision")]
    CreateCollision,

    /// Deployed code above the EIP-170 limit
    #[error("max code size exceeded")]
    MaxCodeSizeExceeded,

    /// Initcode above the EIP-3860 limit
    #[error("max initcode size exceeded")]
    InitCodeSizeExceeded,

    /// Deployed code starting with 0xEF (EIP-3541)
    #[error("invalid code: must not begin with 0xef")]
    InvalidCodePrefix,

    /// Creator nonce at u64::MAX
    #[error("nonce overflow")]
    NonceOverflow,

    /// Precompile failure
    #[error("precompile failed: {0}")]
    Precompile(#[from] PrecompileError),

    /// Execution aborted by the step tracer
    #[error("execution aborted by tracer")]
    Aborted,
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;

/// Precompiled contract errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrecompileError {
    /// Supplied gas below the precompile's requirement
    #[error("out of gas")]
    OutOfGas,

    /// Malformed input (wrong length, invalid flag)
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Point not on the curve or not in the subgroup
    #[error("invalid curve point")]
    InvalidPoint,

    /// KZG proof rejected
    #[error("kzg proof verification failed: {0}")]
    Kzg(&'static str),
}

/// Transaction-level rejections. No state change from a rejected
/// transaction is persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// Transaction nonce differs from the sender's
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// Sender's current nonce
        expected: u64,
        /// Transaction nonce
        got: u64,
    },

    /// Sender nonce at u64::MAX
    #[error("sender nonce overflow")]
    NonceOverflow,

    /// Sender cannot cover gas and value
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Up-front cost plus value
        required: U256,
        /// Sender balance
        available: U256,
    },

    /// Gas limit below intrinsic cost
    #[error("intrinsic gas too low: required {required}, limit {limit}")]
    IntrinsicGasTooLow {
        /// Intrinsic gas
        required: u64,
        /// Transaction gas limit
        limit: u64,
    },

    /// Transaction gas limit above the block gas limit
    #[error("gas limit {limit} exceeds block gas limit {block_limit}")]
    GasLimitExceedsBlock {
        /// Transaction gas limit
        limit: u64,
        /// Block gas limit
        block_limit: u64,
    },

    /// max_fee_per_gas below the block base fee
    #[error("max fee per gas {max_fee} below base fee {base_fee}")]
    FeeCapTooLow {
        /// Offered fee cap
        max_fee: U256,
        /// Block base fee
        base_fee: U256,
    },

    /// max_priority_fee_per_gas above max_fee_per_gas
    #[error("max priority fee per gas higher than max fee per gas")]
    PriorityFeeGreaterThanMaxFee,

    /// Create transaction with oversized initcode (EIP-3860)
    #[error("initcode size {0} exceeds limit")]
    InitCodeSizeExceeded(usize),

    /// max_fee_per_blob_gas below the blob base fee
    #[error("max fee per blob gas below blob base fee")]
    BlobFeeCapTooLow,

    /// Blob transaction without blobs or creating a contract
    #[error("invalid blob transaction")]
    InvalidBlobTransaction,

    /// Sender has deployed code (EIP-3607)
    #[error("sender is not an externally owned account")]
    SenderNotEoa,
}

/// State backend failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Stored data failed to decode
    #[error("corrupt state data: {0}")]
    Corrupt(String),

    /// Referenced node or code is missing from the store
    #[error("missing state data: {0}")]
    Missing(String),
}
