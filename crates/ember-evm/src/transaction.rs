//! Transaction application
//!
//! [`apply_transaction`] validates a transaction against the sender's
//! account and the block, buys its gas, runs the message call or contract
//! creation, and settles refunds and fees. Validation failures are returned
//! as [`TxError`] before any state is touched.

use bytes::Bytes;
use ember_primitives::{Address, H256, U256};
use serde::Deserialize;
use tracing::debug;

use crate::config::Rules;
use crate::context::{BlockContext, CallFrame, TxContext};
use crate::error::TxError;
use crate::evm::{CreateInputs, Evm};
use crate::gas::{self, cost};
use crate::precompile;
use crate::result::ExitStatus;
use crate::state::{JournaledState, Log};
use crate::tracer::Tracer;

/// Version byte of a KZG commitment hash (EIP-4844)
pub const BLOB_HASH_VERSION: u8 = 0x01;

/// Blob limit per transaction (EIP-4844)
pub const MAX_BLOBS_PER_TX: usize = 6;

/// Gas pricing model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasPricing {
    /// Fixed gas price
    Legacy {
        /// Price per gas
        gas_price: U256,
    },
    /// Base fee plus tip (EIP-1559)
    DynamicFee {
        /// Maximum total price per gas
        max_fee: U256,
        /// Maximum tip per gas
        max_priority_fee: U256,
    },
}

impl GasPricing {
    /// Maximum price per gas the sender agreed to pay
    pub fn max_fee(&self) -> U256 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::DynamicFee { max_fee, .. } => *max_fee,
        }
    }

    /// Maximum tip per gas
    pub fn max_priority_fee(&self) -> U256 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::DynamicFee {
                max_priority_fee, ..
            } => *max_priority_fee,
        }
    }

    /// Price actually paid per gas: `min(max_fee, base_fee + tip)`
    pub fn effective_gas_price(&self, base_fee: U256) -> U256 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::DynamicFee {
                max_fee,
                max_priority_fee,
            } => (*max_fee).min(base_fee.saturating_add(*max_priority_fee)),
        }
    }
}

impl Default for GasPricing {
    fn default() -> Self {
        Self::Legacy {
            gas_price: U256::zero(),
        }
    }
}

/// Pre-declared account and slots (EIP-2930)
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Account to warm
    pub address: Address,
    /// Slots of `address` to warm
    pub storage_keys: Vec<H256>,
}

/// A transaction whose sender has already been recovered
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    /// Must equal the sender's nonce
    pub nonce: u64,
    /// Gas bought up front
    pub gas_limit: u64,
    /// Fee model
    pub pricing: GasPricing,
    /// Recipient; `None` creates a contract from `data`
    pub to: Option<Address>,
    /// Value transferred
    pub value: U256,
    /// Calldata or initcode
    pub data: Bytes,
    /// Pre-warmed accounts and slots
    pub access_list: Vec<AccessListItem>,
    /// Blob commitment hashes (EIP-4844)
    pub blob_versioned_hashes: Vec<H256>,
    /// Blob fee cap; present only on blob transactions
    pub max_fee_per_blob_gas: Option<U256>,
}

impl Transaction {
    /// Creates a contract
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }

    /// Gas charged before execution starts
    pub fn intrinsic_gas(&self, rules: &Rules) -> u64 {
        let keys = self.access_list.iter().map(|item| item.storage_keys.len()).sum();
        gas::intrinsic_gas(&self.data, self.is_create(), self.access_list.len(), keys, rules)
    }

    /// Blob gas consumed by the attached blobs
    pub fn blob_gas(&self) -> u64 {
        gas::blob_gas(self.blob_versioned_hashes.len())
    }
}

/// Outcome of an applied transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionResult {
    /// How the outermost frame ended
    pub status: ExitStatus,
    /// Gas paid for, after the refund
    pub gas_used: u64,
    /// Refund credited back to the sender
    pub refund: u64,
    /// RETURN or REVERT payload of the outermost frame
    pub output: Bytes,
    /// Logs of a successful transaction
    pub logs: Vec<Log>,
    /// Deployed contract of a successful creation
    pub created_address: Option<Address>,
}

impl TransactionResult {
    /// Execution committed its state changes
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Apply `tx` from `sender` on top of `state`.
///
/// On `Err` the state is unchanged. On `Ok` the gas has been paid, the
/// execution's changes are committed (or reverted, if it failed) and the
/// transaction boundary has been closed with [`JournaledState::finalize`].
pub fn apply_transaction(
    state: &mut JournaledState,
    block: &BlockContext,
    tx: &Transaction,
    sender: Address,
    rules: &Rules,
    tracer: Option<&mut dyn Tracer>,
) -> Result<TransactionResult, TxError> {
    let base_fee = if rules.is_london { block.base_fee } else { U256::zero() };
    validate(state, block, tx, sender, rules, base_fee)?;

    let gas_price = tx.pricing.effective_gas_price(base_fee);
    let intrinsic = tx.intrinsic_gas(rules);
    debug!(
        %sender,
        nonce = tx.nonce,
        gas_limit = tx.gas_limit,
        intrinsic,
        create = tx.is_create(),
        "applying transaction"
    );

    // Buy gas; blob gas is burned in full
    let prepaid = U256::from(tx.blob_gas())
        .checked_mul(block.blob_base_fee())
        .and_then(|blob_fee| U256::from(tx.gas_limit).checked_mul(gas_price)?.checked_add(blob_fee))
        .ok_or_else(|| TxError::InsufficientFunds {
            required: U256::MAX,
            available: state.get_balance(&sender),
        })?;
    state
        .sub_balance(sender, prepaid)
        .map_err(|_| TxError::InsufficientFunds {
            required: prepaid,
            available: state.get_balance(&sender),
        })?;
    if !tx.is_create() {
        // Creation bumps the nonce when deriving the new address
        state.set_nonce(sender, tx.nonce + 1);
    }

    if rules.is_berlin {
        warm_access_list(state, block, tx, sender, rules);
    }

    let tx_context = TxContext {
        origin: sender,
        gas_price,
        blob_hashes: tx.blob_versioned_hashes.clone(),
    };
    let gas = tx.gas_limit - intrinsic;
    let result = {
        let mut evm = Evm::new(state, block, &tx_context, *rules);
        if let Some(tracer) = tracer {
            evm = evm.with_tracer(tracer);
        }
        match tx.to {
            Some(to) => evm.call(
                CallFrame::new(to, Bytes::new(), gas)
                    .with_caller(sender)
                    .with_value(tx.value)
                    .with_input(tx.data.clone()),
            ),
            None => evm.create(CreateInputs {
                caller: sender,
                value: tx.value,
                init_code: tx.data.clone(),
                gas,
                salt: None,
                depth: 0,
            }),
        }
    };

    let gas_used = tx.gas_limit - result.gas_left;
    let refund = state.get_refund().min(gas_used / rules.max_refund_quotient());
    let gas_used = gas_used - refund;
    let gas_returned = tx.gas_limit - gas_used;

    state.add_balance(sender, U256::from(gas_returned) * gas_price);
    let tip = gas_price.saturating_sub(base_fee);
    state.add_balance(block.coinbase, U256::from(gas_used) * tip);

    let logs = state.finalize(rules);
    debug!(
        status = result.status.as_str(),
        gas_used,
        refund,
        logs = logs.len(),
        "transaction applied"
    );

    Ok(TransactionResult {
        gas_used,
        refund,
        logs,
        created_address: result.created,
        output: result.output,
        status: result.status,
    })
}

/// Reject transactions that cannot be included. Reads only.
fn validate(
    state: &mut JournaledState,
    block: &BlockContext,
    tx: &Transaction,
    sender: Address,
    rules: &Rules,
    base_fee: U256,
) -> Result<(), TxError> {
    let expected = state.get_nonce(&sender);
    if expected != tx.nonce {
        return Err(TxError::NonceMismatch {
            expected,
            got: tx.nonce,
        });
    }
    if expected == u64::MAX {
        return Err(TxError::NonceOverflow);
    }
    // EIP-3607
    if state.get_code_size(&sender) != 0 {
        return Err(TxError::SenderNotEoa);
    }

    if tx.gas_limit > block.gas_limit {
        return Err(TxError::GasLimitExceedsBlock {
            limit: tx.gas_limit,
            block_limit: block.gas_limit,
        });
    }
    if rules.is_london {
        if tx.pricing.max_priority_fee() > tx.pricing.max_fee() {
            return Err(TxError::PriorityFeeGreaterThanMaxFee);
        }
        if tx.pricing.max_fee() < base_fee {
            return Err(TxError::FeeCapTooLow {
                max_fee: tx.pricing.max_fee(),
                base_fee,
            });
        }
    }

    let mut blob_cost = U256::zero();
    if let Some(max_blob_fee) = tx.max_fee_per_blob_gas {
        let hashes = &tx.blob_versioned_hashes;
        if !rules.is_cancun
            || tx.is_create()
            || hashes.is_empty()
            || hashes.len() > MAX_BLOBS_PER_TX
            || hashes.iter().any(|h| h.as_bytes()[0] != BLOB_HASH_VERSION)
        {
            return Err(TxError::InvalidBlobTransaction);
        }
        if max_blob_fee < block.blob_base_fee() {
            return Err(TxError::BlobFeeCapTooLow);
        }
        blob_cost = U256::from(tx.blob_gas())
            .checked_mul(max_blob_fee)
            .unwrap_or(U256::MAX);
    }

    // An unrepresentable cost is more than any balance can cover
    let available = state.get_balance(&sender);
    let required = U256::from(tx.gas_limit)
        .checked_mul(tx.pricing.max_fee())
        .and_then(|gas_cost| gas_cost.checked_add(tx.value))
        .and_then(|cost| cost.checked_add(blob_cost));
    match required {
        Some(required) if required <= available => {}
        required => {
            return Err(TxError::InsufficientFunds {
                required: required.unwrap_or(U256::MAX),
                available,
            })
        }
    }

    let intrinsic = tx.intrinsic_gas(rules);
    if tx.gas_limit < intrinsic {
        return Err(TxError::IntrinsicGasTooLow {
            required: intrinsic,
            limit: tx.gas_limit,
        });
    }
    if rules.is_shanghai && tx.is_create() && tx.data.len() > cost::MAX_INIT_CODE_SIZE {
        return Err(TxError::InitCodeSizeExceeded(tx.data.len()));
    }
    Ok(())
}

/// Warm the sender, recipient, precompiles, declared entries and, from
/// Shanghai, the coinbase (EIP-2929, EIP-2930, EIP-3651)
fn warm_access_list(
    state: &mut JournaledState,
    block: &BlockContext,
    tx: &Transaction,
    sender: Address,
    rules: &Rules,
) {
    state.add_address_to_access_list(sender);
    if let Some(to) = tx.to {
        state.add_address_to_access_list(to);
    }
    for address in precompile::addresses(rules) {
        state.add_address_to_access_list(address);
    }
    for item in &tx.access_list {
        state.add_address_to_access_list(item.address);
        for key in &item.storage_keys {
            state.add_slot_to_access_list(item.address, key.to_word());
        }
    }
    if rules.is_shanghai {
        state.add_address_to_access_list(block.coinbase);
    }
}
