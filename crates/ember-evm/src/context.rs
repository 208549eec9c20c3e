//! Execution context for EVM

use std::collections::BTreeMap;

use bytes::Bytes;
use ember_primitives::{Address, H256, U256};

use crate::gas;

/// Block environment information. Immutable for one transaction.
#[derive(Clone, Debug)]
pub struct BlockContext {
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block coinbase (fee recipient)
    pub coinbase: Address,
    /// PREVRANDAO after the merge
    pub prevrandao: H256,
    /// DIFFICULTY before the merge
    pub difficulty: U256,
    /// Chain ID
    pub chain_id: u64,
    /// Base fee (EIP-1559)
    pub base_fee: U256,
    /// Excess blob gas of the block (EIP-4844)
    pub excess_blob_gas: Option<u64>,
    /// Hashes of recent ancestors, keyed by block number
    pub block_hashes: BTreeMap<u64, H256>,
}

impl BlockContext {
    /// Blob base fee derived from the excess blob gas (EIP-7516)
    pub fn blob_base_fee(&self) -> U256 {
        gas::blob_base_fee(self.excess_blob_gas.unwrap_or(0))
    }

    /// BLOCKHASH lookup: only the 256 most recent ancestors are visible
    pub fn block_hash(&self, number: U256) -> H256 {
        let Some(requested) = crate::word::to_u64(&number) else {
            return H256::ZERO;
        };
        if requested >= self.number || self.number - requested > 256 {
            return H256::ZERO;
        }
        self.block_hashes.get(&requested).copied().unwrap_or(H256::ZERO)
    }
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            coinbase: Address::ZERO,
            prevrandao: H256::ZERO,
            difficulty: U256::zero(),
            chain_id: 1,
            base_fee: U256::zero(),
            excess_blob_gas: None,
            block_hashes: BTreeMap::new(),
        }
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Effective gas price
    pub gas_price: U256,
    /// Versioned hashes of the attached blobs (EIP-4844)
    pub blob_hashes: Vec<H256>,
}

/// How a frame was entered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// CALL or a transaction to an address
    Call,
    /// CALLCODE
    CallCode,
    /// DELEGATECALL
    DelegateCall,
    /// STATICCALL
    StaticCall,
    /// CREATE, CREATE2 or a creation transaction
    Create,
}

/// One activation of the interpreter.
///
/// `code` and `input` are reference-counted so a child frame running the
/// same code shares the buffer.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Account whose storage and balance the frame acts on (ADDRESS)
    pub address: Address,
    /// Account the code was loaded from
    pub code_address: Address,
    /// Caller (CALLER)
    pub caller: Address,
    /// Apparent value (CALLVALUE)
    pub value: U256,
    /// Calldata
    pub input: Bytes,
    /// Code being executed
    pub code: Bytes,
    /// Gas available to the frame
    pub gas: u64,
    /// State modifications forbidden (STATICCALL and below)
    pub is_static: bool,
    /// Call depth, 0 for the transaction frame
    pub depth: usize,
    /// Entry kind
    pub kind: CallKind,
}

impl CallFrame {
    /// Frame running `code` at `address` with no input, value or caller
    pub fn new(address: Address, code: Bytes, gas: u64) -> Self {
        Self {
            address,
            code_address: address,
            caller: Address::ZERO,
            value: U256::zero(),
            input: Bytes::new(),
            code,
            gas,
            is_static: false,
            depth: 0,
            kind: CallKind::Call,
        }
    }

    /// Set the calldata
    pub fn with_input(mut self, input: impl Into<Bytes>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the caller
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = caller;
        self
    }

    /// Set the apparent value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}
