//! Genesis allocation
//!
//! A genesis file names the chain configuration and the accounts that exist
//! before the first transaction. Numbers are hex (`0x`-prefixed) or decimal
//! strings, as in geth genesis files.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use ember_primitives::{parse_bytes, parse_u256, parse_u64, Address, PrimitiveError, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ChainConfig, Rules};
use crate::context::BlockContext;
use crate::state::{Account, JournaledState};

/// Genesis loading errors
#[derive(Debug, Error)]
pub enum GenesisError {
    /// File could not be read
    #[error("failed to read genesis: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("invalid genesis json: {0}")]
    Json(#[from] serde_json::Error),

    /// A field failed to parse
    #[error("invalid genesis field `{field}` for {address}: {source}")]
    InvalidField {
        /// Account being loaded
        address: Address,
        /// Offending field
        field: &'static str,
        /// Parse failure
        source: PrimitiveError,
    },

    /// A header field failed to parse
    #[error("invalid genesis header: {0}")]
    Header(#[from] PrimitiveError),
}

/// Result type for genesis operations
pub type GenesisResult<T> = Result<T, GenesisError>;

/// One pre-funded account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// Balance in wei
    #[serde(default)]
    pub balance: String,
    /// Nonce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Runtime bytecode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Storage slot to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage: BTreeMap<String, String>,
}

impl GenesisAccount {
    /// Parse into a state account
    pub fn to_account(&self, address: Address) -> GenesisResult<Account> {
        let invalid = |field| move |source| GenesisError::InvalidField {
            address,
            field,
            source,
        };

        let balance = parse_u256(&self.balance).map_err(invalid("balance"))?;
        let nonce = match &self.nonce {
            Some(nonce) => parse_u64(nonce).map_err(invalid("nonce"))?,
            None => 0,
        };
        let code = match &self.code {
            Some(code) => parse_bytes(code).map_err(invalid("code"))?,
            None => Vec::new(),
        };
        let mut slots = Vec::with_capacity(self.storage.len());
        for (key, value) in &self.storage {
            let key = parse_u256(key).map_err(invalid("storage"))?;
            let value = parse_u256(value).map_err(invalid("storage"))?;
            slots.push((key, value));
        }

        Ok(Account::new()
            .with_balance(balance)
            .with_nonce(nonce)
            .with_code(Bytes::from(code))
            .with_storage(slots))
    }
}

/// Chain configuration plus initial allocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genesis {
    /// Fork schedule
    #[serde(default)]
    pub config: ChainConfig,
    /// Initial accounts
    #[serde(default)]
    pub alloc: BTreeMap<Address, GenesisAccount>,
    /// Genesis timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Block gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    /// Fee recipient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<Address>,
    /// Base fee of the first block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<String>,
    /// Pre-merge difficulty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Genesis {
    /// Parse a genesis document
    pub fn from_json(json: &str) -> GenesisResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a genesis file
    pub fn from_file(path: impl AsRef<Path>) -> GenesisResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Fresh state holding exactly the allocation
    pub fn to_state(&self) -> GenesisResult<JournaledState> {
        let mut state = JournaledState::new();
        self.apply(&mut state)?;
        Ok(state)
    }

    /// Insert every allocated account into `state`
    pub fn apply(&self, state: &mut JournaledState) -> GenesisResult<()> {
        for (address, entry) in &self.alloc {
            let account = entry.to_account(*address)?;
            debug!(%address, balance = %account.balance, nonce = account.nonce, "genesis allocation");
            state.insert_account(*address, account);
        }
        info!(accounts = self.alloc.len(), chain_id = self.config.chain_id, "genesis applied");
        Ok(())
    }

    /// Environment of the block built on top of genesis
    pub fn block_context(&self) -> GenesisResult<BlockContext> {
        let mut block = BlockContext {
            number: 1,
            chain_id: self.config.chain_id,
            ..BlockContext::default()
        };
        if let Some(timestamp) = &self.timestamp {
            block.timestamp = parse_u64(timestamp)?;
        }
        if let Some(gas_limit) = &self.gas_limit {
            block.gas_limit = parse_u64(gas_limit)?;
        }
        if let Some(coinbase) = self.coinbase {
            block.coinbase = coinbase;
        }
        if let Some(base_fee) = &self.base_fee_per_gas {
            block.base_fee = parse_u256(base_fee)?;
        }
        if let Some(difficulty) = &self.difficulty {
            block.difficulty = parse_u256(difficulty)?;
        }
        Ok(block)
    }

    /// Fork rules for `block`
    pub fn rules(&self, block: &BlockContext) -> Rules {
        self.config.rules(block.number, block.timestamp)
    }

    /// Total wei allocated
    pub fn total_balance(&self) -> GenesisResult<U256> {
        self.alloc.iter().try_fold(U256::zero(), |total, (address, entry)| {
            let balance = entry.to_account(*address)?.balance;
            Ok(total.saturating_add(balance))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = r#"{
        "config": { "chainId": 1337, "berlinBlock": 0, "londonBlock": 0 },
        "alloc": {
            "0x00000000000000000000000000000000000000aa": {
                "balance": "0x3e8",
                "nonce": "0x2",
                "code": "0x6001600055",
                "storage": { "0x01": "0x2a" }
            },
            "00000000000000000000000000000000000000bb": { "balance": "500" }
        },
        "gasLimit": "0x1c9c380",
        "baseFeePerGas": "0x7"
    }"#;

    #[test]
    fn test_genesis_alloc_applied() {
        let genesis = Genesis::from_json(GENESIS).unwrap();
        let mut state = genesis.to_state().unwrap();

        let a = Address::from_low_u64(0xaa);
        let b = Address::from_low_u64(0xbb);
        assert_eq!(state.get_balance(&a), U256::from(1000));
        assert_eq!(state.get_nonce(&a), 2);
        assert_eq!(state.get_code(&a).as_ref(), &[0x60, 0x01, 0x60, 0x00, 0x55]);
        assert_eq!(state.get_state(&a, &U256::one()), U256::from(0x2a));
        assert_eq!(state.get_balance(&b), U256::from(500));
        assert_eq!(genesis.total_balance().unwrap(), U256::from(1500));
    }

    #[test]
    fn test_genesis_without_transactions_is_unchanged() {
        let genesis = Genesis::from_json(GENESIS).unwrap();
        let mut state = genesis.to_state().unwrap();
        let logs = state.finalize(&Rules::cancun());
        assert!(logs.is_empty());
        assert_eq!(state.accounts().count(), 2);
        for (address, entry) in &genesis.alloc {
            assert_eq!(state.account(address), Some(&entry.to_account(*address).unwrap()));
        }
    }

    #[test]
    fn test_genesis_block_context() {
        let genesis = Genesis::from_json(GENESIS).unwrap();
        let block = genesis.block_context().unwrap();
        assert_eq!(block.chain_id, 1337);
        assert_eq!(block.gas_limit, 30_000_000);
        assert_eq!(block.base_fee, U256::from(7));

        let rules = genesis.rules(&block);
        assert!(rules.is_london);
        assert!(!rules.is_shanghai);
    }

    #[test]
    fn test_genesis_bad_field_names_account() {
        let json = r#"{ "alloc": { "0x00000000000000000000000000000000000000aa": { "balance": "0xzz" } } }"#;
        let genesis = Genesis::from_json(json).unwrap();
        let err = genesis.to_state().unwrap_err();
        assert!(matches!(err, GenesisError::InvalidField { field: "balance", .. }));
    }
}
