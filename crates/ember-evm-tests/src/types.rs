//! Type definitions for the ethereum/tests state-test JSON format

use std::collections::BTreeMap;

use bytes::Bytes;
use ember_evm::Account;
use ember_primitives::{parse_bytes, parse_u256, parse_u64, Address, H256, U256};
use serde::{Deserialize, Deserializer};

/// Hex-encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        parse_bytes(&s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded 256-bit number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU256(pub U256);

impl<'de> Deserialize<'de> for HexU256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        parse_u256(&s).map(HexU256).map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded u64
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexU64(pub u64);

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        parse_u64(&s).map(HexU64).map_err(serde::de::Error::custom)
    }
}

/// `to` field: empty string or null means contract creation
fn deserialize_to<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") | Some("0x") => Ok(None),
        Some(s) => Address::from_hex(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// State test file: test name to test case
pub type StateTestFile = BTreeMap<String, StateTestCase>;

/// Single state test case
#[derive(Debug, Deserialize)]
pub struct StateTestCase {
    /// Block environment
    pub env: StateEnv,
    /// Pre-execution state
    pub pre: BTreeMap<Address, AccountState>,
    /// Transaction template
    pub transaction: StateTransaction,
    /// Post-state expectations per fork
    pub post: BTreeMap<String, Vec<PostStateResult>>,
}

/// State test environment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEnv {
    /// Fee recipient
    pub current_coinbase: Address,
    /// Difficulty (pre-merge)
    #[serde(default)]
    pub current_difficulty: HexU256,
    /// Block gas limit
    pub current_gas_limit: HexU64,
    /// Block number
    pub current_number: HexU64,
    /// Block timestamp
    pub current_timestamp: HexU64,
    /// Parent hash
    #[serde(default)]
    pub previous_hash: Option<H256>,
    /// Base fee (EIP-1559)
    #[serde(default)]
    pub current_base_fee: Option<HexU256>,
    /// PREVRANDAO (post-merge)
    #[serde(default)]
    pub current_random: Option<H256>,
    /// Excess blob gas (EIP-4844)
    #[serde(default)]
    pub current_excess_blob_gas: Option<HexU64>,
}

/// State test transaction
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransaction {
    /// Calldata options
    pub data: Vec<HexBytes>,
    /// Gas limit options
    pub gas_limit: Vec<HexU64>,
    /// Legacy gas price
    #[serde(default)]
    pub gas_price: Option<HexU256>,
    /// Max fee per gas (EIP-1559)
    #[serde(default)]
    pub max_fee_per_gas: Option<HexU256>,
    /// Max priority fee per gas (EIP-1559)
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<HexU256>,
    /// Nonce
    pub nonce: HexU64,
    /// Sender, derived from the secret key when absent
    #[serde(default)]
    pub sender: Option<Address>,
    /// Sender's secret key
    #[serde(default)]
    pub secret_key: Option<H256>,
    /// Recipient, `None` for contract creation
    #[serde(default, deserialize_with = "deserialize_to")]
    pub to: Option<Address>,
    /// Value options
    pub value: Vec<HexU256>,
    /// Access list per data index
    #[serde(default)]
    pub access_lists: Option<Vec<Option<Vec<AccessListEntry>>>>,
    /// Blob fee cap (EIP-4844)
    #[serde(default)]
    pub max_fee_per_blob_gas: Option<HexU256>,
    /// Blob versioned hashes (EIP-4844)
    #[serde(default)]
    pub blob_versioned_hashes: Vec<H256>,
}

/// Access list entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    /// Address
    pub address: Address,
    /// Storage keys
    pub storage_keys: Vec<H256>,
}

/// Post-state expectation for one index combination
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStateResult {
    /// Post-state root
    #[serde(default)]
    pub hash: Option<H256>,
    /// Index selectors
    pub indexes: IndexSelector,
    /// Logs hash
    #[serde(default)]
    pub logs: Option<H256>,
    /// Full post-state
    #[serde(default)]
    pub state: Option<BTreeMap<Address, AccountState>>,
    /// Signed transaction bytes
    #[serde(default)]
    pub txbytes: Option<HexBytes>,
    /// Expected rejection tag
    #[serde(default)]
    pub expect_exception: Option<String>,
}

/// Index selector for transaction variations
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IndexSelector {
    /// Data index
    pub data: usize,
    /// Gas index
    pub gas: usize,
    /// Value index
    pub value: usize,
}

/// Account state in `pre` and `post`
#[derive(Debug, Deserialize)]
pub struct AccountState {
    /// Balance
    #[serde(default)]
    pub balance: HexU256,
    /// Code
    #[serde(default)]
    pub code: HexBytes,
    /// Nonce
    #[serde(default)]
    pub nonce: HexU64,
    /// Storage
    #[serde(default)]
    pub storage: BTreeMap<HexKey, HexU256>,
}

/// Storage key usable as a map key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HexKey(pub U256);

impl<'de> Deserialize<'de> for HexKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        HexU256::deserialize(deserializer).map(|v| HexKey(v.0))
    }
}

impl AccountState {
    /// Convert to a journaled-state account
    pub fn to_account(&self) -> Account {
        Account::new()
            .with_balance(self.balance.0)
            .with_nonce(self.nonce.0)
            .with_code(Bytes::from(self.code.0.clone()))
            .with_storage(self.storage.iter().map(|(k, v)| (k.0, v.0)))
    }
}
