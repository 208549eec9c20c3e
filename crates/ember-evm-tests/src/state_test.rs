//! State test runner

use std::path::Path;

use bytes::Bytes;
use ember_crypto::secret_key_to_address;
use ember_evm::{
    apply_transaction, AccessListItem, BlockContext, ChainConfig, GasPricing, JournaledState,
    Transaction,
};
use ember_primitives::{Address, H256, U256};
use ember_trie::{logs_hash, state_root};
use tracing::{debug, info, warn};

use crate::error::{TestError, TestResult};
use crate::types::*;

/// Forks tried, in order, when no fork is requested
pub const FORK_PRIORITY: &[&str] = &["Cancun", "Shanghai", "Paris", "London", "Berlin"];

/// Result of one post entry that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Post-state matched
    Passed,
    /// Not executed, with the reason
    Skipped(String),
}

/// State test runner
#[derive(Debug, Clone)]
pub struct StateTestRunner {
    /// Requested fork, or [`FORK_PRIORITY`] when `None`
    fork: Option<String>,
    /// Log every passing entry
    verbose: bool,
}

impl StateTestRunner {
    /// Create a runner, rejecting unknown fork names
    pub fn new(fork: Option<&str>, verbose: bool) -> TestResult<Self> {
        if let Some(name) = fork {
            if ChainConfig::for_fork(name).is_none() {
                return Err(TestError::UnsupportedFork(name.to_string()));
            }
        }
        Ok(Self {
            fork: fork.map(str::to_string),
            verbose,
        })
    }

    /// Fork to run and its post entries
    pub fn select_fork<'t>(&self, test: &'t StateTestCase) -> Option<(&'t str, &'t [PostStateResult])> {
        let wanted: Vec<&str> = match &self.fork {
            Some(fork) => vec![fork.as_str()],
            None => FORK_PRIORITY.to_vec(),
        };
        wanted.into_iter().find_map(|fork| {
            test.post
                .get_key_value(fork)
                .map(|(name, entries)| (name.as_str(), entries.as_slice()))
        })
    }

    /// Run all tests in a file
    pub fn run_file(&self, path: &Path) -> TestResult<StateTestResults> {
        let content = std::fs::read_to_string(path)?;
        let tests: StateTestFile = serde_json::from_str(&content)?;
        let file = path.to_string_lossy().to_string();

        Ok(self.run_tests(file, &tests))
    }

    /// Run parsed tests
    pub fn run_tests(&self, file: String, tests: &StateTestFile) -> StateTestResults {
        let mut results = StateTestResults::new(file);

        for (name, test_case) in tests {
            let Some((fork, entries)) = self.select_fork(test_case) else {
                let reason = match &self.fork {
                    Some(fork) => format!("fork {fork} not in test"),
                    None => "no supported fork in test".to_string(),
                };
                results.skipped.push((name.clone(), reason));
                continue;
            };

            for (idx, expected) in entries.iter().enumerate() {
                let test_name = format!("{name}_{fork}_{idx}");
                match self.run_case(test_case, fork, expected) {
                    Ok(Outcome::Passed) => {
                        if self.verbose {
                            info!(test = %test_name, "PASS");
                        }
                        results.passed.push(test_name);
                    }
                    Ok(Outcome::Skipped(reason)) => {
                        debug!(test = %test_name, %reason, "SKIP");
                        results.skipped.push((test_name, reason));
                    }
                    Err(e) => {
                        warn!(test = %test_name, error = %e, "FAIL");
                        results.failed.push((test_name, e.to_string()));
                    }
                }
            }
        }

        results
    }

    /// Run one post entry of `test` under `fork`
    pub fn run_case(
        &self,
        test: &StateTestCase,
        fork: &str,
        expected: &PostStateResult,
    ) -> TestResult<Outcome> {
        if let Some(exception) = &expected.expect_exception {
            return Ok(Outcome::Skipped(format!("expects exception {exception}")));
        }

        let config =
            ChainConfig::for_fork(fork).ok_or_else(|| TestError::UnsupportedFork(fork.to_string()))?;
        let block = block_context(&test.env, config.chain_id);
        let rules = config.rules(block.number, block.timestamp);
        let (sender, tx) = build_transaction(&test.transaction, expected.indexes)?;

        let mut state = JournaledState::new();
        for (address, account) in &test.pre {
            state.insert_account(*address, account.to_account());
        }

        let result = apply_transaction(&mut state, &block, &tx, sender, &rules, None)?;
        debug!(
            status = ?result.status,
            gas_used = result.gas_used,
            logs = result.logs.len(),
            "post entry executed"
        );

        if let Some(post) = &expected.state {
            check_accounts(&mut state, post)?;
        }
        if let Some(hash) = expected.hash {
            let root = state_root(&state)?;
            if root != hash {
                return Err(TestError::Assertion(format!("state root {root}, expected {hash}")));
            }
        }
        if let Some(logs) = expected.logs {
            let got = logs_hash(&result.logs);
            if got != logs {
                return Err(TestError::Assertion(format!("logs hash {got}, expected {logs}")));
            }
        }
        Ok(Outcome::Passed)
    }
}

fn block_context(env: &StateEnv, chain_id: u64) -> BlockContext {
    let number = env.current_number.0;
    let mut block = BlockContext {
        number,
        timestamp: env.current_timestamp.0,
        gas_limit: env.current_gas_limit.0,
        coinbase: env.current_coinbase,
        prevrandao: env.current_random.unwrap_or_default(),
        difficulty: env.current_difficulty.0,
        chain_id,
        base_fee: env.current_base_fee.map(|fee| fee.0).unwrap_or_default(),
        excess_blob_gas: env.current_excess_blob_gas.map(|gas| gas.0),
        ..BlockContext::default()
    };
    if let (Some(parent), Some(parent_number)) = (env.previous_hash, number.checked_sub(1)) {
        block.block_hashes.insert(parent_number, parent);
    }
    block
}

fn pick<'t, T>(options: &'t [T], index: usize, field: &str) -> TestResult<&'t T> {
    options
        .get(index)
        .ok_or_else(|| TestError::Parse(format!("{field} index {index} out of bounds")))
}

/// Sender and concrete transaction for one index triple
pub fn build_transaction(
    template: &StateTransaction,
    indexes: IndexSelector,
) -> TestResult<(Address, Transaction)> {
    let data = pick(&template.data, indexes.data, "data")?;
    let gas_limit = pick(&template.gas_limit, indexes.gas, "gas")?;
    let value = pick(&template.value, indexes.value, "value")?;

    let sender = match (template.sender, &template.secret_key) {
        (Some(sender), _) => sender,
        (None, Some(key)) => secret_key_to_address(key.as_bytes())?,
        (None, None) => {
            return Err(TestError::Parse("transaction has neither sender nor secretKey".into()))
        }
    };

    let pricing = match (template.gas_price, template.max_fee_per_gas) {
        (Some(price), _) => GasPricing::Legacy { gas_price: price.0 },
        (None, Some(max_fee)) => GasPricing::DynamicFee {
            max_fee: max_fee.0,
            max_priority_fee: template
                .max_priority_fee_per_gas
                .map(|fee| fee.0)
                .unwrap_or_default(),
        },
        (None, None) => return Err(TestError::Parse("transaction has no gas price".into())),
    };

    let access_list = template
        .access_lists
        .as_ref()
        .and_then(|lists| lists.get(indexes.data))
        .and_then(Option::as_ref)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| AccessListItem {
                    address: entry.address,
                    storage_keys: entry.storage_keys.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let tx = Transaction {
        nonce: template.nonce.0,
        gas_limit: gas_limit.0,
        pricing,
        to: template.to,
        value: value.0,
        data: Bytes::from(data.0.clone()),
        access_list,
        blob_versioned_hashes: template.blob_versioned_hashes.clone(),
        max_fee_per_blob_gas: template.max_fee_per_blob_gas.map(|fee| fee.0),
    };
    Ok((sender, tx))
}

/// Compare live accounts against a fixture's full post-state
fn check_accounts(
    state: &mut JournaledState,
    post: &std::collections::BTreeMap<Address, AccountState>,
) -> TestResult<()> {
    for (address, expected) in post {
        let account = state
            .account(address)
            .ok_or_else(|| TestError::Assertion(format!("{address}: account missing")))?;

        if account.balance != expected.balance.0 {
            return Err(TestError::Assertion(format!(
                "{address}: balance {}, expected {}",
                account.balance, expected.balance.0
            )));
        }
        if account.nonce != expected.nonce.0 {
            return Err(TestError::Assertion(format!(
                "{address}: nonce {}, expected {}",
                account.nonce, expected.nonce.0
            )));
        }
        if account.code.as_ref() != expected.code.0.as_slice() {
            return Err(TestError::Assertion(format!("{address}: code differs")));
        }

        let mut live: Vec<(U256, U256)> = account.storage_values().collect();
        live.sort();
        let wanted: Vec<(U256, U256)> = expected
            .storage
            .iter()
            .filter(|(_, value)| !value.0.is_zero())
            .map(|(key, value)| (key.0, value.0))
            .collect();
        if live != wanted {
            return Err(TestError::Assertion(format!(
                "{address}: storage {}, expected {}",
                format_slots(&live),
                format_slots(&wanted)
            )));
        }
    }
    Ok(())
}

fn format_slots(slots: &[(U256, U256)]) -> String {
    let entries: Vec<String> = slots
        .iter()
        .map(|(key, value)| format!("{}={}", H256::from_word(*key), H256::from_word(*value)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// State test results
#[derive(Debug)]
pub struct StateTestResults {
    /// File path
    pub file: String,
    /// Passed tests
    pub passed: Vec<String>,
    /// Failed tests (name, reason)
    pub failed: Vec<(String, String)>,
    /// Skipped tests (name, reason)
    pub skipped: Vec<(String, String)>,
}

impl StateTestResults {
    /// Create new results
    pub fn new(file: String) -> Self {
        Self {
            file,
            passed: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Total executed tests
    pub fn executed(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Total tests including skipped
    pub fn total(&self) -> usize {
        self.executed() + self.skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER: &str = r#"{
        "transfer": {
            "env": {
                "currentCoinbase": "0x2adc25665018aa1fe0e6bc666dac8fc2697ff9ba",
                "currentDifficulty": "0x020000",
                "currentGasLimit": "0x05f5e100",
                "currentNumber": "0x01",
                "currentTimestamp": "0x03e8",
                "currentBaseFee": "0x0a"
            },
            "pre": {
                "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b": {
                    "balance": "0x0de0b6b3a7640000", "code": "0x", "nonce": "0x00", "storage": {}
                }
            },
            "transaction": {
                "data": ["0x"],
                "gasLimit": ["0x5208"],
                "gasPrice": "0x0a",
                "nonce": "0x00",
                "secretKey": "0x45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8",
                "to": "0x00000000000000000000000000000000000000b0",
                "value": ["0x01"]
            },
            "post": {
                "London": [
                    { "indexes": { "data": 0, "gas": 0, "value": 0 },
                      "state": { "0x00000000000000000000000000000000000000b0": { "balance": "0x01" } } }
                ],
                "Berlin": [
                    { "indexes": { "data": 0, "gas": 0, "value": 0 }, "expectException": "TR_Whatever" }
                ]
            }
        }
    }"#;

    fn tests() -> StateTestFile {
        serde_json::from_str(TRANSFER).unwrap()
    }

    #[test]
    fn test_fork_priority() {
        let tests = tests();
        let runner = StateTestRunner::new(None, false).unwrap();
        let (fork, entries) = runner.select_fork(&tests["transfer"]).unwrap();
        assert_eq!(fork, "London");
        assert_eq!(entries.len(), 1);

        let berlin = StateTestRunner::new(Some("Berlin"), false).unwrap();
        assert_eq!(berlin.select_fork(&tests["transfer"]).unwrap().0, "Berlin");

        let cancun = StateTestRunner::new(Some("Cancun"), false).unwrap();
        assert!(cancun.select_fork(&tests["transfer"]).is_none());
    }

    #[test]
    fn test_unknown_fork_rejected() {
        assert!(matches!(
            StateTestRunner::new(Some("Frontier"), false),
            Err(TestError::UnsupportedFork(_))
        ));
        assert!(ember_evm::config::SUPPORTED_FORKS.contains(&"Paris"));
    }

    #[test]
    fn test_sender_from_secret_key() {
        let tests = tests();
        let indexes = IndexSelector {
            data: 0,
            gas: 0,
            value: 0,
        };
        let (sender, tx) = build_transaction(&tests["transfer"].transaction, indexes).unwrap();
        assert_eq!(
            sender,
            Address::from_hex("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b").unwrap()
        );
        assert_eq!(tx.gas_limit, 21000);
        assert_eq!(tx.value, U256::one());
    }

    #[test]
    fn test_run_tests_counts() {
        let tests = tests();
        let results = StateTestRunner::new(None, false).unwrap().run_tests("inline".into(), &tests);
        assert_eq!(results.passed, vec!["transfer_London_0".to_string()]);
        assert!(results.failed.is_empty());

        let berlin = StateTestRunner::new(Some("Berlin"), false).unwrap().run_tests("inline".into(), &tests);
        assert_eq!(berlin.skipped.len(), 1);
        assert_eq!(berlin.executed(), 0);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let tests = tests();
        let indexes = IndexSelector {
            data: 3,
            gas: 0,
            value: 0,
        };
        assert!(matches!(
            build_transaction(&tests["transfer"].transaction, indexes),
            Err(TestError::Parse(_))
        ));
    }
}
