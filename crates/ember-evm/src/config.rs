//! Chain configuration and fork activation rules

use serde::{Deserialize, Serialize};

/// Fork activation schedule.
///
/// Block-activated forks up to the merge netsplit, timestamp-activated forks
/// afterwards. `None` means the fork never activates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Chain ID returned by CHAINID
    pub chain_id: u64,
    /// Homestead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homestead_block: Option<u64>,
    /// Tangerine Whistle (EIP-150)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip150_block: Option<u64>,
    /// Spurious Dragon (EIP-155, EIP-158/161, EIP-170)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip155_block: Option<u64>,
    /// Byzantium
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byzantium_block: Option<u64>,
    /// Constantinople
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constantinople_block: Option<u64>,
    /// Petersburg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub petersburg_block: Option<u64>,
    /// Istanbul
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub istanbul_block: Option<u64>,
    /// Berlin (EIP-2929, EIP-2930)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berlin_block: Option<u64>,
    /// London (EIP-1559, EIP-3529, EIP-3541)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub london_block: Option<u64>,
    /// The merge (PREVRANDAO)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_netsplit_block: Option<u64>,
    /// Shanghai (PUSH0, EIP-3651, EIP-3860)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shanghai_time: Option<u64>,
    /// Cancun (EIP-1153, EIP-4844, EIP-5656, EIP-6780, EIP-7516)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancun_time: Option<u64>,
}

/// Fork names accepted by [`ChainConfig::for_fork`], oldest first
pub const SUPPORTED_FORKS: &[&str] = &["Berlin", "London", "Paris", "Shanghai", "Cancun"];

impl ChainConfig {
    /// Every supported fork active from genesis (Cancun rules)
    pub fn mainnet_all_active() -> Self {
        Self {
            chain_id: 1,
            homestead_block: Some(0),
            eip150_block: Some(0),
            eip155_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            petersburg_block: Some(0),
            istanbul_block: Some(0),
            berlin_block: Some(0),
            london_block: Some(0),
            merge_netsplit_block: Some(0),
            shanghai_time: Some(0),
            cancun_time: Some(0),
        }
    }

    /// Configuration with every fork up to and including `name` active at
    /// genesis. Accepts state-test fork names; `Merge` is an alias of `Paris`.
    pub fn for_fork(name: &str) -> Option<Self> {
        let mut config = Self::mainnet_all_active();
        match name {
            "Cancun" => {}
            "Shanghai" => {
                config.cancun_time = None;
            }
            "Paris" | "Merge" => {
                config.cancun_time = None;
                config.shanghai_time = None;
            }
            "London" => {
                config.cancun_time = None;
                config.shanghai_time = None;
                config.merge_netsplit_block = None;
            }
            "Berlin" => {
                config.cancun_time = None;
                config.shanghai_time = None;
                config.merge_netsplit_block = None;
                config.london_block = None;
            }
            _ => return None,
        }
        Some(config)
    }

    /// Rules in force for a block
    pub fn rules(&self, number: u64, timestamp: u64) -> Rules {
        let block = |fork: Option<u64>| fork.is_some_and(|at| number >= at);
        let time = |fork: Option<u64>| fork.is_some_and(|at| timestamp >= at);
        let is_merge = block(self.merge_netsplit_block);
        Rules {
            chain_id: self.chain_id,
            is_homestead: block(self.homestead_block),
            is_eip150: block(self.eip150_block),
            is_eip158: block(self.eip155_block),
            is_byzantium: block(self.byzantium_block),
            is_constantinople: block(self.constantinople_block),
            is_petersburg: block(self.petersburg_block),
            is_istanbul: block(self.istanbul_block),
            is_berlin: block(self.berlin_block),
            is_london: block(self.london_block),
            is_merge,
            is_shanghai: is_merge && time(self.shanghai_time),
            is_cancun: is_merge && time(self.cancun_time),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet_all_active()
    }
}

/// Flattened fork flags for one block. The interpreter and the transaction
/// applier consult only this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Rules {
    pub chain_id: u64,
    pub is_homestead: bool,
    pub is_eip150: bool,
    pub is_eip158: bool,
    pub is_byzantium: bool,
    pub is_constantinople: bool,
    pub is_petersburg: bool,
    pub is_istanbul: bool,
    pub is_berlin: bool,
    pub is_london: bool,
    pub is_merge: bool,
    pub is_shanghai: bool,
    pub is_cancun: bool,
}

impl Rules {
    /// Cancun rules on chain 1
    pub fn cancun() -> Self {
        ChainConfig::mainnet_all_active().rules(0, 0)
    }

    /// Refund cap divisor (EIP-3529)
    pub fn max_refund_quotient(&self) -> u64 {
        if self.is_london {
            5
        } else {
            2
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::cancun()
    }
}
