//! Sub-command implementations

pub mod disasm;
pub mod run;
pub mod statetest;

use ember_evm::ChainConfig;

use crate::CliError;

/// Resolve a fork name to its chain configuration
pub(crate) fn chain_config(fork: &str) -> Result<ChainConfig, CliError> {
    ChainConfig::for_fork(fork).ok_or_else(|| CliError::UnknownFork(fork.to_string()))
}
