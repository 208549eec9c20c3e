//! # ember-evm-tests
//!
//! Runs ethereum/tests `GeneralStateTests` fixtures against the Ember EVM.
//!
//! Each fixture names a pre-state, a block environment, a transaction
//! template and per-fork post-state expectations. The runner picks one fork
//! per test (the requested one, or the newest supported fork present), builds
//! the transaction for every `(data, gas, value)` index triple, applies it
//! and compares the post-state, its root and the logs hash.
//!
//! Entries carrying `expectException` are skipped.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod runner;
mod state_test;
mod types;

pub use ember_evm::config::SUPPORTED_FORKS;
pub use error::{TestError, TestResult};
pub use runner::{TestRunner, TestStats};
pub use state_test::{build_transaction, Outcome, StateTestResults, StateTestRunner, FORK_PRIORITY};
pub use types::*;
