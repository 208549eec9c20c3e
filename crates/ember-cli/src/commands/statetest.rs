//! `ember statetest`

use std::path::PathBuf;

use clap::Args;
use ember_evm_tests::TestRunner;

use super::chain_config;
use crate::{CliError, Output};

/// Run state-test fixtures
#[derive(Debug, Args)]
pub struct StateTestArgs {
    /// Fixture file or directory
    pub path: PathBuf,
    /// Only run post entries for this fork
    #[arg(long)]
    pub fork: Option<String>,
    /// Log every test result
    #[arg(long, short)]
    pub verbose: bool,
}

impl StateTestArgs {
    /// Run every fixture under `path` and fail if any test failed
    pub fn execute(&self, json: bool) -> Result<(), CliError> {
        if let Some(fork) = &self.fork {
            chain_config(fork)?;
        }
        let runner = TestRunner::new(self.fork.as_deref(), self.verbose)?;
        let stats = runner.run_path(&self.path)?;

        if json {
            Output::new(true)
                .field_u64("files", stats.files as u64)
                .field_u64("total", stats.total as u64)
                .field_u64("passed", stats.passed as u64)
                .field_u64("failed", stats.failed as u64)
                .field_u64("skipped", stats.skipped as u64)
                .field_serialize("failures", &stats.failures)
                .print();
        } else {
            stats.print_summary();
        }

        if stats.is_success() {
            Ok(())
        } else {
            Err(CliError::TestsFailed(stats.failed))
        }
    }
}
