//! `ember run`
//!
//! Deploys a code snippet at a fixed receiver and calls it once. The state is
//! empty unless a genesis file is given.

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use ember_evm::{
    BlockContext, CallFrame, Evm, Genesis, JournaledState, LoggingTracer, Rules, StructLogger,
    Tracer, TxContext,
};
use ember_primitives::{parse_bytes, parse_u256, Address};
use tracing::{debug, info};

use super::chain_config;
use crate::{CliError, Config, Output};

/// Default caller of the snippet
pub const DEFAULT_SENDER: Address = Address::from_low_u64(0x1000);
/// Default account the snippet is deployed at
pub const DEFAULT_RECEIVER: Address = Address::from_low_u64(0x2000);

fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_hex(s).map_err(|e| e.to_string())
}

/// Execute bytecode in a fresh state
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Runtime bytecode as hex, `0x` optional
    pub code: String,
    /// Calldata as hex
    #[arg(long, default_value = "")]
    pub input: String,
    /// Gas given to the call (config default otherwise)
    #[arg(long)]
    pub gas: Option<u64>,
    /// Fork rules to run under (config default otherwise)
    #[arg(long)]
    pub fork: Option<String>,
    /// Call value in wei; the sender is funded with it
    #[arg(long, default_value = "0")]
    pub value: String,
    /// Caller address
    #[arg(long, value_parser = parse_address, default_value_t = DEFAULT_SENDER)]
    pub sender: Address,
    /// Address the code is deployed at
    #[arg(long, value_parser = parse_address, default_value_t = DEFAULT_RECEIVER)]
    pub receiver: Address,
    /// Genesis file providing the pre-state and block environment
    #[arg(long)]
    pub genesis: Option<PathBuf>,
    /// Record a struct log of every step
    #[arg(long)]
    pub trace: bool,
}

/// What one `ember run` produced
#[derive(Debug)]
pub struct RunOutcome {
    /// `stop`, `return`, `revert` or `error`
    pub status: &'static str,
    /// Error kind for failed frames
    pub error: Option<String>,
    /// Gas consumed by the call
    pub gas_used: u64,
    /// Return or revert data
    pub output: Bytes,
    /// Logs emitted
    pub logs: usize,
    /// State root after the call
    pub state_root: String,
    /// Steps recorded with `--trace`
    pub struct_logs: Option<StructLogger>,
}

impl RunArgs {
    /// Run the snippet and print the outcome
    pub fn execute(&self, config: &Config, json: bool) -> Result<(), CliError> {
        let outcome = self.run(config)?;

        let mut output = Output::new(json)
            .field("status", outcome.status)
            .field_u64("gasUsed", outcome.gas_used)
            .field("output", format!("0x{}", hex::encode(&outcome.output)))
            .field_u64("logs", outcome.logs as u64)
            .field("stateRoot", outcome.state_root.clone());
        if let Some(error) = &outcome.error {
            output = output.field("error", error.clone());
        }
        if let Some(logger) = &outcome.struct_logs {
            output = output.field_serialize("structLogs", &logger.logs());
            for log in logger.logs() {
                output = output.line(format!(
                    "{:>5} {:<14} gas={:<10} cost={:<6} depth={} stack={}",
                    log.pc,
                    log.op,
                    log.gas,
                    log.gas_cost,
                    log.depth,
                    log.stack.len()
                ));
            }
        }

        let status = match &outcome.error {
            Some(error) => format!("{} ({error})", outcome.status),
            None => outcome.status.to_string(),
        };
        output
            .line(format!("Status:     {status}"))
            .line(format!("Gas used:   {}", outcome.gas_used))
            .line(format!("Output:     0x{}", hex::encode(&outcome.output)))
            .line(format!("Logs:       {}", outcome.logs))
            .line(format!("State root: {}", outcome.state_root))
            .print();
        Ok(())
    }

    /// Deploy the snippet, call it once and finalize the state
    pub fn run(&self, config: &Config) -> Result<RunOutcome, CliError> {
        let code = Bytes::from(parse_bytes(&self.code)?);
        let input = Bytes::from(parse_bytes(&self.input)?);
        let value = parse_u256(&self.value)?;
        let gas = self.gas.unwrap_or(config.gas_limit);

        let (mut state, block, rules) = self.environment(config)?;
        state.set_code(self.receiver, code);
        state.add_balance(self.sender, value);
        let tx = TxContext {
            origin: self.sender,
            ..TxContext::default()
        };
        debug!(sender = %self.sender, receiver = %self.receiver, gas, %value, "running snippet");

        let frame = CallFrame::new(self.receiver, Bytes::new(), gas)
            .with_caller(self.sender)
            .with_value(value)
            .with_input(input);

        let mut struct_logger = StructLogger::new();
        let mut logging_tracer = LoggingTracer;
        let tracer: &mut dyn Tracer = if self.trace {
            &mut struct_logger
        } else {
            &mut logging_tracer
        };
        let result = Evm::new(&mut state, &block, &tx, rules)
            .with_tracer(tracer)
            .call(frame);

        let logs = state.finalize(&rules);
        let state_root = ember_trie::state_root(&state)?;
        let gas_used = gas.saturating_sub(result.gas_left);
        info!(status = result.status.as_str(), gas_used, logs = logs.len(), "snippet finished");

        Ok(RunOutcome {
            status: result.status.as_str(),
            error: result.error_kind().map(ToString::to_string),
            gas_used,
            output: result.output,
            logs: logs.len(),
            state_root: state_root.to_string(),
            struct_logs: self.trace.then_some(struct_logger),
        })
    }

    fn environment(&self, config: &Config) -> Result<(JournaledState, BlockContext, Rules), CliError> {
        match &self.genesis {
            Some(path) => {
                let genesis = Genesis::from_file(path)?;
                let block = genesis.block_context()?;
                let rules = match &self.fork {
                    Some(fork) => chain_config(fork)?.rules(block.number, block.timestamp),
                    None => genesis.rules(&block),
                };
                Ok((genesis.to_state()?, block, rules))
            }
            None => {
                let chain = chain_config(self.fork.as_deref().unwrap_or(&config.fork))?;
                let block = BlockContext {
                    chain_id: chain.chain_id,
                    ..BlockContext::default()
                };
                let rules = chain.rules(block.number, block.timestamp);
                Ok((JournaledState::new(), block, rules))
            }
        }
    }
}
