//! # ember-evm
//!
//! EVM execution engine targeting the Cancun hard fork.
//!
//! This crate provides:
//! - Word arithmetic, stack and memory
//! - Opcode table, disassembler and gas calculators
//! - Fork rules derived from a chain configuration
//! - Journaled world state with snapshot and revert
//! - Precompiled contracts 0x01..0x0a
//! - The interpreter and nested CALL/CREATE frames
//! - Step tracing
//! - Transaction application and genesis loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod disasm;
pub mod error;
pub mod evm;
pub mod gas;
pub mod genesis;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod precompile;
pub mod result;
pub mod stack;
pub mod state;
pub mod tracer;
pub mod transaction;
pub mod word;

pub use config::{ChainConfig, Rules};
pub use context::{BlockContext, CallFrame, CallKind, TxContext};
pub use error::{EvmError, EvmResult, PrecompileError, StateError, TxError};
pub use evm::{CreateInputs, Evm};
pub use genesis::{Genesis, GenesisAccount, GenesisError};
pub use interpreter::Interpreter;
pub use result::{ExitStatus, FrameResult};
pub use state::{Account, AccountInfo, JournaledState, Log, MemoryBackend, StateBackend};
pub use tracer::{LoggingTracer, StepPhase, StructLog, StructLogger, TraceStep, Tracer};
pub use transaction::{apply_transaction, AccessListItem, GasPricing, Transaction, TransactionResult};
