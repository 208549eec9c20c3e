//! Frame orchestration
//!
//! [`Evm`] bundles the journaled state with the block and transaction
//! context for one transaction. It runs message calls (including
//! precompiles) and contract creation, snapshotting the state around each
//! child frame and reverting it when the frame does not succeed.

use std::mem;

use bytes::Bytes;
use ember_crypto::keccak256;
use ember_primitives::{Address, H256, U256};
use ember_rlp::{create2_address, create_address};
use tracing::debug;

use crate::config::Rules;
use crate::context::{BlockContext, CallFrame, CallKind, TxContext};
use crate::error::{EvmError, EvmResult};
use crate::gas::cost;
use crate::interpreter::Interpreter;
use crate::precompile::{self, Precompile};
use crate::result::{ExitStatus, FrameResult};
use crate::state::JournaledState;
use crate::tracer::{StepPhase, TraceStep, Tracer};

/// Stack that must remain before another frame is entered
pub const STACK_RED_ZONE: usize = 512 * 1024;
/// Size of each stack segment allocated when the red zone is reached
pub const STACK_SEGMENT: usize = 8 * 1024 * 1024;

/// Arguments of a contract creation
#[derive(Clone, Debug)]
pub struct CreateInputs {
    /// Creator; its nonce is bumped and determines the address
    pub caller: Address,
    /// Endowment
    pub value: U256,
    /// Initcode run in the new account's context
    pub init_code: Bytes,
    /// Gas available to the initcode
    pub gas: u64,
    /// CREATE2 salt; `None` derives the address from the creator's nonce
    pub salt: Option<H256>,
    /// Depth of the creation frame
    pub depth: usize,
}

/// Execution environment shared by every frame of one transaction
pub struct Evm<'a> {
    /// World state
    pub state: &'a mut JournaledState,
    /// Block environment
    pub block: &'a BlockContext,
    /// Transaction environment
    pub tx: &'a TxContext,
    /// Fork rules in force
    pub rules: Rules,
    tracer: Option<&'a mut dyn Tracer>,
    /// A tracer asked to stop; every frame still running unwinds
    pub(crate) aborted: bool,
}

impl<'a> Evm<'a> {
    /// Create an environment without a tracer
    pub fn new(
        state: &'a mut JournaledState,
        block: &'a BlockContext,
        tx: &'a TxContext,
        rules: Rules,
    ) -> Self {
        Self {
            state,
            block,
            tx,
            rules,
            tracer: None,
            aborted: false,
        }
    }

    /// Attach a step tracer
    pub fn with_tracer(mut self, tracer: &'a mut dyn Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// A tracer aborted execution
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub(crate) fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }

    pub(crate) fn on_step(&mut self, phase: StepPhase, step: &TraceStep<'_>) -> bool {
        match self.tracer.as_mut() {
            Some(tracer) => tracer.on_step(phase, step),
            None => true,
        }
    }

    /// Run `frame` as a message call.
    ///
    /// The frame's code is loaded from `code_address`. Value is moved from
    /// `caller` to `address` for CALL; CALLCODE only checks the balance.
    /// Depth and balance failures leave the caller its gas.
    pub fn call(&mut self, mut frame: CallFrame) -> FrameResult {
        if frame.depth > cost::MAX_CALL_DEPTH {
            return FrameResult::rejected(EvmError::DepthLimit, frame.gas);
        }
        let transfers_value = matches!(frame.kind, CallKind::Call | CallKind::CallCode)
            && !frame.value.is_zero();
        if transfers_value && self.state.get_balance(&frame.caller) < frame.value {
            return FrameResult::rejected(EvmError::InsufficientBalance, frame.gas);
        }

        let precompile = precompile::get(&frame.code_address, &self.rules);
        let snapshot = self.state.snapshot();
        match frame.kind {
            CallKind::Call => {
                // Value-less calls to missing accounts must not create them
                if precompile.is_none()
                    && self.rules.is_eip158
                    && frame.value.is_zero()
                    && !self.state.exist(&frame.address)
                {
                    return FrameResult::success(ExitStatus::Stop, frame.gas, Bytes::new());
                }
                if let Err(error) = self.state.transfer(frame.caller, frame.address, frame.value) {
                    self.state.revert_to_snapshot(snapshot);
                    return FrameResult::rejected(error, frame.gas);
                }
            }
            CallKind::StaticCall => self.state.add_balance(frame.address, U256::zero()),
            _ => {}
        }

        let result = match precompile {
            Some(precompile) => run_precompile(precompile, &frame),
            None => {
                frame.code = self.state.get_code(&frame.code_address);
                if frame.code.is_empty() {
                    FrameResult::success(ExitStatus::Stop, frame.gas, Bytes::new())
                } else {
                    self.run_frame(frame).1
                }
            }
        };

        if !result.is_success() {
            self.state.revert_to_snapshot(snapshot);
        }
        result
    }

    /// Create a contract with CREATE or CREATE2 semantics.
    ///
    /// Bumps the creator's nonce, derives the address, runs the initcode and
    /// deposits the returned code. An address collision consumes all gas.
    pub fn create(&mut self, inputs: CreateInputs) -> FrameResult {
        let CreateInputs {
            caller,
            value,
            init_code,
            gas,
            salt,
            depth,
        } = inputs;

        if depth > cost::MAX_CALL_DEPTH {
            return FrameResult::rejected(EvmError::DepthLimit, gas);
        }
        if self.state.get_balance(&caller) < value {
            return FrameResult::rejected(EvmError::InsufficientBalance, gas);
        }
        let nonce = self.state.get_nonce(&caller);
        let Some(next_nonce) = nonce.checked_add(1) else {
            return FrameResult::rejected(EvmError::NonceOverflow, gas);
        };
        self.state.set_nonce(caller, next_nonce);

        let address = match salt {
            Some(salt) => create2_address(&caller, &salt, &keccak256(&init_code)),
            None => create_address(&caller, nonce),
        };
        if self.rules.is_berlin {
            self.state.add_address_to_access_list(address);
        }
        if self.state.get_nonce(&address) != 0 || self.state.get_code_size(&address) != 0 {
            debug!(%address, "create collision");
            return FrameResult::error(EvmError::CreateCollision);
        }

        let snapshot = self.state.snapshot();
        self.state.create_account(address);
        if self.rules.is_eip158 {
            self.state.set_nonce(address, 1);
        }
        if let Err(error) = self.state.transfer(caller, address, value) {
            self.state.revert_to_snapshot(snapshot);
            return FrameResult::rejected(error, gas);
        }

        let frame = CallFrame {
            address,
            code_address: address,
            caller,
            value,
            input: Bytes::new(),
            code: init_code,
            gas,
            is_static: false,
            depth,
            kind: CallKind::Create,
        };
        let (_, mut result) = self.run_frame(frame);
        if result.is_success() {
            if let Err(error) = self.deposit_code(address, &mut result) {
                result = FrameResult::error(error);
            }
        }

        if !result.is_success() {
            self.state.revert_to_snapshot(snapshot);
        }
        result
    }

    /// Interpret `frame.code` in place: no snapshot, transfer or precompile
    /// dispatch. Returns the finished interpreter for inspection.
    ///
    /// Child frames recurse through here, so the native stack is extended
    /// on the heap whenever less than [`STACK_RED_ZONE`] remains.
    pub fn run_frame(&mut self, frame: CallFrame) -> (Interpreter, FrameResult) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            let mut interpreter = Interpreter::new(frame);
            let result = interpreter.run(self);
            (interpreter, result)
        })
    }

    /// Check and pay for the initcode's output, then install it
    fn deposit_code(&mut self, address: Address, result: &mut FrameResult) -> EvmResult<()> {
        let code = mem::take(&mut result.output);
        if self.rules.is_eip158 && code.len() > cost::MAX_CODE_SIZE {
            return Err(EvmError::MaxCodeSizeExceeded);
        }
        if self.rules.is_london && code.first() == Some(&0xef) {
            return Err(EvmError::InvalidCodePrefix);
        }
        let deposit = cost::CODE_DEPOSIT * code.len() as u64;
        if result.gas_left < deposit {
            return Err(EvmError::OutOfGas {
                op: "CREATE",
                needed: deposit,
                have: result.gas_left,
            });
        }
        result.gas_left -= deposit;
        self.state.set_code(address, code);
        result.created = Some(address);
        Ok(())
    }
}

fn run_precompile(precompile: &dyn Precompile, frame: &CallFrame) -> FrameResult {
    match precompile::execute(precompile, &frame.input, frame.gas) {
        Ok(output) => FrameResult::success(ExitStatus::Return, output.gas_left, output.output),
        Err(error) => {
            debug!(name = precompile.name(), %error, "precompile failed");
            FrameResult::error(EvmError::Precompile(error))
        }
    }
}
