//! EVM bytecode interpreter
//!
//! One [`Interpreter`] runs one frame. Each step decodes the opcode at `pc`,
//! charges its base gas and dispatches through a table of handler functions.
//! Handlers receive the frame and the shared [`Evm`], which owns the journaled
//! state and runs nested frames for the CALL and CREATE families.

mod instructions;
mod table;

use std::mem;

use bytes::Bytes;
use ember_primitives::U256;
use tracing::debug;

use crate::context::CallFrame;
use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas;
use crate::memory::Memory;
use crate::opcode::{self, Opcode};
use crate::result::{ExitStatus, FrameResult};
use crate::stack::Stack;
use crate::tracer::{StepPhase, TraceStep};
use crate::word;

pub use table::Instruction;
use table::INSTRUCTION_TABLE;

/// Interpreter state for one frame
#[derive(Debug)]
pub struct Interpreter {
    /// Frame being executed
    pub(crate) frame: CallFrame,
    /// Program counter
    pub(crate) pc: usize,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    /// Gas remaining
    pub(crate) gas: u64,
    /// Output of the most recent child frame
    pub(crate) return_data: Bytes,
    /// RETURN or REVERT payload
    pub(crate) output: Bytes,
    /// Set by STOP, RETURN, REVERT and SELFDESTRUCT
    pub(crate) halted: Option<ExitStatus>,
    /// Valid jump destinations, indexed by code offset
    jumpdests: Vec<bool>,
    /// Mnemonic of the executing opcode, for out-of-gas reports
    op: &'static str,
}

impl Interpreter {
    /// Create an interpreter for `frame`, starting with the frame's gas
    pub fn new(frame: CallFrame) -> Self {
        let jumpdests = analyze_jumpdests(&frame.code);
        let gas = frame.gas;
        Self {
            frame,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            gas,
            return_data: Bytes::new(),
            output: Bytes::new(),
            halted: None,
            jumpdests,
            op: "",
        }
    }

    /// Frame being executed
    pub fn frame(&self) -> &CallFrame {
        &self.frame
    }

    /// Operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Linear memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gas remaining
    pub fn gas_left(&self) -> u64 {
        self.gas
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Execute until the frame halts, runs off the end of its code or fails.
    ///
    /// Errors consume all remaining gas. A tracer abort ends the frame like a
    /// REVERT with empty output.
    pub fn run(&mut self, evm: &mut Evm<'_>) -> FrameResult {
        debug!(
            depth = self.frame.depth,
            kind = ?self.frame.kind,
            address = %self.frame.address,
            gas = self.gas,
            "frame enter"
        );

        let status = loop {
            if let Some(status) = self.halted.take() {
                break status;
            }
            if self.pc >= self.frame.code.len() {
                break ExitStatus::Stop;
            }
            if let Err(error) = self.step(evm) {
                break ExitStatus::Error(error);
            }
        };

        let result = self.finish(status);
        debug!(
            depth = self.frame.depth,
            status = result.status.as_str(),
            gas_left = result.gas_left,
            output = result.output.len(),
            "frame exit"
        );
        result
    }

    /// Execute one opcode, notifying the tracer around it
    fn step(&mut self, evm: &mut Evm<'_>) -> EvmResult<()> {
        if evm.aborted {
            return Err(EvmError::Aborted);
        }

        let pc = self.pc;
        let byte = self.frame.code[pc];
        if !evm.is_tracing() {
            return self.execute(byte, evm);
        }

        let gas_before = self.gas;
        if !self.trace(evm, StepPhase::Before, pc, byte, 0, false) {
            evm.aborted = true;
            return Err(EvmError::Aborted);
        }
        let result = self.execute(byte, evm);
        let cost = gas_before.saturating_sub(self.gas);
        if !self.trace(evm, StepPhase::After, pc, byte, cost, result.is_err()) {
            evm.aborted = true;
        }
        result
    }

    fn execute(&mut self, byte: u8, evm: &mut Evm<'_>) -> EvmResult<()> {
        let opcode = Opcode::from_byte(byte)
            .filter(|op| op.is_enabled(&evm.rules))
            .ok_or(EvmError::InvalidOpcode(byte))?;
        self.op = opcode.mnemonic();
        self.pc += 1;
        self.charge(opcode.base_gas())?;
        INSTRUCTION_TABLE[byte as usize](self, evm)
    }

    fn trace(
        &self,
        evm: &mut Evm<'_>,
        phase: StepPhase,
        pc: usize,
        byte: u8,
        gas_cost: u64,
        failed: bool,
    ) -> bool {
        let mnemonic = Opcode::from_byte(byte).map_or("UNKNOWN", |op| op.mnemonic_for(&evm.rules));
        let step = TraceStep {
            pc,
            opcode: byte,
            mnemonic,
            stack: self.stack.data(),
            memory_size: self.memory.len(),
            gas: self.gas,
            gas_cost,
            depth: self.frame.depth,
            reverted: failed || matches!(self.halted, Some(ExitStatus::Revert)),
            halted: failed || self.halted.is_some(),
        };
        evm.on_step(phase, &step)
    }

    fn finish(&mut self, status: ExitStatus) -> FrameResult {
        match status {
            ExitStatus::Stop => FrameResult::success(ExitStatus::Stop, self.gas, Bytes::new()),
            ExitStatus::Return => {
                FrameResult::success(ExitStatus::Return, self.gas, mem::take(&mut self.output))
            }
            ExitStatus::Revert => FrameResult::revert(self.gas, mem::take(&mut self.output)),
            ExitStatus::Error(EvmError::Aborted) => FrameResult::revert(self.gas, Bytes::new()),
            ExitStatus::Error(error) => {
                self.gas = 0;
                FrameResult::error(error)
            }
        }
    }

    // ==================== Handler helpers ====================

    /// Deduct `amount` gas
    #[inline]
    pub(crate) fn charge(&mut self, amount: u64) -> EvmResult<()> {
        if self.gas < amount {
            return Err(self.out_of_gas(amount));
        }
        self.gas -= amount;
        Ok(())
    }

    pub(crate) fn out_of_gas(&self, needed: u64) -> EvmError {
        EvmError::OutOfGas {
            op: self.op,
            needed,
            have: self.gas,
        }
    }

    /// Charge expansion for `[offset, offset + len)` and grow memory to cover
    /// it. Zero-length ranges touch nothing and map to `(0, 0)`.
    pub(crate) fn memory_range(&mut self, offset: U256, len: U256) -> EvmResult<(usize, usize)> {
        if len.is_zero() {
            return Ok((0, 0));
        }
        let end = word::to_u64(&offset)
            .zip(word::to_u64(&len))
            .and_then(|(offset, len)| offset.checked_add(len).map(|end| (offset, len, end)));
        let Some((offset, len, end)) = end else {
            return Err(self.out_of_gas(u64::MAX));
        };

        let current = self.memory.words() as u64;
        let required = gas::words(end);
        if required > current {
            self.charge(gas::memory_expansion_gas(current, required))?;
            self.memory.resize(offset as usize, len as usize);
        }
        Ok((offset as usize, len as usize))
    }

    /// State-modifying opcodes fail inside STATICCALL
    #[inline]
    pub(crate) fn require_non_static(&self) -> EvmResult<()> {
        if self.frame.is_static {
            return Err(EvmError::WriteProtection);
        }
        Ok(())
    }

    /// Move `pc` to a JUMPDEST
    pub(crate) fn jump(&mut self, dest: U256) -> EvmResult<()> {
        let target = word::to_u64(&dest).map_or(usize::MAX, |d| d as usize);
        if !self.jumpdests.get(target).copied().unwrap_or(false) {
            return Err(EvmError::InvalidJump(target));
        }
        self.pc = target;
        Ok(())
    }

    /// Stop the frame with `status` and `output`
    pub(crate) fn halt(&mut self, status: ExitStatus, output: Bytes) {
        self.output = output;
        self.halted = Some(status);
    }
}

/// Mark every JUMPDEST that is not inside PUSH immediate data
fn analyze_jumpdests(code: &[u8]) -> Vec<bool> {
    let mut dests = vec![false; code.len()];
    let mut i = 0;
    while i < code.len() {
        let byte = code[i];
        if byte == Opcode::JUMPDEST.byte() {
            dests[i] = true;
        }
        i += opcode::push_size(byte) + 1;
    }
    dests
}
