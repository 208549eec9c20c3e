//! Step tracing hooks
//!
//! The interpreter calls [`Tracer::on_step`] before and after every opcode.
//! Tracers observe only; returning `false` aborts the frame, which then
//! behaves as a revert with empty output.

use ember_primitives::U256;
use serde::Serialize;
use tracing::trace;

/// When a step callback fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Before the opcode executes; `gas_cost` is not yet known
    Before,
    /// After the opcode executed (or failed)
    After,
}

/// Interpreter state visible to a tracer
#[derive(Clone, Copy, Debug)]
pub struct TraceStep<'a> {
    /// Program counter of the opcode
    pub pc: usize,
    /// Opcode byte
    pub opcode: u8,
    /// Mnemonic under the active fork
    pub mnemonic: &'static str,
    /// Stack, bottom to top
    pub stack: &'a [U256],
    /// Memory size in bytes
    pub memory_size: usize,
    /// Gas remaining
    pub gas: u64,
    /// Gas charged by the opcode (zero before it runs)
    pub gas_cost: u64,
    /// Call depth
    pub depth: usize,
    /// The frame has reverted or failed
    pub reverted: bool,
    /// The frame has halted
    pub halted: bool,
}

/// Observer of interpreter steps
pub trait Tracer {
    /// Called around every opcode. Return `false` to abort execution.
    fn on_step(&mut self, phase: StepPhase, step: &TraceStep<'_>) -> bool;
}

/// Emits one `trace!` event per executed step
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingTracer;

impl Tracer for LoggingTracer {
    fn on_step(&mut self, phase: StepPhase, step: &TraceStep<'_>) -> bool {
        if phase == StepPhase::After {
            trace!(
                pc = step.pc,
                op = step.mnemonic,
                gas = step.gas,
                cost = step.gas_cost,
                depth = step.depth,
                stack = step.stack.len(),
                reverted = step.reverted,
                "step"
            );
        }
        true
    }
}

/// One recorded step
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructLog {
    /// Program counter
    pub pc: usize,
    /// Mnemonic
    pub op: &'static str,
    /// Gas before the step
    pub gas: u64,
    /// Gas charged by the step
    pub gas_cost: u64,
    /// Call depth, 1 for the outermost frame
    pub depth: usize,
    /// Stack before the step, bottom to top
    pub stack: Vec<U256>,
}

/// Collects a [`StructLog`] per step
#[derive(Clone, Debug, Default)]
pub struct StructLogger {
    logs: Vec<StructLog>,
    pending: Vec<usize>,
    limit: Option<usize>,
}

impl StructLogger {
    /// Logger without a step limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort execution after `limit` recorded steps
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Recorded steps
    pub fn logs(&self) -> &[StructLog] {
        &self.logs
    }

    /// Take the recorded steps
    pub fn into_logs(self) -> Vec<StructLog> {
        self.logs
    }
}

impl Tracer for StructLogger {
    fn on_step(&mut self, phase: StepPhase, step: &TraceStep<'_>) -> bool {
        match phase {
            StepPhase::Before => {
                if self.limit.is_some_and(|limit| self.logs.len() >= limit) {
                    return false;
                }
                // Nested frames run between Before and After of a CALL, so
                // open steps are tracked per depth
                self.pending.push(self.logs.len());
                self.logs.push(StructLog {
                    pc: step.pc,
                    op: step.mnemonic,
                    gas: step.gas,
                    gas_cost: 0,
                    depth: step.depth + 1,
                    stack: step.stack.to_vec(),
                });
            }
            StepPhase::After => {
                if let Some(index) = self.pending.pop() {
                    self.logs[index].gas_cost = step.gas_cost;
                }
            }
        }
        true
    }
}
