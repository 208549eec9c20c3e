//! POP, PUSH0..PUSH32, DUP1..DUP16, SWAP1..SWAP16

use ember_primitives::U256;

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::Interpreter;
use crate::word;

pub(crate) fn pop(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.pop().map(drop)
}

pub(crate) fn push0(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::zero())
}

/// Immediate bytes missing at the end of the code read as zero
pub(crate) fn push<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let code = &interp.frame.code;
    let start = interp.pc.min(code.len());
    let end = (interp.pc + N).min(code.len());
    let value = word::from_padded_be(&code[start..end], N);
    interp.stack.push(value)?;
    interp.pc += N;
    Ok(())
}

pub(crate) fn dup<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.dup(N)
}

pub(crate) fn swap<const N: usize>(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.swap(N)
}
