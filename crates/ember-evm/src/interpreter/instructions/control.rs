//! Flow control and halting

use bytes::Bytes;
use ember_primitives::U256;

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::interpreter::Interpreter;
use crate::result::ExitStatus;

pub(crate) fn stop(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.halt(ExitStatus::Stop, Bytes::new());
    Ok(())
}

pub(crate) fn jump(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let dest = interp.stack.pop()?;
    interp.jump(dest)
}

pub(crate) fn jumpi(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [dest, condition] = interp.stack.pop_n()?;
    if condition.is_zero() {
        return Ok(());
    }
    interp.jump(dest)
}

pub(crate) fn pc(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.pc - 1))
}

/// Gas left after this opcode's own charge
pub(crate) fn gas(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.gas))
}

pub(crate) fn jumpdest(_interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    Ok(())
}

pub(crate) fn ret(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let output = read_output(interp)?;
    interp.halt(ExitStatus::Return, output);
    Ok(())
}

pub(crate) fn revert(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let output = read_output(interp)?;
    interp.halt(ExitStatus::Revert, output);
    Ok(())
}

/// 0xfe and every undefined byte
pub(crate) fn invalid(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    Err(EvmError::InvalidOpcode(interp.frame.code[interp.pc - 1]))
}

fn read_output(interp: &mut Interpreter) -> EvmResult<Bytes> {
    let [offset, len] = interp.stack.pop_n()?;
    let (offset, len) = interp.memory_range(offset, len)?;
    Ok(interp.memory.read(offset, len).into())
}
