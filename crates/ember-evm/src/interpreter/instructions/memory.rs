//! Memory access: MLOAD, MSTORE, MSTORE8, MSIZE, MCOPY

use ember_primitives::U256;

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::Interpreter;
use crate::word;

pub(crate) fn mload(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let offset = interp.stack.pop()?;
    let (offset, _) = interp.memory_range(offset, U256::from(32))?;
    let value = interp.memory.get_word(offset);
    interp.stack.push(value)
}

pub(crate) fn mstore(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, value] = interp.stack.pop_n()?;
    let (offset, _) = interp.memory_range(offset, U256::from(32))?;
    interp.memory.set_word(offset, value);
    Ok(())
}

pub(crate) fn mstore8(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, value] = interp.stack.pop_n()?;
    let (offset, _) = interp.memory_range(offset, U256::one())?;
    interp.memory.set_byte(offset, value.low_u32() as u8);
    Ok(())
}

pub(crate) fn msize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.memory.len()))
}

/// EIP-5656. Both ranges are charged for expansion.
pub(crate) fn mcopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [dst, src, len] = interp.stack.pop_n()?;
    interp.charge(gas::copy_gas(word::saturating_u64(&len)))?;
    let (dst, len) = interp.memory_range(dst, len)?;
    if len == 0 {
        return Ok(());
    }
    let (src, _) = interp.memory_range(src, U256::from(len))?;
    interp.memory.copy(dst, src, len);
    Ok(())
}
