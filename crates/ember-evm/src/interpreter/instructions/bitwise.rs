//! 0x10..0x1d: comparison and bitwise logic

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::Interpreter;
use crate::word;

pub(crate) fn lt(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::from_bool(a < b))
}

pub(crate) fn gt(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::from_bool(a > b))
}

pub(crate) fn slt(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::from_bool(word::slt(&a, &b)))
}

pub(crate) fn sgt(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::from_bool(word::sgt(&a, &b)))
}

pub(crate) fn eq(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::from_bool(a == b))
}

pub(crate) fn iszero(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let a = interp.stack.pop()?;
    interp.stack.push(word::from_bool(a.is_zero()))
}

pub(crate) fn and(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(a & b)
}

pub(crate) fn or(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(a | b)
}

pub(crate) fn xor(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(a ^ b)
}

pub(crate) fn not(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let a = interp.stack.pop()?;
    interp.stack.push(!a)
}

pub(crate) fn byte(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [i, x] = interp.stack.pop_n()?;
    interp.stack.push(word::byte(i, x))
}

pub(crate) fn shl(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [shift, value] = interp.stack.pop_n()?;
    interp.stack.push(word::shl(shift, value))
}

pub(crate) fn shr(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [shift, value] = interp.stack.pop_n()?;
    interp.stack.push(word::shr(shift, value))
}

pub(crate) fn sar(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [shift, value] = interp.stack.pop_n()?;
    interp.stack.push(word::sar(shift, value))
}
