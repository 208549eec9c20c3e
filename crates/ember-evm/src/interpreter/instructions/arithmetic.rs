//! 0x01..0x0b: arithmetic

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::Interpreter;
use crate::word;

pub(crate) fn add(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::add(a, b))
}

pub(crate) fn mul(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::mul(a, b))
}

pub(crate) fn sub(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::sub(a, b))
}

pub(crate) fn div(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::div(a, b))
}

pub(crate) fn sdiv(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::sdiv(a, b))
}

pub(crate) fn rem(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::rem(a, b))
}

pub(crate) fn smod(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b] = interp.stack.pop_n()?;
    interp.stack.push(word::smod(a, b))
}

pub(crate) fn addmod(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b, m] = interp.stack.pop_n()?;
    interp.stack.push(word::addmod(a, b, m))
}

pub(crate) fn mulmod(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [a, b, m] = interp.stack.pop_n()?;
    interp.stack.push(word::mulmod(a, b, m))
}

/// Whole cost is dynamic: `10 + 50·byte_len(exponent)`
pub(crate) fn exp(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [base, exponent] = interp.stack.pop_n()?;
    interp.charge(gas::exp_gas(&exponent))?;
    interp.stack.push(word::exp(base, exponent))
}

pub(crate) fn signextend(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [b, x] = interp.stack.pop_n()?;
    interp.stack.push(word::signextend(b, x))
}
