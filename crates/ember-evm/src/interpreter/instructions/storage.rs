//! Persistent and transient storage, and LOG0..LOG4

use ember_primitives::H256;

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas::{self, cost};
use crate::interpreter::Interpreter;
use crate::state::Log;
use crate::word;

/// Whole cost is dynamic: 2100 cold, 100 warm
pub(crate) fn sload(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let key = interp.stack.pop()?;
    let address = interp.frame.address;
    let is_cold = evm.state.add_slot_to_access_list(address, key);
    interp.charge(gas::sload_gas(is_cold))?;
    interp.stack.push(evm.state.get_state(&address, &key))
}

/// EIP-2200 pricing with EIP-2929 access and EIP-3529 refunds. Fails when
/// no more than the call stipend is left.
pub(crate) fn sstore(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.require_non_static()?;
    let [key, value] = interp.stack.pop_n()?;
    if interp.gas <= cost::SSTORE_SENTRY {
        return Err(interp.out_of_gas(cost::SSTORE_SENTRY + 1));
    }

    let address = interp.frame.address;
    let is_cold = evm.state.add_slot_to_access_list(address, key);
    let current = evm.state.get_state(&address, &key);
    let original = evm.state.get_original_state(&address, &key);
    let sstore = gas::sstore_gas(original, current, value, is_cold, &evm.rules);
    interp.charge(sstore.gas)?;
    evm.state.adjust_refund(sstore.refund);
    evm.state.set_state(address, key, value);
    Ok(())
}

pub(crate) fn tload(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let key = interp.stack.pop()?;
    let value = evm.state.get_transient_state(&interp.frame.address, &key);
    interp.stack.push(value)
}

pub(crate) fn tstore(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.require_non_static()?;
    let [key, value] = interp.stack.pop_n()?;
    evm.state.set_transient_state(interp.frame.address, key, value);
    Ok(())
}

/// Pops `offset, size, topic0, .., topicN-1`
pub(crate) fn log<const N: usize>(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.require_non_static()?;
    let [offset, len] = interp.stack.pop_n()?;
    let topics = interp.stack.pop_n::<N>()?.map(H256::from_word).to_vec();

    interp.charge(gas::log_gas(N, word::saturating_u64(&len)))?;
    let (offset, len) = interp.memory_range(offset, len)?;
    let data = interp.memory.read(offset, len);
    evm.state.add_log(Log {
        address: interp.frame.address,
        topics,
        data: data.into(),
    });
    Ok(())
}
