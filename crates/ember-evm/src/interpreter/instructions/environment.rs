//! 0x30..0x3f and SELFBALANCE: execution environment

use ember_primitives::{Address, U256};

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::Interpreter;
use crate::word;

/// Warm `address`, charging the cold surcharge on first access (EIP-2929)
fn access_account(
    interp: &mut Interpreter,
    evm: &mut Evm<'_>,
    address: Address,
) -> EvmResult<()> {
    let is_cold = evm.state.add_address_to_access_list(address);
    interp.charge(gas::account_access_gas(is_cold))
}

/// Charge copy words and memory, then write `len` bytes of `src` from
/// `src_offset`, zero-padded past its end
fn copy_to_memory(
    interp: &mut Interpreter,
    memory_offset: U256,
    src_offset: U256,
    len: U256,
    src: &[u8],
) -> EvmResult<()> {
    interp.charge(gas::copy_gas(word::saturating_u64(&len)))?;
    let (memory_offset, len) = interp.memory_range(memory_offset, len)?;
    let src_offset = word::to_u64(&src_offset).map_or(usize::MAX, |o| o as usize);
    interp.memory.write_padded(memory_offset, src, src_offset, len);
    Ok(())
}

pub(crate) fn address(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(interp.frame.address.to_word())
}

pub(crate) fn balance(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = Address::from_word(interp.stack.pop()?);
    access_account(interp, evm, address)?;
    interp.stack.push(evm.state.get_balance(&address))
}

pub(crate) fn origin(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.tx.origin.to_word())
}

pub(crate) fn caller(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(interp.frame.caller.to_word())
}

pub(crate) fn callvalue(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(interp.frame.value)
}

pub(crate) fn calldataload(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let offset = interp.stack.pop()?;
    let input = &interp.frame.input;
    let value = match word::to_u64(&offset) {
        Some(offset) if (offset as usize) < input.len() => {
            word::from_padded_be(&input[offset as usize..], 32)
        }
        _ => U256::zero(),
    };
    interp.stack.push(value)
}

pub(crate) fn calldatasize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.frame.input.len()))
}

pub(crate) fn calldatacopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [memory_offset, data_offset, len] = interp.stack.pop_n()?;
    let input = interp.frame.input.clone();
    copy_to_memory(interp, memory_offset, data_offset, len, &input)
}

pub(crate) fn codesize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.frame.code.len()))
}

pub(crate) fn codecopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [memory_offset, code_offset, len] = interp.stack.pop_n()?;
    let code = interp.frame.code.clone();
    copy_to_memory(interp, memory_offset, code_offset, len, &code)
}

pub(crate) fn gasprice(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.tx.gas_price)
}

pub(crate) fn extcodesize(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = Address::from_word(interp.stack.pop()?);
    access_account(interp, evm, address)?;
    interp.stack.push(U256::from(evm.state.get_code_size(&address)))
}

pub(crate) fn extcodecopy(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let [address, memory_offset, code_offset, len] = interp.stack.pop_n()?;
    let address = Address::from_word(address);
    access_account(interp, evm, address)?;
    let code = evm.state.get_code(&address);
    copy_to_memory(interp, memory_offset, code_offset, len, &code)
}

pub(crate) fn returndatasize(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(interp.return_data.len()))
}

/// Reading past the end of the return data is a frame error (EIP-211)
pub(crate) fn returndatacopy(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [memory_offset, data_offset, len] = interp.stack.pop_n()?;
    let end = word::to_u64(&data_offset)
        .zip(word::to_u64(&len))
        .and_then(|(offset, len)| offset.checked_add(len));
    if end.map_or(true, |end| end > interp.return_data.len() as u64) {
        return Err(EvmError::ReturnDataOutOfBounds);
    }
    let data = interp.return_data.clone();
    copy_to_memory(interp, memory_offset, data_offset, len, &data)
}

/// Zero for absent or empty accounts (EIP-161)
pub(crate) fn extcodehash(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let address = Address::from_word(interp.stack.pop()?);
    access_account(interp, evm, address)?;
    let hash = if evm.state.empty(&address) {
        U256::zero()
    } else {
        evm.state.get_code_hash(&address).to_word()
    };
    interp.stack.push(hash)
}

pub(crate) fn selfbalance(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let balance = evm.state.get_balance(&interp.frame.address);
    interp.stack.push(balance)
}
