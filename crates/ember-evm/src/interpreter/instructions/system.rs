//! KECCAK256, the CREATE and CALL families, SELFDESTRUCT

use bytes::Bytes;
use ember_primitives::{Address, H256, U256};

use crate::context::{CallFrame, CallKind};
use crate::error::{EvmError, EvmResult};
use crate::evm::{CreateInputs, Evm};
use crate::gas::{self, cost};
use crate::interpreter::Interpreter;
use crate::result::ExitStatus;
use crate::word;

/// Whole cost is dynamic: `30 + 6·words` plus memory
pub(crate) fn keccak256(interp: &mut Interpreter, _evm: &mut Evm<'_>) -> EvmResult<()> {
    let [offset, len] = interp.stack.pop_n()?;
    interp.charge(gas::sha3_gas(word::saturating_u64(&len)))?;
    let (offset, len) = interp.memory_range(offset, len)?;
    let hash = ember_crypto::keccak256(&interp.memory.read(offset, len));
    interp.stack.push(hash.to_word())
}

pub(crate) fn create(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    create_contract(interp, evm, false)
}

pub(crate) fn create2(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    create_contract(interp, evm, true)
}

/// Pops `value, offset, size` (and `salt` for CREATE2), forwards all but one
/// 64th of the remaining gas and pushes the new address, or zero on failure
fn create_contract(interp: &mut Interpreter, evm: &mut Evm<'_>, is_create2: bool) -> EvmResult<()> {
    interp.require_non_static()?;
    let [value, offset, len] = interp.stack.pop_n()?;
    let salt = if is_create2 {
        Some(H256::from_word(interp.stack.pop()?))
    } else {
        None
    };

    let (offset, len) = interp.memory_range(offset, len)?;
    if evm.rules.is_shanghai {
        if len > cost::MAX_INIT_CODE_SIZE {
            return Err(EvmError::InitCodeSizeExceeded);
        }
        interp.charge(gas::initcode_gas(len as u64))?;
    }
    if is_create2 {
        interp.charge(gas::create2_hash_gas(len as u64))?;
    }
    let init_code: Bytes = interp.memory.read(offset, len).into();

    let gas_limit = if evm.rules.is_eip150 {
        gas::all_but_one_64th(interp.gas)
    } else {
        interp.gas
    };
    interp.charge(gas_limit)?;
    interp.return_data = Bytes::new();

    let result = evm.create(CreateInputs {
        caller: interp.frame.address,
        value,
        init_code,
        gas: gas_limit,
        salt,
        depth: interp.frame.depth + 1,
    });
    interp.gas += result.gas_left;
    if result.status.is_revert() {
        interp.return_data = result.output;
    }
    let created = result.created.map_or_else(U256::zero, |address| address.to_word());
    interp.stack.push(created)
}

pub(crate) fn call(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    call_contract(interp, evm, CallKind::Call)
}

pub(crate) fn callcode(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    call_contract(interp, evm, CallKind::CallCode)
}

pub(crate) fn delegatecall(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    call_contract(interp, evm, CallKind::DelegateCall)
}

pub(crate) fn staticcall(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    call_contract(interp, evm, CallKind::StaticCall)
}

/// Pops `gas, to, [value,] in_offset, in_size, out_offset, out_size`.
///
/// Charges memory for both ranges, the access and value surcharges, then
/// forwards `min(gas, all but one 64th)` plus the stipend for value calls.
fn call_contract(interp: &mut Interpreter, evm: &mut Evm<'_>, kind: CallKind) -> EvmResult<()> {
    let requested = interp.stack.pop()?;
    let to = Address::from_word(interp.stack.pop()?);
    let value = match kind {
        CallKind::Call | CallKind::CallCode => interp.stack.pop()?,
        _ => U256::zero(),
    };
    let [in_offset, in_len, out_offset, out_len] = interp.stack.pop_n()?;
    let transfers_value = !value.is_zero();
    if kind == CallKind::Call && transfers_value {
        interp.require_non_static()?;
    }

    let (in_offset, in_len) = interp.memory_range(in_offset, in_len)?;
    let (out_offset, out_len) = interp.memory_range(out_offset, out_len)?;

    let is_cold = evm.state.add_address_to_access_list(to);
    let creates_account = kind == CallKind::Call && transfers_value && evm.state.empty(&to);
    interp.charge(gas::call_extra_gas(is_cold, transfers_value, creates_account))?;

    let mut gas_limit = gas::call_gas(interp.gas, requested, &evm.rules);
    interp.charge(gas_limit)?;
    if transfers_value {
        gas_limit += cost::CALL_STIPEND;
    }

    let input: Bytes = interp.memory.read(in_offset, in_len).into();
    let parent = &interp.frame;
    let (address, caller, value, is_static) = match kind {
        CallKind::CallCode => (parent.address, parent.address, value, parent.is_static),
        CallKind::DelegateCall => (parent.address, parent.caller, parent.value, parent.is_static),
        CallKind::StaticCall => (to, parent.address, U256::zero(), true),
        _ => (to, parent.address, value, parent.is_static),
    };
    let frame = CallFrame {
        address,
        code_address: to,
        caller,
        value,
        input,
        code: Bytes::new(),
        gas: gas_limit,
        is_static,
        depth: parent.depth + 1,
        kind,
    };

    let result = evm.call(frame);
    interp.gas += result.gas_left;
    let copy_len = out_len.min(result.output.len());
    interp.memory.write_slice(out_offset, &result.output[..copy_len]);
    let success = result.is_success();
    interp.return_data = result.output;
    interp.stack.push(word::from_bool(success))
}

/// Sends the balance to the beneficiary and halts. Under Cancun the account
/// is only destroyed when it was created in the same transaction (EIP-6780).
pub(crate) fn selfdestruct(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.require_non_static()?;
    let beneficiary = Address::from_word(interp.stack.pop()?);
    let address = interp.frame.address;

    if evm.state.add_address_to_access_list(beneficiary) {
        interp.charge(cost::COLD_ACCOUNT_ACCESS)?;
    }
    let balance = evm.state.get_balance(&address);
    if !balance.is_zero() && evm.state.empty(&beneficiary) {
        interp.charge(cost::NEW_ACCOUNT)?;
    }
    if !evm.rules.is_london && !evm.state.has_suicided(&address) {
        evm.state.add_refund(cost::SELFDESTRUCT_REFUND);
    }

    if evm.rules.is_cancun {
        evm.state.sub_balance(address, balance)?;
        evm.state.add_balance(beneficiary, balance);
        if evm.state.is_created(&address) {
            evm.state.suicide(&address);
        }
    } else {
        evm.state.add_balance(beneficiary, balance);
        evm.state.suicide(&address);
    }

    interp.halt(ExitStatus::Stop, Bytes::new());
    Ok(())
}
