//! 0x40..0x4a: block information

use ember_primitives::U256;

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::Interpreter;
use crate::word;

pub(crate) fn blockhash(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let number = interp.stack.pop()?;
    interp.stack.push(evm.block.block_hash(number).to_word())
}

pub(crate) fn coinbase(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.block.coinbase.to_word())
}

pub(crate) fn timestamp(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(evm.block.timestamp))
}

pub(crate) fn number(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(evm.block.number))
}

/// DIFFICULTY before the merge
pub(crate) fn prevrandao(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let value = if evm.rules.is_merge {
        evm.block.prevrandao.to_word()
    } else {
        evm.block.difficulty
    };
    interp.stack.push(value)
}

pub(crate) fn gaslimit(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(evm.block.gas_limit))
}

pub(crate) fn chainid(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(U256::from(evm.rules.chain_id))
}

pub(crate) fn basefee(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.block.base_fee)
}

/// Versioned hash of the transaction's blob at `index`, zero when out of range
pub(crate) fn blobhash(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    let index = interp.stack.pop()?;
    let hash = word::to_u64(&index)
        .and_then(|i| evm.tx.blob_hashes.get(i as usize))
        .map_or_else(U256::zero, |h| h.to_word());
    interp.stack.push(hash)
}

pub(crate) fn blobbasefee(interp: &mut Interpreter, evm: &mut Evm<'_>) -> EvmResult<()> {
    interp.stack.push(evm.block.blob_base_fee())
}
