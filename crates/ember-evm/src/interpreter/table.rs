//! Opcode byte → handler dispatch table

use super::instructions::{arithmetic, bitwise, block, control, environment, memory, stack, storage, system};
use super::Interpreter;
use crate::error::EvmResult;
use crate::evm::Evm;

/// An opcode handler. Base gas has already been charged and `pc` points past
/// the opcode byte when it runs.
pub type Instruction = fn(&mut Interpreter, &mut Evm<'_>) -> EvmResult<()>;

/// Handlers for all 256 bytes; undefined bytes map to INVALID
pub(super) static INSTRUCTION_TABLE: [Instruction; 256] = build();

const fn build() -> [Instruction; 256] {
    let mut table: [Instruction; 256] = [control::invalid as Instruction; 256];

    table[0x00] = control::stop;
    table[0x01] = arithmetic::add;
    table[0x02] = arithmetic::mul;
    table[0x03] = arithmetic::sub;
    table[0x04] = arithmetic::div;
    table[0x05] = arithmetic::sdiv;
    table[0x06] = arithmetic::rem;
    table[0x07] = arithmetic::smod;
    table[0x08] = arithmetic::addmod;
    table[0x09] = arithmetic::mulmod;
    table[0x0a] = arithmetic::exp;
    table[0x0b] = arithmetic::signextend;

    table[0x10] = bitwise::lt;
    table[0x11] = bitwise::gt;
    table[0x12] = bitwise::slt;
    table[0x13] = bitwise::sgt;
    table[0x14] = bitwise::eq;
    table[0x15] = bitwise::iszero;
    table[0x16] = bitwise::and;
    table[0x17] = bitwise::or;
    table[0x18] = bitwise::xor;
    table[0x19] = bitwise::not;
    table[0x1a] = bitwise::byte;
    table[0x1b] = bitwise::shl;
    table[0x1c] = bitwise::shr;
    table[0x1d] = bitwise::sar;

    table[0x20] = system::keccak256;

    table[0x30] = environment::address;
    table[0x31] = environment::balance;
    table[0x32] = environment::origin;
    table[0x33] = environment::caller;
    table[0x34] = environment::callvalue;
    table[0x35] = environment::calldataload;
    table[0x36] = environment::calldatasize;
    table[0x37] = environment::calldatacopy;
    table[0x38] = environment::codesize;
    table[0x39] = environment::codecopy;
    table[0x3a] = environment::gasprice;
    table[0x3b] = environment::extcodesize;
    table[0x3c] = environment::extcodecopy;
    table[0x3d] = environment::returndatasize;
    table[0x3e] = environment::returndatacopy;
    table[0x3f] = environment::extcodehash;

    table[0x40] = block::blockhash;
    table[0x41] = block::coinbase;
    table[0x42] = block::timestamp;
    table[0x43] = block::number;
    table[0x44] = block::prevrandao;
    table[0x45] = block::gaslimit;
    table[0x46] = block::chainid;
    table[0x47] = environment::selfbalance;
    table[0x48] = block::basefee;
    table[0x49] = block::blobhash;
    table[0x4a] = block::blobbasefee;

    table[0x50] = stack::pop;
    table[0x51] = memory::mload;
    table[0x52] = memory::mstore;
    table[0x53] = memory::mstore8;
    table[0x54] = storage::sload;
    table[0x55] = storage::sstore;
    table[0x56] = control::jump;
    table[0x57] = control::jumpi;
    table[0x58] = control::pc;
    table[0x59] = memory::msize;
    table[0x5a] = control::gas;
    table[0x5b] = control::jumpdest;
    table[0x5c] = storage::tload;
    table[0x5d] = storage::tstore;
    table[0x5e] = memory::mcopy;
    table[0x5f] = stack::push0;

    table[0x60] = stack::push::<1>;
    table[0x61] = stack::push::<2>;
    table[0x62] = stack::push::<3>;
    table[0x63] = stack::push::<4>;
    table[0x64] = stack::push::<5>;
    table[0x65] = stack::push::<6>;
    table[0x66] = stack::push::<7>;
    table[0x67] = stack::push::<8>;
    table[0x68] = stack::push::<9>;
    table[0x69] = stack::push::<10>;
    table[0x6a] = stack::push::<11>;
    table[0x6b] = stack::push::<12>;
    table[0x6c] = stack::push::<13>;
    table[0x6d] = stack::push::<14>;
    table[0x6e] = stack::push::<15>;
    table[0x6f] = stack::push::<16>;
    table[0x70] = stack::push::<17>;
    table[0x71] = stack::push::<18>;
    table[0x72] = stack::push::<19>;
    table[0x73] = stack::push::<20>;
    table[0x74] = stack::push::<21>;
    table[0x75] = stack::push::<22>;
    table[0x76] = stack::push::<23>;
    table[0x77] = stack::push::<24>;
    table[0x78] = stack::push::<25>;
    table[0x79] = stack::push::<26>;
    table[0x7a] = stack::push::<27>;
    table[0x7b] = stack::push::<28>;
    table[0x7c] = stack::push::<29>;
    table[0x7d] = stack::push::<30>;
    table[0x7e] = stack::push::<31>;
    table[0x7f] = stack::push::<32>;

    table[0x80] = stack::dup::<1>;
    table[0x81] = stack::dup::<2>;
    table[0x82] = stack::dup::<3>;
    table[0x83] = stack::dup::<4>;
    table[0x84] = stack::dup::<5>;
    table[0x85] = stack::dup::<6>;
    table[0x86] = stack::dup::<7>;
    table[0x87] = stack::dup::<8>;
    table[0x88] = stack::dup::<9>;
    table[0x89] = stack::dup::<10>;
    table[0x8a] = stack::dup::<11>;
    table[0x8b] = stack::dup::<12>;
    table[0x8c] = stack::dup::<13>;
    table[0x8d] = stack::dup::<14>;
    table[0x8e] = stack::dup::<15>;
    table[0x8f] = stack::dup::<16>;

    table[0x90] = stack::swap::<1>;
    table[0x91] = stack::swap::<2>;
    table[0x92] = stack::swap::<3>;
    table[0x93] = stack::swap::<4>;
    table[0x94] = stack::swap::<5>;
    table[0x95] = stack::swap::<6>;
    table[0x96] = stack::swap::<7>;
    table[0x97] = stack::swap::<8>;
    table[0x98] = stack::swap::<9>;
    table[0x99] = stack::swap::<10>;
    table[0x9a] = stack::swap::<11>;
    table[0x9b] = stack::swap::<12>;
    table[0x9c] = stack::swap::<13>;
    table[0x9d] = stack::swap::<14>;
    table[0x9e] = stack::swap::<15>;
    table[0x9f] = stack::swap::<16>;

    table[0xa0] = storage::log::<0>;
    table[0xa1] = storage::log::<1>;
    table[0xa2] = storage::log::<2>;
    table[0xa3] = storage::log::<3>;
    table[0xa4] = storage::log::<4>;

    table[0xf0] = system::create;
    table[0xf1] = system::call;
    table[0xf2] = system::callcode;
    table[0xf3] = control::ret;
    table[0xf4] = system::delegatecall;
    table[0xf5] = system::create2;
    table[0xfa] = system::staticcall;
    table[0xfd] = control::revert;
    table[0xfe] = control::invalid;
    table[0xff] = system::selfdestruct;

    table
}
