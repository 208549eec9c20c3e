//! Opcode handlers, grouped as in the Yellow Paper opcode table

pub(super) mod arithmetic;
pub(super) mod bitwise;
pub(super) mod block;
pub(super) mod control;
pub(super) mod environment;
pub(super) mod memory;
pub(super) mod stack;
pub(super) mod storage;
pub(super) mod system;
