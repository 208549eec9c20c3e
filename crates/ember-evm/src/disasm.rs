//! Bytecode disassembler

use std::fmt;

use crate::opcode::{self, Opcode};

/// One decoded instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte
    pub pc: usize,
    /// Opcode byte
    pub opcode: u8,
    /// PUSH immediate. Shorter than the PUSH width when the code ends early.
    pub immediate: Vec<u8>,
}

impl Instruction {
    /// Mnemonic, `"UNKNOWN"` for undefined bytes
    pub fn mnemonic(&self) -> &'static str {
        opcode::mnemonic_of(self.opcode)
    }

    /// Byte length in the code
    pub fn len(&self) -> usize {
        1 + self.immediate.len()
    }

    /// Always false; an instruction has at least its opcode byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Immediate was cut off by the end of the code
    pub fn is_truncated(&self) -> bool {
        self.immediate.len() < opcode::push_size(self.opcode)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: ", self.pc)?;
        match Opcode::from_byte(self.opcode) {
            Some(op) => f.write_str(op.mnemonic())?,
            None => write!(f, "UNKNOWN(0x{:02x})", self.opcode)?,
        }
        if !self.immediate.is_empty() {
            write!(f, " 0x{}", hex::encode(&self.immediate))?;
        }
        Ok(())
    }
}

/// Split `code` into instructions. Never fails: undefined bytes decode as
/// themselves and a trailing PUSH keeps whatever immediate bytes remain.
pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let byte = code[pc];
        let end = (pc + 1 + opcode::push_size(byte)).min(code.len());
        instructions.push(Instruction {
            pc,
            opcode: byte,
            immediate: code[pc + 1..end].to_vec(),
        });
        pc = end;
    }
    instructions
}

/// Concatenate instructions back into bytecode
pub fn assemble(instructions: &[Instruction]) -> Vec<u8> {
    let mut code = Vec::with_capacity(instructions.iter().map(Instruction::len).sum());
    for instruction in instructions {
        code.push(instruction.opcode);
        code.extend_from_slice(&instruction.immediate);
    }
    code
}
