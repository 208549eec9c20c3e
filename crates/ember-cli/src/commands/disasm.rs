//! `ember disasm`

use clap::Args;
use ember_evm::disasm::disassemble;
use ember_primitives::parse_bytes;
use serde_json::json;

use crate::{CliError, Output};

/// Disassemble bytecode
#[derive(Debug, Args)]
pub struct DisasmArgs {
    /// Bytecode as hex, `0x` optional
    pub code: String,
}

impl DisasmArgs {
    /// Print one instruction per line, or a JSON array of instructions
    pub fn execute(&self, json: bool) -> Result<(), CliError> {
        let code = parse_bytes(&self.code)?;
        let instructions = disassemble(&code);
        tracing::debug!(bytes = code.len(), instructions = instructions.len(), "disassembled");

        let listing: Vec<_> = instructions
            .iter()
            .map(|instruction| {
                json!({
                    "pc": instruction.pc,
                    "op": instruction.mnemonic(),
                    "immediate": if instruction.immediate.is_empty() {
                        None
                    } else {
                        Some(format!("0x{}", hex::encode(&instruction.immediate)))
                    },
                })
            })
            .collect();

        instructions
            .iter()
            .fold(Output::new(json), |output, instruction| output.line(instruction.to_string()))
            .field_serialize("instructions", &listing)
            .print();
        Ok(())
    }
}
