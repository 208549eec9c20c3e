//! EVM opcode definitions (Cancun)

use crate::config::Rules;

macro_rules! opcodes {
    ($($name:ident = $byte:literal, $gas:expr;)*) => {
        /// EVM opcodes (see Yellow Paper Appendix H)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        #[allow(missing_docs)]
        pub enum Opcode {
            $($name = $byte,)*
        }

        impl Opcode {
            /// Decode a byte; `None` for undefined opcodes
            pub const fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Opcode::$name),)*
                    _ => None,
                }
            }

            /// Mnemonic, e.g. `"PUSH1"`
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => stringify!($name),)*
                }
            }

            /// Static gas charged before the handler runs. Dynamic parts
            /// (memory, cold access, copy words) are charged by the handler;
            /// EXP, KECCAK256 and LOGn are charged entirely by their handlers.
            pub const fn base_gas(self) -> u64 {
                match self {
                    $(Opcode::$name => $gas,)*
                }
            }
        }
    };
}

use crate::gas::cost::{BASE, HIGH, LOW, MID, VERYLOW, WARM_ACCESS};

opcodes! {
    // Stop and Arithmetic
    STOP = 0x00, 0;
    ADD = 0x01, VERYLOW;
    MUL = 0x02, LOW;
    SUB = 0x03, VERYLOW;
    DIV = 0x04, LOW;
    SDIV = 0x05, LOW;
    MOD = 0x06, LOW;
    SMOD = 0x07, LOW;
    ADDMOD = 0x08, MID;
    MULMOD = 0x09, MID;
    EXP = 0x0a, 0;
    SIGNEXTEND = 0x0b, LOW;

    // Comparison & Bitwise Logic
    LT = 0x10, VERYLOW;
    GT = 0x11, VERYLOW;
    SLT = 0x12, VERYLOW;
    SGT = 0x13, VERYLOW;
    EQ = 0x14, VERYLOW;
    ISZERO = 0x15, VERYLOW;
    AND = 0x16, VERYLOW;
    OR = 0x17, VERYLOW;
    XOR = 0x18, VERYLOW;
    NOT = 0x19, VERYLOW;
    BYTE = 0x1a, VERYLOW;
    SHL = 0x1b, VERYLOW;
    SHR = 0x1c, VERYLOW;
    SAR = 0x1d, VERYLOW;

    KECCAK256 = 0x20, 0;

    // Environmental Information
    ADDRESS = 0x30, BASE;
    BALANCE = 0x31, WARM_ACCESS;
    ORIGIN = 0x32, BASE;
    CALLER = 0x33, BASE;
    CALLVALUE = 0x34, BASE;
    CALLDATALOAD = 0x35, VERYLOW;
    CALLDATASIZE = 0x36, BASE;
    CALLDATACOPY = 0x37, VERYLOW;
    CODESIZE = 0x38, BASE;
    CODECOPY = 0x39, VERYLOW;
    GASPRICE = 0x3a, BASE;
    EXTCODESIZE = 0x3b, WARM_ACCESS;
    EXTCODECOPY = 0x3c, WARM_ACCESS;
    RETURNDATASIZE = 0x3d, BASE;
    RETURNDATACOPY = 0x3e, VERYLOW;
    EXTCODEHASH = 0x3f, WARM_ACCESS;

    // Block Information
    BLOCKHASH = 0x40, 20;
    COINBASE = 0x41, BASE;
    TIMESTAMP = 0x42, BASE;
    NUMBER = 0x43, BASE;
    PREVRANDAO = 0x44, BASE;
    GASLIMIT = 0x45, BASE;
    CHAINID = 0x46, BASE;
    SELFBALANCE = 0x47, LOW;
    BASEFEE = 0x48, BASE;
    BLOBHASH = 0x49, VERYLOW;
    BLOBBASEFEE = 0x4a, BASE;

    // Stack, Memory, Storage and Flow Operations
    POP = 0x50, BASE;
    MLOAD = 0x51, VERYLOW;
    MSTORE = 0x52, VERYLOW;
    MSTORE8 = 0x53, VERYLOW;
    SLOAD = 0x54, 0;
    SSTORE = 0x55, 0;
    JUMP = 0x56, MID;
    JUMPI = 0x57, HIGH;
    PC = 0x58, BASE;
    MSIZE = 0x59, BASE;
    GAS = 0x5a, BASE;
    JUMPDEST = 0x5b, 1;
    TLOAD = 0x5c, WARM_ACCESS;
    TSTORE = 0x5d, WARM_ACCESS;
    MCOPY = 0x5e, VERYLOW;

    // Push Operations
    PUSH0 = 0x5f, BASE;
    PUSH1 = 0x60, VERYLOW;
    PUSH2 = 0x61, VERYLOW;
    PUSH3 = 0x62, VERYLOW;
    PUSH4 = 0x63, VERYLOW;
    PUSH5 = 0x64, VERYLOW;
    PUSH6 = 0x65, VERYLOW;
    PUSH7 = 0x66, VERYLOW;
    PUSH8 = 0x67, VERYLOW;
    PUSH9 = 0x68, VERYLOW;
    PUSH10 = 0x69, VERYLOW;
    PUSH11 = 0x6a, VERYLOW;
    PUSH12 = 0x6b, VERYLOW;
    PUSH13 = 0x6c, VERYLOW;
    PUSH14 = 0x6d, VERYLOW;
    PUSH15 = 0x6e, VERYLOW;
    PUSH16 = 0x6f, VERYLOW;
    PUSH17 = 0x70, VERYLOW;
    PUSH18 = 0x71, VERYLOW;
    PUSH19 = 0x72, VERYLOW;
    PUSH20 = 0x73, VERYLOW;
    PUSH21 = 0x74, VERYLOW;
    PUSH22 = 0x75, VERYLOW;
    PUSH23 = 0x76, VERYLOW;
    PUSH24 = 0x77, VERYLOW;
    PUSH25 = 0x78, VERYLOW;
    PUSH26 = 0x79, VERYLOW;
    PUSH27 = 0x7a, VERYLOW;
    PUSH28 = 0x7b, VERYLOW;
    PUSH29 = 0x7c, VERYLOW;
    PUSH30 = 0x7d, VERYLOW;
    PUSH31 = 0x7e, VERYLOW;
    PUSH32 = 0x7f, VERYLOW;

    // Duplication Operations
    DUP1 = 0x80, VERYLOW;
    DUP2 = 0x81, VERYLOW;
    DUP3 = 0x82, VERYLOW;
    DUP4 = 0x83, VERYLOW;
    DUP5 = 0x84, VERYLOW;
    DUP6 = 0x85, VERYLOW;
    DUP7 = 0x86, VERYLOW;
    DUP8 = 0x87, VERYLOW;
    DUP9 = 0x88, VERYLOW;
    DUP10 = 0x89, VERYLOW;
    DUP11 = 0x8a, VERYLOW;
    DUP12 = 0x8b, VERYLOW;
    DUP13 = 0x8c, VERYLOW;
    DUP14 = 0x8d, VERYLOW;
    DUP15 = 0x8e, VERYLOW;
    DUP16 = 0x8f, VERYLOW;

    // Exchange Operations
    SWAP1 = 0x90, VERYLOW;
    SWAP2 = 0x91, VERYLOW;
    SWAP3 = 0x92, VERYLOW;
    SWAP4 = 0x93, VERYLOW;
    SWAP5 = 0x94, VERYLOW;
    SWAP6 = 0x95, VERYLOW;
    SWAP7 = 0x96, VERYLOW;
    SWAP8 = 0x97, VERYLOW;
    SWAP9 = 0x98, VERYLOW;
    SWAP10 = 0x99, VERYLOW;
    SWAP11 = 0x9a, VERYLOW;
    SWAP12 = 0x9b, VERYLOW;
    SWAP13 = 0x9c, VERYLOW;
    SWAP14 = 0x9d, VERYLOW;
    SWAP15 = 0x9e, VERYLOW;
    SWAP16 = 0x9f, VERYLOW;

    // Logging Operations
    LOG0 = 0xa0, 0;
    LOG1 = 0xa1, 0;
    LOG2 = 0xa2, 0;
    LOG3 = 0xa3, 0;
    LOG4 = 0xa4, 0;

    // System Operations
    CREATE = 0xf0, 32000;
    CALL = 0xf1, WARM_ACCESS;
    CALLCODE = 0xf2, WARM_ACCESS;
    RETURN = 0xf3, 0;
    DELEGATECALL = 0xf4, WARM_ACCESS;
    CREATE2 = 0xf5, 32000;
    STATICCALL = 0xfa, WARM_ACCESS;
    REVERT = 0xfd, 0;
    INVALID = 0xfe, 0;
    SELFDESTRUCT = 0xff, 5000;
}

impl Opcode {
    /// Raw byte value
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Number of immediate bytes following a PUSH opcode (0 otherwise)
    pub const fn push_size(self) -> usize {
        push_size(self as u8)
    }

    /// Check if this is PUSH1..PUSH32
    pub const fn is_push(self) -> bool {
        self.push_size() > 0
    }

    /// Stack depth for DUPn (1-16), 0 otherwise
    pub const fn dup_depth(self) -> usize {
        let byte = self as u8;
        if byte >= 0x80 && byte <= 0x8f {
            (byte - 0x7f) as usize
        } else {
            0
        }
    }

    /// Stack depth for SWAPn (1-16), 0 otherwise
    pub const fn swap_depth(self) -> usize {
        let byte = self as u8;
        if byte >= 0x90 && byte <= 0x9f {
            (byte - 0x8f) as usize
        } else {
            0
        }
    }

    /// Topic count for LOGn, `None` for other opcodes
    pub const fn log_topics(self) -> Option<usize> {
        let byte = self as u8;
        if byte >= 0xa0 && byte <= 0xa4 {
            Some((byte - 0xa0) as usize)
        } else {
            None
        }
    }

    /// Whether the opcode is defined under `rules`. Opcodes introduced by a
    /// later fork decode as invalid before it activates.
    pub const fn is_enabled(self, rules: &Rules) -> bool {
        match self {
            Opcode::DELEGATECALL => rules.is_homestead,
            Opcode::RETURNDATASIZE
            | Opcode::RETURNDATACOPY
            | Opcode::STATICCALL
            | Opcode::REVERT => rules.is_byzantium,
            Opcode::SHL | Opcode::SHR | Opcode::SAR | Opcode::CREATE2 | Opcode::EXTCODEHASH => {
                rules.is_constantinople
            }
            Opcode::CHAINID | Opcode::SELFBALANCE => rules.is_istanbul,
            Opcode::BASEFEE => rules.is_london,
            Opcode::PUSH0 => rules.is_shanghai,
            Opcode::TLOAD
            | Opcode::TSTORE
            | Opcode::MCOPY
            | Opcode::BLOBHASH
            | Opcode::BLOBBASEFEE => rules.is_cancun,
            _ => true,
        }
    }

    /// Mnemonic under `rules` (0x44 reads DIFFICULTY before the merge)
    pub const fn mnemonic_for(self, rules: &Rules) -> &'static str {
        match self {
            Opcode::PREVRANDAO if !rules.is_merge => "DIFFICULTY",
            _ => self.mnemonic(),
        }
    }
}

/// Immediate size for a raw PUSH byte (0 for non-PUSH bytes and PUSH0)
pub const fn push_size(byte: u8) -> usize {
    if byte >= 0x60 && byte <= 0x7f {
        (byte - 0x5f) as usize
    } else {
        0
    }
}

/// Mnemonic for a raw byte, `"UNKNOWN"` for undefined opcodes
pub fn mnemonic_of(byte: u8) -> &'static str {
    Opcode::from_byte(byte).map_or("UNKNOWN", Opcode::mnemonic)
}
