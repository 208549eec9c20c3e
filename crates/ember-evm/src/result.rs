//! Frame outcomes

use bytes::Bytes;
use ember_primitives::Address;

use crate::error::EvmError;

/// How a frame terminated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// STOP or end of code
    Stop,
    /// RETURN
    Return,
    /// REVERT, or an abort requested by the tracer
    Revert,
    /// Frame-fatal error; all gas consumed
    Error(EvmError),
}

impl ExitStatus {
    /// State changes commit
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Stop | Self::Return)
    }

    /// REVERT (gas is returned to the caller)
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert)
    }

    /// Failed with an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short name used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Return => "return",
            Self::Revert => "revert",
            Self::Error(_) => "error",
        }
    }
}

/// Result of running one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameResult {
    /// Termination reason
    pub status: ExitStatus,
    /// Gas left to hand back to the caller
    pub gas_left: u64,
    /// RETURN or REVERT payload
    pub output: Bytes,
    /// Address of the deployed contract (successful CREATE/CREATE2)
    pub created: Option<Address>,
}

impl FrameResult {
    /// Successful halt
    pub fn success(status: ExitStatus, gas_left: u64, output: Bytes) -> Self {
        Self {
            status,
            gas_left,
            output,
            created: None,
        }
    }

    /// REVERT keeping `gas_left`
    pub fn revert(gas_left: u64, output: Bytes) -> Self {
        Self {
            status: ExitStatus::Revert,
            gas_left,
            output,
            created: None,
        }
    }

    /// Error consuming all gas
    pub fn error(error: EvmError) -> Self {
        Self {
            status: ExitStatus::Error(error),
            gas_left: 0,
            output: Bytes::new(),
            created: None,
        }
    }

    /// Failure raised before the frame started: the caller keeps `gas`
    pub fn rejected(error: EvmError, gas: u64) -> Self {
        Self {
            status: ExitStatus::Error(error),
            gas_left: gas,
            output: Bytes::new(),
            created: None,
        }
    }

    /// State changes commit
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Frame error, if any
    pub fn error_kind(&self) -> Option<&EvmError> {
        match &self.status {
            ExitStatus::Error(e) => Some(e),
            _ => None,
        }
    }
}
