//! EVM stack implementation

use ember_primitives::U256;

use crate::error::{EvmError, EvmResult};
use crate::gas::cost::MAX_STACK_SIZE;

/// EVM stack (max 1024 items, 256-bit each)
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<U256>,
}

impl Stack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MAX_STACK_SIZE),
        }
    }

    /// Push a value onto the stack
    #[inline]
    pub fn push(&mut self, value: U256) -> EvmResult<()> {
        if self.data.len() >= MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    #[inline]
    pub fn pop(&mut self) -> EvmResult<U256> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Pop `N` values, top first
    #[inline]
    pub fn pop_n<const N: usize>(&mut self) -> EvmResult<[U256; N]> {
        if self.data.len() < N {
            return Err(EvmError::StackUnderflow);
        }
        let mut out = [U256::zero(); N];
        for slot in out.iter_mut() {
            *slot = self.data.pop().ok_or(EvmError::StackUnderflow)?;
        }
        Ok(out)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek(&self, depth: usize) -> EvmResult<U256> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        Ok(self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with the item `depth` below it (SWAPn uses depth n)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth >= len {
            return Err(EvmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Push a copy of the `depth`-th item (DUPn uses depth n, 1 = top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth > len {
            return Err(EvmError::StackUnderflow);
        }
        if len >= MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }
        let value = self.data[len - depth];
        self.data.push(value);
        Ok(())
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bottom-to-top view of the stack
    pub fn data(&self) -> &[U256] {
        &self.data
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
