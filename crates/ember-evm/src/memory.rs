//! EVM memory implementation

use ember_primitives::U256;

/// EVM memory (byte-addressable, grows in 32-byte words)
///
/// Callers charge expansion gas through [`crate::gas::memory_expansion_gas`]
/// and then call [`Memory::resize`]; every accessor below assumes the range it
/// touches has already been paid for, and grows the buffer itself otherwise.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes (always a multiple of 32)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if memory is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current size in words, the high-water mark used for gas
    pub fn words(&self) -> usize {
        self.data.len() / 32
    }

    /// Grow to cover `[offset, offset + len)`, rounded up to a word boundary.
    /// Never shrinks.
    pub fn resize(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        let end = offset.saturating_add(len);
        if end > self.data.len() {
            let words = end.div_ceil(32);
            self.data.resize(words * 32, 0);
        }
    }

    /// Write the 32-byte big-endian encoding of `value` at `offset`
    pub fn set_word(&mut self, offset: usize, value: U256) {
        self.resize(offset, 32);
        value.to_big_endian(&mut self.data[offset..offset + 32]);
    }

    /// Write one byte at `offset`
    pub fn set_byte(&mut self, offset: usize, value: u8) {
        self.resize(offset, 1);
        self.data[offset] = value;
    }

    /// Read 32 bytes at `offset`, zero-padded beyond the current size
    pub fn get_word(&self, offset: usize) -> U256 {
        let mut buf = [0u8; 32];
        self.read_into(offset, &mut buf);
        U256::from_big_endian(&buf)
    }

    /// Fresh `len`-byte buffer starting at `offset`, zero-filled beyond the
    /// current size
    pub fn read(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.read_into(offset, &mut out);
        out
    }

    fn read_into(&self, offset: usize, out: &mut [u8]) {
        if offset >= self.data.len() {
            return;
        }
        let end = offset.saturating_add(out.len()).min(self.data.len());
        out[..end - offset].copy_from_slice(&self.data[offset..end]);
    }

    /// Store a byte slice at `offset`
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.resize(offset, data.len());
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Write `len` bytes of `src` starting at `src_offset` into memory at
    /// `offset`. Source bytes past the end of `src` are written as zero.
    ///
    /// Shared by CALLDATACOPY, CODECOPY and EXTCODECOPY.
    pub fn write_padded(&mut self, offset: usize, src: &[u8], src_offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.resize(offset, len);
        let dst = &mut self.data[offset..offset + len];
        let available = src.len().saturating_sub(src_offset).min(len);
        if available > 0 {
            dst[..available].copy_from_slice(&src[src_offset..src_offset + available]);
        }
        dst[available..].fill(0);
    }

    /// Overlap-safe copy within memory (MCOPY)
    pub fn copy(&mut self, dst: usize, src: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.resize(dst.max(src), len);
        self.data.copy_within(src..src + len, dst);
    }

    /// Raw contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
