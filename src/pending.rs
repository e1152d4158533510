//! Carry-over and output storage for the driving loop.

use crate::error::{FilterError, Result};

/// Input bytes that did not yet make up a whole frame
///
/// Capacity is fixed at construction; the buffer never holds a full frame
/// once a call returns.
#[derive(Debug)]
pub struct PendingBuffer {
    data: Vec<u8>,
    len: usize,
}

impl PendingBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append as much of `src` as fits; returns the number of bytes taken.
    pub fn fill(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.data.len() - self.len);
        self.data[self.len..self.len + n].copy_from_slice(&src[..n]);
        self.len += n;
        n
    }

    /// The buffered bytes, mutable so a frame can be reordered in place.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// Encoded output of one call
///
/// Grows lazily and never shrinks; only the first `len` bytes are valid.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
    len: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure at least `size` bytes are addressable.
    pub fn reserve(&mut self, size: usize) -> Result<()> {
        if self.data.len() >= size {
            return Ok(());
        }
        tracing::debug!(
            old_len = self.data.len(),
            new_len = size,
            "reallocating output buffer"
        );
        self.data
            .try_reserve_exact(size - self.data.len())
            .map_err(|_| FilterError::Allocation { requested: size })?;
        self.data.resize(size, 0);
        Ok(())
    }

    /// Bytes currently addressable.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Writable space starting at `offset`.
    pub fn tail_mut(&mut self, offset: usize) -> &mut [u8] {
        &mut self.data[offset..]
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.data.len());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}
