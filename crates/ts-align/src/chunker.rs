use bytes::{Buf, Bytes, BytesMut};

use crate::{Result, TsError};

/// Slices an already continuous byte stream into equal-size blocks.
///
/// There is no resynchronization here; use [`PacketAligner`](crate::PacketAligner)
/// for streams that may be misaligned. Whole blocks inside a pushed chunk
/// are returned as slices of it, and only blocks spanning two pushes are
/// copied.
#[derive(Debug)]
pub struct BlockChunker {
    block_size: usize,
    flush_on_end: bool,
    pending: BytesMut,
}

impl BlockChunker {
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(TsError::InvalidBlockSize(block_size));
        }
        Ok(Self {
            block_size,
            flush_on_end: false,
            pending: BytesMut::with_capacity(block_size),
        })
    }

    /// Emit the trailing partial block from [`finish`](Self::finish).
    pub fn with_flush_on_end(mut self, enable: bool) -> Self {
        self.flush_on_end = enable;
        self
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes waiting for the current block to fill up.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed the next chunk and collect every block it completes.
    pub fn push(&mut self, mut data: Bytes) -> Vec<Bytes> {
        let mut blocks = Vec::new();

        if !self.pending.is_empty() {
            let take = (self.block_size - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data.advance(take);
            if self.pending.len() < self.block_size {
                return blocks;
            }
            blocks.push(self.pending.split().freeze());
            self.pending.reserve(self.block_size);
        }

        while data.len() >= self.block_size {
            blocks.push(data.split_to(self.block_size));
        }
        self.pending.extend_from_slice(&data);
        blocks
    }

    /// Signal end of input, returning the partial block if flushing is
    /// enabled. Pending bytes are dropped otherwise.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            return None;
        }
        if self.flush_on_end {
            Some(self.pending.split().freeze())
        } else {
            self.pending.clear();
            None
        }
    }
}
