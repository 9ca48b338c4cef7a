use std::fmt;

use crate::packet::PACKET_SIZE;

/// Capacity of the aligner scratch buffer: three packets.
pub const CARRYOVER_CAPACITY: usize = 3 * PACKET_SIZE;

/// Fixed-capacity byte buffer with a logical end cursor.
///
/// Holds the bytes the aligner could not yet assign to a confirmed packet.
/// It never grows: appending past capacity drops the oldest bytes, and
/// consumed prefixes are removed by shifting the remainder to the front.
#[derive(Clone)]
pub struct CarryoverBuffer {
    buf: [u8; CARRYOVER_CAPACITY],
    len: usize,
}

impl CarryoverBuffer {
    pub fn new() -> Self {
        Self {
            buf: [0; CARRYOVER_CAPACITY],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Byte at a logical index, `None` past the end cursor.
    #[inline]
    pub fn read_at(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Append `data`, dropping the oldest bytes if the result would exceed
    /// [`CARRYOVER_CAPACITY`]. Returns how many bytes were dropped.
    pub fn append(&mut self, data: &[u8]) -> usize {
        if data.len() >= CARRYOVER_CAPACITY {
            let dropped = self.len + data.len() - CARRYOVER_CAPACITY;
            self.buf
                .copy_from_slice(&data[data.len() - CARRYOVER_CAPACITY..]);
            self.len = CARRYOVER_CAPACITY;
            return dropped;
        }

        let overflow = (self.len + data.len()).saturating_sub(CARRYOVER_CAPACITY);
        self.shift(overflow);
        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        overflow
    }

    /// Discard the first `by` bytes (clamped to the current length).
    pub fn shift(&mut self, by: usize) {
        let by = by.min(self.len);
        if by == 0 {
            return;
        }
        self.buf.copy_within(by..self.len, 0);
        self.len -= by;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for CarryoverBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CarryoverBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarryoverBuffer")
            .field("len", &self.len)
            .field("capacity", &CARRYOVER_CAPACITY)
            .finish()
    }
}
