use std::ops::Range;

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use tracing::{debug, trace, warn};

use crate::carryover::CarryoverBuffer;
use crate::packet::{PACKET_SIZE, SYNC_BYTE};

/// Bytes needed from a candidate to check three evenly spaced sync bytes.
const UNACQUIRED_LOOKAHEAD: usize = 2 * PACKET_SIZE + 1;

/// Bytes needed to confirm a packet: the packet plus the next sync byte.
const ACQUIRED_LOOKAHEAD: usize = PACKET_SIZE + 1;

/// Whether the aligner currently trusts its packet boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Unacquired,
    Acquired,
}

/// Counters describing what the aligner did with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignerStats {
    /// Packets emitted
    pub packets: u64,
    /// Bytes consumed while searching for a packet boundary
    pub skipped_bytes: u64,
    /// Times three evenly spaced sync bytes were found
    pub sync_acquisitions: u64,
    /// Times a confirmed boundary was not followed by a sync byte
    pub sync_losses: u64,
    /// Trailing bytes dropped at flush or by carryover overflow
    pub discarded_bytes: u64,
}

/// Realigns an arbitrarily chunked byte stream onto 188-byte packet
/// boundaries.
///
/// Every buffer returned by [`process`](Self::process) is a non-zero
/// multiple of [`PACKET_SIZE`] and starts with a verified sync byte. A
/// packet is only emitted once the byte right after it is also a sync byte,
/// so the last packet of a stream stays buffered and is dropped by
/// [`flush`](Self::flush).
///
/// Packets lying entirely inside the caller's chunk are returned as slices
/// of that chunk; only packets that touch carried-over bytes are copied.
#[derive(Debug, Default)]
pub struct PacketAligner {
    carryover: CarryoverBuffer,
    state: SyncState,
    stats: AlignerStats,
    /// Bytes skipped since sync was last acquired
    resync_skipped: u64,
}

impl PacketAligner {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> SyncState {
        self.state
    }

    #[inline]
    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Acquired
    }

    /// Bytes held back for the next call.
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.carryover.len()
    }

    #[inline]
    pub fn stats(&self) -> AlignerStats {
        self.stats
    }

    /// Feed the next chunk of the stream and collect the aligned buffers it
    /// completes, in stream order.
    pub fn process(&mut self, chunk: Bytes) -> Vec<Bytes> {
        let mut output = Vec::new();
        let window = Lookahead {
            carryover: &self.carryover,
            chunk: &chunk,
        };
        let total = window.len();
        let mut pos = 0;
        let mut run_start: Option<usize> = None;
        let mut skipped = 0;
        let mut packets = 0;

        loop {
            match self.state {
                SyncState::Unacquired => {
                    if total - pos < UNACQUIRED_LOOKAHEAD {
                        break;
                    }
                    let Some(candidate) = window.find_sync(pos) else {
                        skipped += total - pos;
                        pos = total;
                        break;
                    };
                    skipped += candidate - pos;
                    pos = candidate;
                    if total - pos < UNACQUIRED_LOOKAHEAD {
                        break;
                    }

                    if window.is_sync_at(pos + PACKET_SIZE)
                        && window.is_sync_at(pos + 2 * PACKET_SIZE)
                    {
                        self.state = SyncState::Acquired;
                        self.stats.sync_acquisitions += 1;
                        debug!(
                            skipped = self.resync_skipped + skipped as u64,
                            "TS sync acquired"
                        );
                        self.resync_skipped = 0;
                        self.stats.skipped_bytes += skipped as u64;
                        skipped = 0;
                    } else {
                        skipped += 1;
                        pos += 1;
                    }
                }
                SyncState::Acquired => {
                    if total - pos < ACQUIRED_LOOKAHEAD {
                        break;
                    }

                    if window.is_sync_at(pos + PACKET_SIZE) {
                        run_start.get_or_insert(pos);
                        pos += PACKET_SIZE;
                        packets += 1;
                    } else {
                        self.state = SyncState::Unacquired;
                        self.stats.sync_losses += 1;
                        debug!(packets = self.stats.packets + packets, "TS sync lost");
                        if let Some(start) = run_start.take() {
                            window.emit(start..pos, &mut output);
                        }
                    }
                }
            }
        }

        if let Some(start) = run_start.take() {
            window.emit(start..pos, &mut output);
        }

        self.stats.packets += packets;
        self.stats.skipped_bytes += skipped as u64;
        self.resync_skipped += skipped as u64;
        self.keep_remainder(&chunk, pos);

        trace!(
            chunk_len = chunk.len(),
            packets,
            skipped,
            buffered = self.carryover.len(),
            "processed chunk"
        );
        output
    }

    /// Signal end of input.
    ///
    /// Nothing is emitted: bytes still buffered cannot be confirmed as a
    /// packet and are dropped. The aligner is reset and may be reused for a
    /// new stream.
    pub fn flush(&mut self) {
        let discarded = self.carryover.len();
        if discarded > 0 {
            debug!(discarded, "discarding unaligned trailing bytes");
        }
        self.stats.discarded_bytes += discarded as u64;
        self.carryover.clear();
        self.state = SyncState::Unacquired;
        self.resync_skipped = 0;
    }

    /// Keep the logical bytes `pos..` of {carryover, chunk} for the next call.
    fn keep_remainder(&mut self, chunk: &[u8], pos: usize) {
        let carried = self.carryover.len();
        let dropped = if pos >= carried {
            self.carryover.clear();
            self.carryover.append(&chunk[pos - carried..])
        } else {
            self.carryover.shift(pos);
            self.carryover.append(chunk)
        };

        if dropped > 0 {
            warn!(dropped, "carryover overflow, dropping oldest bytes");
            self.stats.discarded_bytes += dropped as u64;
        }
    }
}

/// The carryover bytes followed by the current chunk, addressed with one
/// logical index.
struct Lookahead<'a> {
    carryover: &'a CarryoverBuffer,
    chunk: &'a Bytes,
}

impl Lookahead<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.carryover.len() + self.chunk.len()
    }

    #[inline]
    fn is_sync_at(&self, index: usize) -> bool {
        let byte = match self.carryover.read_at(index) {
            Some(byte) => Some(byte),
            None => self.chunk.get(index - self.carryover.len()).copied(),
        };
        byte == Some(SYNC_BYTE)
    }

    /// Logical index of the next sync byte at or after `from`.
    fn find_sync(&self, from: usize) -> Option<usize> {
        let carried = self.carryover.as_slice();
        if let Some(rest) = carried.get(from..)
            && let Some(i) = memchr(SYNC_BYTE, rest)
        {
            return Some(from + i);
        }

        let chunk_from = from.saturating_sub(carried.len());
        memchr(SYNC_BYTE, self.chunk.get(chunk_from..)?).map(|i| carried.len() + chunk_from + i)
    }

    /// Push the confirmed packets in `range` to `output`.
    ///
    /// Packets that contain carryover bytes are copied into one buffer; the
    /// rest of the run is a zero-copy slice of the chunk.
    fn emit(&self, range: Range<usize>, output: &mut Vec<Bytes>) {
        let carried = self.carryover.len();
        if range.start >= carried {
            output.push(self.chunk.slice(range.start - carried..range.end - carried));
            return;
        }

        let copied_packets = (carried - range.start).div_ceil(PACKET_SIZE);
        let split = (range.start + copied_packets * PACKET_SIZE).min(range.end);

        let mut head = BytesMut::with_capacity(split - range.start);
        head.extend_from_slice(&self.carryover.as_slice()[range.start..carried.min(split)]);
        if split > carried {
            head.extend_from_slice(&self.chunk[..split - carried]);
        }
        output.push(head.freeze());

        if split < range.end {
            output.push(self.chunk.slice(split - carried..range.end - carried));
        }
    }
}
