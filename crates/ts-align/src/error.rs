//! Error types for packet decoding and stream chunking.

use thiserror::Error;

use crate::packet::{PACKET_SIZE, SYNC_BYTE};

/// Why a slice was rejected as a transport stream packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPacketReason {
    /// The slice was not exactly [`PACKET_SIZE`] bytes long.
    Length(usize),
    /// The first byte was not [`SYNC_BYTE`].
    SyncByte(u8),
}

impl std::fmt::Display for InvalidPacketReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length(len) => write!(f, "expected {PACKET_SIZE} bytes, got {len}"),
            Self::SyncByte(byte) => {
                write!(f, "expected sync byte 0x{SYNC_BYTE:02X}, got 0x{byte:02X}")
            }
        }
    }
}

/// Errors produced by this crate.
///
/// Loss of alignment inside a stream is not an error: the aligner resyncs
/// internally and only reports skipped bytes through its stats.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsError {
    /// A packet view was requested over bytes that are not a TS packet.
    #[error("invalid packet: {0}")]
    InvalidPacket(InvalidPacketReason),

    /// A block chunker was configured with a zero block size.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),
}

impl TsError {
    /// Returns `true` for [`TsError::InvalidPacket`].
    pub fn is_invalid_packet(&self) -> bool {
        matches!(self, Self::InvalidPacket(_))
    }
}
