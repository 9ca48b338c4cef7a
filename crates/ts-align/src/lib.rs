//! MPEG Transport Stream realignment and packet decoding.
//!
//! [`PacketAligner`] takes a byte stream delivered in arbitrary chunks and
//! emits buffers that are whole multiples of 188-byte packets, each starting
//! at a verified sync byte. [`TsPacket`] is a zero-copy view over one such
//! packet, exposing the header fields together with the adaptation field and
//! its extension.
//!
//! ```
//! use bytes::Bytes;
//! use ts_align::{PacketAligner, TsPacket, packet_windows};
//!
//! let mut stream = vec![0x00, 0x01]; // leading junk
//! for cc in 0..4u8 {
//!     let mut packet = vec![0xFF; 188];
//!     packet[..4].copy_from_slice(&[0x47, 0x01, 0x00, 0x10 | cc]);
//!     stream.extend(packet);
//! }
//!
//! let mut aligner = PacketAligner::new();
//! for buffer in aligner.process(Bytes::from(stream)) {
//!     for window in packet_windows(&buffer) {
//!         let packet = TsPacket::parse(window)?;
//!         assert_eq!(packet.pid(), 0x100);
//!     }
//! }
//! aligner.flush();
//! assert_eq!(aligner.stats().packets, 3);
//! # Ok::<(), ts_align::TsError>(())
//! ```

pub mod adaptation_field;
pub mod aligner;
pub mod carryover;
pub mod chunker;
pub mod error;
pub mod packet;

pub use adaptation_field::{
    AdaptationExtension, AdaptationField, LegalTimeWindow, Pcr, SeamlessSplice,
};
pub use aligner::{AlignerStats, PacketAligner, SyncState};
pub use carryover::{CARRYOVER_CAPACITY, CarryoverBuffer};
pub use chunker::BlockChunker;
pub use error::{InvalidPacketReason, TsError};
pub use packet::{
    AdaptationFieldControl, HEADER_SIZE, PACKET_SIZE, PID_NULL, PID_PAT, SYNC_BYTE,
    TransportScramblingControl, TsPacket, packet_windows,
};

/// Result type for TS decoding operations
pub type Result<T> = std::result::Result<T, TsError>;
