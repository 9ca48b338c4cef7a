use std::cell::OnceCell;
use std::slice::ChunksExact;

use crate::adaptation_field::AdaptationField;
use crate::{InvalidPacketReason, Result, TsError};

/// Every transport stream packet starts with this byte.
pub const SYNC_BYTE: u8 = 0x47;

/// Size of a transport stream packet in bytes.
pub const PACKET_SIZE: usize = 188;

/// Size of the fixed packet header (sync byte included).
pub const HEADER_SIZE: usize = 4;

/// PAT PID (always 0x0000)
pub const PID_PAT: u16 = 0x0000;

/// NULL PID (always 0x1FFF)
pub const PID_NULL: u16 = 0x1FFF;

/// Transport scrambling control, the two high bits of header byte 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransportScramblingControl {
    NotScrambled = 0,
    Reserved = 1,
    ScrambledEvenKey = 2,
    ScrambledOddKey = 3,
}

impl From<u8> for TransportScramblingControl {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::NotScrambled,
            1 => Self::Reserved,
            2 => Self::ScrambledEvenKey,
            _ => Self::ScrambledOddKey,
        }
    }
}

/// Adaptation field control, bits 5..4 of header byte 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdaptationFieldControl {
    /// Undefined by ISO/IEC 13818-1. Decoded as "no adaptation field, no payload".
    Reserved = 0,
    NoAdaptationField = 1,
    AdaptationFieldOnly = 2,
    AdaptationFieldAndPayload = 3,
}

impl AdaptationFieldControl {
    /// Check if packets with this control value carry an adaptation field
    #[inline]
    pub fn has_adaptation_field(self) -> bool {
        matches!(
            self,
            Self::AdaptationFieldOnly | Self::AdaptationFieldAndPayload
        )
    }

    /// Check if packets with this control value carry a payload
    #[inline]
    pub fn has_payload(self) -> bool {
        matches!(self, Self::NoAdaptationField | Self::AdaptationFieldAndPayload)
    }
}

impl From<u8> for AdaptationFieldControl {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::Reserved,
            1 => Self::NoAdaptationField,
            2 => Self::AdaptationFieldOnly,
            _ => Self::AdaptationFieldAndPayload,
        }
    }
}

/// Zero-copy view over a single 188-byte transport stream packet.
///
/// Header fields are decoded from the borrowed bytes on every call. The
/// adaptation field view is built on first access and cached for the
/// lifetime of the packet view.
#[derive(Debug, Clone)]
pub struct TsPacket<'a> {
    data: &'a [u8],
    adaptation_field: OnceCell<Option<AdaptationField<'a>>>,
}

impl<'a> TsPacket<'a> {
    /// Wrap exactly one packet.
    ///
    /// Fails with [`TsError::InvalidPacket`] if `data` is not [`PACKET_SIZE`]
    /// bytes long or does not start with [`SYNC_BYTE`].
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() != PACKET_SIZE {
            return Err(TsError::InvalidPacket(InvalidPacketReason::Length(
                data.len(),
            )));
        }
        if data[0] != SYNC_BYTE {
            return Err(TsError::InvalidPacket(InvalidPacketReason::SyncByte(
                data[0],
            )));
        }

        Ok(Self {
            data,
            adaptation_field: OnceCell::new(),
        })
    }

    /// The backing packet bytes, unmodified.
    #[inline]
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn transport_error_indicator(&self) -> bool {
        (self.data[1] & 0x80) != 0
    }

    #[inline]
    pub fn payload_unit_start_indicator(&self) -> bool {
        (self.data[1] & 0x40) != 0
    }

    #[inline]
    pub fn transport_priority(&self) -> bool {
        (self.data[1] & 0x20) != 0
    }

    /// 13-bit packet identifier.
    #[inline]
    pub fn pid(&self) -> u16 {
        ((self.data[1] as u16 & 0x1F) << 8) | self.data[2] as u16
    }

    #[inline]
    pub fn transport_scrambling_control(&self) -> TransportScramblingControl {
        TransportScramblingControl::from(self.data[3] >> 6)
    }

    #[inline]
    pub fn adaptation_field_control(&self) -> AdaptationFieldControl {
        AdaptationFieldControl::from(self.data[3] >> 4)
    }

    #[inline]
    pub fn continuity_counter(&self) -> u8 {
        self.data[3] & 0x0F
    }

    /// Declared size of the adaptation field including its length byte, or 0
    /// when the packet has none.
    pub fn adaptation_field_total_length(&self) -> usize {
        if self.adaptation_field_control().has_adaptation_field() {
            1 + self.data[HEADER_SIZE] as usize
        } else {
            0
        }
    }

    /// End offset of the adaptation field inside the packet, clamped to the
    /// packet size when the length byte over-declares.
    fn adaptation_field_end(&self) -> usize {
        match self.adaptation_field_control() {
            AdaptationFieldControl::AdaptationFieldOnly => PACKET_SIZE,
            AdaptationFieldControl::AdaptationFieldAndPayload => {
                (HEADER_SIZE + self.adaptation_field_total_length()).min(PACKET_SIZE)
            }
            AdaptationFieldControl::NoAdaptationField | AdaptationFieldControl::Reserved => {
                HEADER_SIZE
            }
        }
    }

    /// The adaptation field, if the control bits announce one.
    pub fn adaptation_field(&self) -> Option<&AdaptationField<'a>> {
        self.adaptation_field
            .get_or_init(|| {
                if self.adaptation_field_control().has_adaptation_field() {
                    let data: &'a [u8] = self.data;
                    Some(AdaptationField::new(
                        &data[HEADER_SIZE..self.adaptation_field_end()],
                    ))
                } else {
                    None
                }
            })
            .as_ref()
    }

    /// The payload bytes, if the control bits announce a payload.
    ///
    /// May be empty when the adaptation field fills the whole packet.
    pub fn payload(&self) -> Option<&'a [u8]> {
        if self.adaptation_field_control().has_payload() {
            let data: &'a [u8] = self.data;
            Some(&data[self.adaptation_field_end()..])
        } else {
            None
        }
    }

    /// Check if this packet has a random access indicator
    pub fn has_random_access_indicator(&self) -> bool {
        self.adaptation_field()
            .is_some_and(|af| af.random_access_indicator())
    }
}

/// Split an aligned buffer into its 188-byte packet windows.
///
/// Trailing bytes that do not form a whole packet are not yielded.
pub fn packet_windows(buffer: &[u8]) -> ChunksExact<'_, u8> {
    buffer.chunks_exact(PACKET_SIZE)
}
