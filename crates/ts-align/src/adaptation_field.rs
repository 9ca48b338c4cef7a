use std::cell::OnceCell;

/// Program Clock Reference (PCR): 33-bit base @ 90kHz + 9-bit extension @ 27MHz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcr {
    /// 33-bit base value at 90 kHz
    pub base: u64,
    /// 9-bit extension value at 27 MHz
    pub extension: u16,
}

impl Pcr {
    /// Size of an encoded PCR or OPCR field.
    pub const SIZE: usize = 6;

    /// Parse PCR from the first 6 bytes of `data`.
    ///
    /// Layout: `[base32..25][base24..17][base16..9][base8..1][base0 | reserved(6) | ext_high][ext_low]`
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }
        let base = ((data[0] as u64) << 25)
            | ((data[1] as u64) << 17)
            | ((data[2] as u64) << 9)
            | ((data[3] as u64) << 1)
            | ((data[4] as u64) >> 7);
        let extension = (((data[4] & 0x01) as u16) << 8) | data[5] as u16;
        Some(Pcr { base, extension })
    }

    /// Full PCR value at 27 MHz resolution.
    pub fn as_27mhz(&self) -> u64 {
        self.base * 300 + self.extension as u64
    }

    /// PCR as seconds (floating point).
    pub fn as_seconds(&self) -> f64 {
        self.as_27mhz() as f64 / 27_000_000.0
    }
}

/// Zero-copy adaptation field view.
///
/// `data` starts at the adaptation field length byte. Every optional field
/// starts where the previous present field ends, so offsets are derived from
/// the flag byte on each access. The nested extension view is cached.
#[derive(Debug, Clone)]
pub struct AdaptationField<'a> {
    data: &'a [u8],
    extension: OnceCell<Option<AdaptationExtension<'a>>>,
}

impl<'a> AdaptationField<'a> {
    const FLAGS_OFFSET: usize = 1;
    const PCR_OFFSET: usize = 2;

    /// Wrap adaptation field bytes, length byte included.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            extension: OnceCell::new(),
        }
    }

    /// The bytes this view was built over.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Declared length of the field, excluding the length byte itself.
    #[inline]
    pub fn adaptation_field_length(&self) -> u8 {
        self.data.first().copied().unwrap_or(0)
    }

    /// An empty adaptation field (length 0) has no flag byte; all flags read
    /// as unset.
    #[inline]
    fn flags(&self) -> u8 {
        self.data.get(Self::FLAGS_OFFSET).copied().unwrap_or(0)
    }

    #[inline]
    pub fn discontinuity_indicator(&self) -> bool {
        (self.flags() & 0x80) != 0
    }

    #[inline]
    pub fn random_access_indicator(&self) -> bool {
        (self.flags() & 0x40) != 0
    }

    #[inline]
    pub fn elementary_stream_priority_indicator(&self) -> bool {
        (self.flags() & 0x20) != 0
    }

    #[inline]
    pub fn pcr_flag(&self) -> bool {
        (self.flags() & 0x10) != 0
    }

    #[inline]
    pub fn opcr_flag(&self) -> bool {
        (self.flags() & 0x08) != 0
    }

    #[inline]
    pub fn splicing_point_flag(&self) -> bool {
        (self.flags() & 0x04) != 0
    }

    #[inline]
    pub fn transport_private_data_flag(&self) -> bool {
        (self.flags() & 0x02) != 0
    }

    #[inline]
    pub fn adaptation_field_extension_flag(&self) -> bool {
        (self.flags() & 0x01) != 0
    }

    fn opcr_offset(&self) -> usize {
        Self::PCR_OFFSET + if self.pcr_flag() { Pcr::SIZE } else { 0 }
    }

    fn splice_countdown_offset(&self) -> usize {
        self.opcr_offset() + if self.opcr_flag() { Pcr::SIZE } else { 0 }
    }

    fn transport_private_data_length_offset(&self) -> usize {
        self.splice_countdown_offset() + usize::from(self.splicing_point_flag())
    }

    fn transport_private_data_offset(&self) -> usize {
        self.transport_private_data_length_offset()
            + usize::from(self.transport_private_data_flag())
    }

    fn adaptation_extension_offset(&self) -> usize {
        self.transport_private_data_offset()
            + self.transport_private_data_length().unwrap_or(0) as usize
    }

    /// Program clock reference, if flagged and fully present.
    pub fn pcr(&self) -> Option<Pcr> {
        if !self.pcr_flag() {
            return None;
        }
        self.data.get(Self::PCR_OFFSET..).and_then(Pcr::parse)
    }

    /// Original program clock reference, if flagged and fully present.
    pub fn opcr(&self) -> Option<Pcr> {
        if !self.opcr_flag() {
            return None;
        }
        self.data.get(self.opcr_offset()..).and_then(Pcr::parse)
    }

    /// Packets remaining until a splicing point (may be negative).
    pub fn splice_countdown(&self) -> Option<i8> {
        if !self.splicing_point_flag() {
            return None;
        }
        self.data
            .get(self.splice_countdown_offset())
            .map(|&byte| byte as i8)
    }

    pub fn transport_private_data_length(&self) -> Option<u8> {
        if !self.transport_private_data_flag() {
            return None;
        }
        self.data
            .get(self.transport_private_data_length_offset())
            .copied()
    }

    /// Get transport private data if present.
    pub fn transport_private_data(&self) -> Option<&'a [u8]> {
        let length = self.transport_private_data_length()? as usize;
        let offset = self.transport_private_data_offset();
        let data: &'a [u8] = self.data;
        data.get(offset..offset + length)
    }

    /// Declared size of the adaptation extension including its length byte,
    /// or 0 when the extension flag is unset.
    pub fn adaptation_extension_total_length(&self) -> usize {
        if !self.adaptation_field_extension_flag() {
            return 0;
        }
        self.data
            .get(self.adaptation_extension_offset())
            .map_or(0, |&length| 1 + length as usize)
    }

    /// The adaptation extension, if flagged and its length byte is present.
    pub fn adaptation_extension(&self) -> Option<&AdaptationExtension<'a>> {
        self.extension
            .get_or_init(|| {
                if !self.adaptation_field_extension_flag() {
                    return None;
                }
                let start = self.adaptation_extension_offset();
                if start >= self.data.len() {
                    return None;
                }
                let end = (start + self.adaptation_extension_total_length()).min(self.data.len());
                let data: &'a [u8] = self.data;
                Some(AdaptationExtension::new(&data[start..end]))
            })
            .as_ref()
    }
}

/// Legal time window sub-field of the adaptation extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalTimeWindow {
    pub valid: bool,
    /// 15-bit offset
    pub offset: u16,
}

/// Seamless splice sub-field of the adaptation extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeamlessSplice {
    /// 4-bit splice type
    pub splice_type: u8,
    /// 33-bit decoding time stamp of the next access unit, 90 kHz
    pub dts_next_access_unit: u64,
}

/// Zero-copy adaptation extension view, starting at its length byte.
#[derive(Debug, Clone, Copy)]
pub struct AdaptationExtension<'a> {
    data: &'a [u8],
}

impl<'a> AdaptationExtension<'a> {
    const FLAGS_OFFSET: usize = 1;
    const LEGAL_TIME_WINDOW_OFFSET: usize = 2;
    const LEGAL_TIME_WINDOW_SIZE: usize = 2;
    const PIECEWISE_RATE_SIZE: usize = 3;
    const SEAMLESS_SPLICE_SIZE: usize = 5;

    /// Wrap adaptation extension bytes, length byte included.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Declared length of the extension, excluding the length byte itself.
    #[inline]
    pub fn adaptation_extension_length(&self) -> u8 {
        self.data.first().copied().unwrap_or(0)
    }

    #[inline]
    fn flags(&self) -> u8 {
        self.data.get(Self::FLAGS_OFFSET).copied().unwrap_or(0)
    }

    #[inline]
    pub fn legal_time_window_flag(&self) -> bool {
        (self.flags() & 0x80) != 0
    }

    #[inline]
    pub fn piecewise_rate_flag(&self) -> bool {
        (self.flags() & 0x40) != 0
    }

    #[inline]
    pub fn seamless_splice_flag(&self) -> bool {
        (self.flags() & 0x20) != 0
    }

    fn piecewise_rate_offset(&self) -> usize {
        Self::LEGAL_TIME_WINDOW_OFFSET
            + if self.legal_time_window_flag() {
                Self::LEGAL_TIME_WINDOW_SIZE
            } else {
                0
            }
    }

    fn seamless_splice_offset(&self) -> usize {
        self.piecewise_rate_offset()
            + if self.piecewise_rate_flag() {
                Self::PIECEWISE_RATE_SIZE
            } else {
                0
            }
    }

    fn field<const N: usize>(&self, offset: usize) -> Option<&'a [u8; N]> {
        let data: &'a [u8] = self.data;
        data.get(offset..offset + N)?.try_into().ok()
    }

    pub fn legal_time_window(&self) -> Option<LegalTimeWindow> {
        if !self.legal_time_window_flag() {
            return None;
        }
        let [b0, b1] = *self.field::<2>(Self::LEGAL_TIME_WINDOW_OFFSET)?;
        Some(LegalTimeWindow {
            valid: (b0 & 0x80) != 0,
            offset: ((b0 as u16 & 0x7F) << 8) | b1 as u16,
        })
    }

    /// 22-bit piecewise rate.
    pub fn piecewise_rate(&self) -> Option<u32> {
        if !self.piecewise_rate_flag() {
            return None;
        }
        let [b0, b1, b2] = *self.field::<3>(self.piecewise_rate_offset())?;
        Some(((b0 as u32 & 0x3F) << 16) | ((b1 as u32) << 8) | b2 as u32)
    }

    /// Layout: `[splice_type(4) DTS32..30 marker][DTS29..22][DTS21..15 marker][DTS14..7][DTS6..0 marker]`
    pub fn seamless_splice(&self) -> Option<SeamlessSplice> {
        if !self.seamless_splice_flag() {
            return None;
        }
        let [b0, b1, b2, b3, b4] = *self.field::<5>(self.seamless_splice_offset())?;
        let dts_next_access_unit = (((b0 & 0x0E) as u64) << 29)
            | ((b1 as u64) << 22)
            | (((b2 & 0xFE) as u64) << 14)
            | ((b3 as u64) << 7)
            | ((b4 as u64) >> 1);
        Some(SeamlessSplice {
            splice_type: b0 >> 4,
            dts_next_access_unit,
        })
    }

    #[inline]
    pub fn splice_type(&self) -> Option<u8> {
        self.seamless_splice().map(|splice| splice.splice_type)
    }

    #[inline]
    pub fn dts_next_access_unit(&self) -> Option<u64> {
        self.seamless_splice()
            .map(|splice| splice.dts_next_access_unit)
    }
}
