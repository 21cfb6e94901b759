use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ProtocolError, Result};

/// The on-wire record kind, `{type: u8}` at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Misc,
    Video,
    Audio,
}

impl RecordType {
    fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Misc),
            2 => Ok(Self::Video),
            3 => Ok(Self::Audio),
            other => Err(ProtocolError::UnknownRecordType(other)),
        }
    }
}

/// The fixed 14-byte framed-record header: `{type: u8, flags: u8, latency: u64, size: u32}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: RecordType,
    pub flags: u8,
    /// Server-side latency, microseconds.
    pub latency_us: u64,
    pub size: u32,
}

impl RecordHeader {
    pub const SIZE: usize = 14;
    const KEYFRAME_FLAG: u8 = 0b0000_0001;

    pub fn keyframe(&self) -> bool {
        self.flags & Self::KEYFRAME_FLAG != 0
    }

    /// Parses a header from exactly [`Self::SIZE`] bytes.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`Self::SIZE`]; callers only invoke this once at
    /// least that many bytes are known to be buffered.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        assert!(buf.len() >= Self::SIZE, "RecordHeader::parse requires {} bytes", Self::SIZE);

        let record_type = RecordType::from_u8(buf[0])?;
        let flags = buf[1];
        let latency_us = LittleEndian::read_u64(&buf[2..10]);
        let size = LittleEndian::read_u32(&buf[10..14]);

        Ok(Self {
            record_type,
            flags,
            latency_us,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(record_type: u8, flags: u8, latency_us: u64, size: u32) -> Vec<u8> {
        let mut buf = vec![record_type, flags];
        buf.extend_from_slice(&latency_us.to_le_bytes());
        buf.extend_from_slice(&size.to_le_bytes());
        buf
    }

    #[test]
    fn parses_video_keyframe_header() {
        let bytes = header_bytes(2, 0b0000_0001, 12_345, 4096);
        let header = RecordHeader::parse(&bytes).unwrap();
        assert_eq!(header.record_type, RecordType::Video);
        assert!(header.keyframe());
        assert_eq!(header.latency_us, 12_345);
        assert_eq!(header.size, 4096);
    }

    #[test]
    fn non_keyframe_flag_is_observed() {
        let bytes = header_bytes(2, 0, 0, 0);
        let header = RecordHeader::parse(&bytes).unwrap();
        assert!(!header.keyframe());
    }

    #[test]
    fn rejects_unknown_record_type() {
        let bytes = header_bytes(9, 0, 0, 0);
        assert!(matches!(RecordHeader::parse(&bytes), Err(ProtocolError::UnknownRecordType(9))));
    }
}
