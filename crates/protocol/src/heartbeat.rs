use std::time::Duration;

/// Period between outbound heartbeats, fixed at 1/3 s.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(333);

/// The sentinel `type` value that marks an outbound heartbeat record, distinct from
/// any [`crate::RecordType`] the server ever sends.
const HEARTBEAT_TYPE: u32 = 0xFFFF_FFFF;

/// Builds the 12-byte packed outbound heartbeat record: `{type = 0xFFFFFFFF, timestamp}`.
///
/// `timestamp_micros` is the monotonic microsecond clock reading at emission; the server
/// is expected to echo it back verbatim in a `misc` record so the demuxer can measure
/// round-trip ping.
pub fn build(timestamp_micros: u64) -> [u8; 12] {
    let mut buf = [0u8; 12];
    buf[0..4].copy_from_slice(&HEARTBEAT_TYPE.to_le_bytes());
    buf[4..12].copy_from_slice(&timestamp_micros.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_fixed_size_record() {
        let record = build(123_456_789);
        assert_eq!(record.len(), 12);
        assert_eq!(&record[0..4], &0xFFFF_FFFFu32.to_le_bytes());
        assert_eq!(&record[4..12], &123_456_789u64.to_le_bytes());
    }
}
