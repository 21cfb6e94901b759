use byteorder::{ByteOrder, LittleEndian};
use scuffle_bytes_util::ByteBuffer;

use crate::channel::AudioConfig;
use crate::error::{ProtocolError, Result};
use crate::header::{RecordHeader, RecordType};
use crate::stats::{KeyframeStats, PingTracker, VideoWindow};

/// One unit of work the demuxer hands back to its caller after [`Demuxer::process`].
#[derive(Debug, Clone)]
pub enum DemuxEvent {
    /// The stream's audio channel layout, parsed from the first audio record.
    AudioConfig(AudioConfig),
    /// Raw interleaved S16LE PCM, ready for the audio ring.
    AudioSamples(Vec<u8>),
    /// HEVC Annex-B bytes, ready for the NAL/SPS/PPS/slice parser.
    VideoPayload(Vec<u8>),
    /// A per-keyframe statistics snapshot; only emitted when stats are enabled.
    KeyframeStats(KeyframeStats),
}

/// Parses the framed record stream described in the external interface: a receive buffer
/// fed by the transport, drained record by record as soon as a full header + payload is
/// available.
pub struct Demuxer {
    buf: ByteBuffer,
    ping: PingTracker,
    video_window: VideoWindow,
    audio_config: Option<AudioConfig>,
    stats_enabled: bool,
    window_start_us: Option<u64>,
}

impl Demuxer {
    pub fn new(stats_enabled: bool) -> Self {
        Self {
            buf: ByteBuffer::new(),
            ping: PingTracker::new(),
            video_window: VideoWindow::new(),
            audio_config: None,
            stats_enabled,
            window_start_us: None,
        }
    }

    /// Appends transport bytes already read into memory (the async read path).
    pub fn feed(&mut self, data: &[u8]) {
        self.buf.append_slice(data);
    }

    /// Appends directly from a synchronous reader, for transports that hand over a raw fd.
    pub fn feed_from_reader<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<usize> {
        self.buf.append_from_reader(reader)
    }

    /// Drains every complete record currently buffered, returning the events it produced
    /// in wire order. `now_micros` is the monotonic clock reading at the moment of this
    /// call, used for ping and bitrate-window accounting.
    pub fn process(&mut self, now_micros: u64) -> Result<Vec<DemuxEvent>> {
        let mut events = Vec::new();

        while self.buf.len() >= RecordHeader::SIZE {
            let header = RecordHeader::parse(&self.buf.as_slice()[..RecordHeader::SIZE])?;
            let total = RecordHeader::SIZE + header.size as usize;
            if self.buf.len() < total {
                break;
            }

            let payload = self.buf.as_slice()[RecordHeader::SIZE..total].to_vec();
            self.buf.discard(total);

            match header.record_type {
                RecordType::Misc => self.handle_misc(&payload, now_micros),
                RecordType::Video => self.handle_video(&header, payload, now_micros, &mut events),
                RecordType::Audio => self.handle_audio(&header, payload, &mut events)?,
            }
        }

        Ok(events)
    }

    fn handle_misc(&mut self, payload: &[u8], now_micros: u64) {
        if payload.len() != 8 {
            tracing::warn!(len = payload.len(), "misc record was not an 8-byte heartbeat echo, ignoring");
            return;
        }
        let origin_timestamp = LittleEndian::read_u64(payload);
        self.ping.record(now_micros, origin_timestamp);
    }

    fn handle_video(&mut self, header: &RecordHeader, payload: Vec<u8>, now_micros: u64, events: &mut Vec<DemuxEvent>) {
        if self.stats_enabled {
            if self.window_start_us.is_none() {
                self.window_start_us = Some(now_micros);
            }
            self.video_window.accumulate(header.size, header.latency_us);

            if header.keyframe() {
                let elapsed = now_micros.saturating_sub(self.window_start_us.unwrap_or(now_micros));
                let stats = self.video_window.publish_and_reset(elapsed, &self.ping);
                self.window_start_us = Some(now_micros);
                events.push(DemuxEvent::KeyframeStats(stats));
            }
        }

        events.push(DemuxEvent::VideoPayload(payload));
    }

    fn handle_audio(&mut self, header: &RecordHeader, payload: Vec<u8>, events: &mut Vec<DemuxEvent>) -> Result<()> {
        if header.keyframe() {
            if self.audio_config.is_some() {
                return Err(ProtocolError::AudioReconfigured);
            }
            let text = std::str::from_utf8(&payload).map_err(|_| ProtocolError::InvalidAudioConfig)?;
            let config = AudioConfig::parse(text)?;
            self.audio_config = Some(config.clone());
            events.push(DemuxEvent::AudioConfig(config));
            return Ok(());
        }

        if self.audio_config.is_none() {
            return Err(ProtocolError::AudioConfigNotSeen);
        }
        events.push(DemuxEvent::AudioSamples(payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(record_type: u8, flags: u8, latency_us: u64, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![record_type, flags];
        buf.extend_from_slice(&latency_us.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn misc_record_feeds_the_ping_tracker() {
        let mut demux = Demuxer::new(false);
        demux.feed(&record(1, 0, 0, &900u64.to_le_bytes()));
        let events = demux.process(1_000).unwrap();
        assert!(events.is_empty());
        assert_eq!(demux.ping.average_us(), 100.0);
    }

    #[test]
    fn first_audio_record_establishes_the_channel_map() {
        let mut demux = Demuxer::new(false);
        demux.feed(&record(3, 1, 0, b"48000:FL,FR"));
        let events = demux.process(0).unwrap();
        assert!(matches!(&events[0], DemuxEvent::AudioConfig(c) if c.sample_rate == 48_000));
    }

    #[test]
    fn pcm_before_config_is_rejected() {
        let mut demux = Demuxer::new(false);
        demux.feed(&record(3, 0, 0, &[0, 0, 0, 0]));
        assert!(matches!(demux.process(0), Err(ProtocolError::AudioConfigNotSeen)));
    }

    #[test]
    fn second_audio_config_is_rejected() {
        let mut demux = Demuxer::new(false);
        demux.feed(&record(3, 1, 0, b"48000:FL,FR"));
        demux.process(0).unwrap();
        demux.feed(&record(3, 1, 0, b"44100:FL,FR"));
        assert!(matches!(demux.process(0), Err(ProtocolError::AudioReconfigured)));
    }

    #[test]
    fn video_keyframe_emits_stats_when_enabled() {
        let mut demux = Demuxer::new(true);
        demux.feed(&record(2, 0, 5_000, &[0u8; 1000]));
        demux.process(0).unwrap();
        demux.feed(&record(2, 1, 5_000, &[0u8; 1000]));
        let events = demux.process(1_000_000).unwrap();
        assert!(events.iter().any(|e| matches!(e, DemuxEvent::KeyframeStats(_))));
    }

    #[test]
    fn partial_record_is_left_buffered_until_complete() {
        let mut demux = Demuxer::new(false);
        let full = record(1, 0, 0, &42u64.to_le_bytes());
        demux.feed(&full[..full.len() - 2]);
        assert!(demux.process(1_042).unwrap().is_empty());
        assert_eq!(demux.ping.average_us(), 0.0);

        demux.feed(&full[full.len() - 2..]);
        demux.process(1_042).unwrap();
        assert_eq!(demux.ping.average_us(), 1_000.0);
    }
}
