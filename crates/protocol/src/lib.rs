//! Framed record demuxer for the streaming transport.
//!
//! Parses the `{type, flags, latency, size}` header described in the
//! external interface, dispatches misc/video/audio records, tracks the
//! heartbeat ping rolling average and per-keyframe bitrate/latency
//! statistics, and builds the outbound heartbeat record.

mod channel;
mod demux;
mod error;
mod header;
mod heartbeat;
mod stats;

pub use channel::{AudioChannel, AudioConfig};
pub use demux::{DemuxEvent, Demuxer};
pub use error::{ProtocolError, Result};
pub use header::{RecordHeader, RecordType};
pub use heartbeat::{HEARTBEAT_INTERVAL, build as build_heartbeat};
pub use stats::{KeyframeStats, PingTracker, VideoWindow};
