/// Fixed double-buffered vsync budget folded into the end-to-end latency
/// estimate, microseconds. Not signalled by the wire protocol; the source
/// this client descends from hard-codes one vsync period at a 60 Hz
/// presentation cadence.
const VSYNC_BUDGET_US: f64 = 16_667.0;

/// Accumulates ping samples across the whole session; the rolling average
/// this produces is reset only by a fresh connection, never by a keyframe.
#[derive(Debug, Default)]
pub struct PingTracker {
    sum_us: i64,
    count: u64,
}

impl PingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one echoed-heartbeat round trip: `ping = now - origin_timestamp`.
    pub fn record(&mut self, now_micros: u64, origin_timestamp_micros: u64) {
        let ping = now_micros as i64 - origin_timestamp_micros as i64;
        self.sum_us += ping;
        self.count += 1;
    }

    /// Arithmetic mean of every ping observed so far, in microseconds.
    pub fn average_us(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_us as f64 / self.count as f64
        }
    }
}

/// Accumulates per-keyframe-window video statistics: bitstream bytes and
/// server-reported latency since the last keyframe (inclusive).
#[derive(Debug, Default)]
pub struct VideoWindow {
    bitstream_bytes: u64,
    latency_sum_us: u64,
    record_count: u64,
}

/// A published statistics snapshot, computed once per keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeStats {
    pub average_ping_us: f64,
    pub mbps: f64,
    pub estimated_end_to_end_latency_us: f64,
}

impl VideoWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one video record into the window.
    pub fn accumulate(&mut self, payload_size: u32, latency_us: u64) {
        self.bitstream_bytes += payload_size as u64;
        self.latency_sum_us += latency_us;
        self.record_count += 1;
    }

    /// Computes a [`KeyframeStats`] snapshot for the window elapsed over
    /// `elapsed_us` wall-clock microseconds, given the session's current
    /// rolling ping average, then resets the window's accumulators.
    pub fn publish_and_reset(&mut self, elapsed_us: u64, ping_tracker: &PingTracker) -> KeyframeStats {
        let average_ping_us = ping_tracker.average_us();

        let avg_frame_latency_us = if self.record_count == 0 {
            0.0
        } else {
            self.latency_sum_us as f64 / self.record_count as f64
        };

        let elapsed_s = (elapsed_us.max(1)) as f64 / 1_000_000.0;
        let mbps = (self.bitstream_bytes as f64 * 8.0) / elapsed_s / 1_000_000.0;

        let estimated_end_to_end_latency_us =
            avg_frame_latency_us + average_ping_us + 2.0 * VSYNC_BUDGET_US + (mbps / 100.0) * 1_000_000.0;

        *self = Self::default();

        KeyframeStats {
            average_ping_us,
            mbps,
            estimated_end_to_end_latency_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_tracker_averages_samples() {
        let mut tracker = PingTracker::new();
        tracker.record(1_000, 900);
        tracker.record(2_000, 1_700);
        assert_eq!(tracker.average_us(), 200.0);
    }

    #[test]
    fn video_window_computes_mbps_over_elapsed_time() {
        let mut window = VideoWindow::new();
        window.accumulate(1_250_000, 10_000);
        let ping = PingTracker::new();
        let stats = window.publish_and_reset(1_000_000, &ping);
        assert_eq!(stats.mbps, 10.0);
    }

    #[test]
    fn window_resets_after_publish() {
        let mut window = VideoWindow::new();
        window.accumulate(1_000, 5_000);
        let ping = PingTracker::new();
        let _ = window.publish_and_reset(1_000_000, &ping);
        let second = window.publish_and_reset(1_000_000, &ping);
        assert_eq!(second.mbps, 0.0);
    }
}
