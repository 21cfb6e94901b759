use std::time::Instant;

use scuffle_accel::VaDisplay;
use scuffle_audio_ring::{AudioConsumer, AudioProducer};
use scuffle_decoder::DecoderSession;
use scuffle_input::{InputForwarder, UhidDevice};
use scuffle_protocol::{DemuxEvent, Demuxer, HEARTBEAT_INTERVAL};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::cli::Config;
use crate::error::{ClientError, Result};
use crate::input_events::{self, CompositorEvent};
use crate::video;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Owns every per-session resource and drives the event loop described by
/// the concurrency model: transport, compositor events and the heartbeat
/// timer are serviced in that priority order on every wakeup.
pub struct App {
    config: Config,
    transport: TcpStream,
    demuxer: Demuxer,
    session: DecoderSession,
    audio_producer: Option<AudioProducer>,
    // Held so the ring stays alive; the real-time audio engine that would
    // actually drain it is out of scope and plugs in here.
    _audio_consumer: Option<AudioConsumer>,
    input: Option<InputForwarder>,
    compositor_rx: mpsc::Receiver<CompositorEvent>,
    _compositor_tx: mpsc::Sender<CompositorEvent>,
    start: Instant,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let transport = TcpStream::connect(config.server_addr).await?;
        transport.set_nodelay(true)?;

        let display = VaDisplay::open()?;
        let session = DecoderSession::new(display);

        let input = if config.no_input {
            None
        } else {
            Some(InputForwarder::new(UhidDevice::create()?))
        };

        let (compositor_tx, compositor_rx) = input_events::channel();

        Ok(Self {
            demuxer: Demuxer::new(config.stats),
            config,
            transport,
            session,
            audio_producer: None,
            _audio_consumer: None,
            input,
            compositor_rx,
            _compositor_tx: compositor_tx,
            start: Instant::now(),
        })
    }

    fn monotonic_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub async fn run(mut self, ctx: scuffle_context::Context) -> Result<()> {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        let mut read_buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            tokio::select! {
                biased;

                _ = ctx.done() => {
                    tracing::info!("cancellation requested, shutting down");
                    return Ok(());
                }

                result = self.transport.read(&mut read_buf) => {
                    let n = result?;
                    if n == 0 {
                        tracing::info!("server closed the connection");
                        return Ok(());
                    }
                    self.handle_bytes(&read_buf[..n])?;
                }

                Some(event) = self.compositor_rx.recv(), if !self.config.no_input => {
                    self.handle_input_event(event)?;
                }

                _ = heartbeat.tick() => {
                    self.send_heartbeat().await?;
                }
            }
        }
    }

    fn handle_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.demuxer.feed(bytes);
        let events = self.demuxer.process(self.monotonic_micros())?;
        for event in events {
            self.handle_demux_event(event)?;
        }
        Ok(())
    }

    fn handle_demux_event(&mut self, event: DemuxEvent) -> Result<()> {
        match event {
            DemuxEvent::AudioConfig(config) => {
                let capacity = self.config.audio_ring_samples * config.bytes_per_frame();
                tracing::info!(sample_rate = config.sample_rate, channels = config.channels.len(), capacity, "audio stream configured");
                let (producer, consumer) = scuffle_audio_ring::ring(capacity);
                self.audio_producer = Some(producer);
                self._audio_consumer = Some(consumer);
            }
            DemuxEvent::AudioSamples(samples) => {
                let Some(producer) = &mut self.audio_producer else {
                    tracing::warn!("audio samples arrived before the ring was created, dropping");
                    return Ok(());
                };
                let written = producer.write(&samples);
                if written < samples.len() {
                    tracing::warn!(requested = samples.len(), written, "audio ring overflow, dropping samples");
                }
            }
            DemuxEvent::VideoPayload(payload) => {
                let frames = video::feed_access_unit(&mut self.session, &payload)?;
                for frame in frames {
                    tracing::trace!(
                        surface_index = frame.surface_index,
                        global_counter = frame.global_counter,
                        "decoded frame ready for presentation"
                    );
                }
            }
            DemuxEvent::KeyframeStats(stats) => {
                tracing::info!(
                    ping_us = stats.average_ping_us,
                    mbps = stats.mbps,
                    estimated_latency_us = stats.estimated_end_to_end_latency_us,
                    "keyframe statistics"
                );
            }
        }
        Ok(())
    }

    fn handle_input_event(&mut self, event: CompositorEvent) -> Result<()> {
        let Some(input) = &mut self.input else {
            return Ok(());
        };

        match event {
            CompositorEvent::Key { evdev_code, pressed } => input.key_event(evdev_code, pressed)?,
            CompositorEvent::MouseButton { button, pressed } => input.mouse_button(button, pressed)?,
            CompositorEvent::MouseMove { dx, dy } => input.mouse_move(dx, dy)?,
            CompositorEvent::MouseWheel { delta } => input.mouse_wheel(delta)?,
            CompositorEvent::FocusLost => input.handsoff()?,
        }

        Ok(())
    }

    async fn send_heartbeat(&mut self) -> Result<()> {
        let record = scuffle_protocol::build_heartbeat(self.monotonic_micros());
        self.transport.write_all(&record).await.map_err(ClientError::Io)
    }
}
