use std::net::{SocketAddr, ToSocketAddrs};

use clap::Parser;

use crate::error::{ClientError, Result};

/// A sane default ring capacity: enough frames to absorb a few milliseconds
/// of jitter at typical sample rates without growing unbounded.
const DEFAULT_AUDIO_RING_SAMPLES: usize = 1 << 13;

#[derive(Debug, Parser)]
#[command(name = "scuffle-stream-client", about = "Desktop-streaming client")]
pub struct Cli {
    /// Server address, e.g. `192.168.1.50:9000`.
    pub address: String,

    /// Disable the virtual HID input forwarder.
    #[arg(long)]
    pub no_input: bool,

    /// Log per-keyframe bitrate/latency statistics.
    #[arg(long)]
    pub stats: bool,

    /// Audio ring buffer capacity, in sample frames.
    #[arg(long, default_value_t = DEFAULT_AUDIO_RING_SAMPLES)]
    pub audio: usize,
}

/// The validated result of CLI parsing; immutable for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub no_input: bool,
    pub stats: bool,
    pub audio_ring_samples: usize,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let server_addr = cli
            .address
            .to_socket_addrs()
            .map_err(ClientError::Io)?
            .next()
            .ok_or_else(|| ClientError::UnresolvedAddress { addr: cli.address.clone() })?;

        Ok(Self {
            server_addr,
            no_input: cli.no_input,
            stats: cli.stats,
            audio_ring_samples: cli.audio,
        })
    }
}
