use crate::error::{ProtocolError, Result};

/// The realtime audio engine's channel-position enumeration, in the fixed order the
/// external contract assigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioChannel {
    FrontLeft,
    FrontRight,
    FrontCenter,
    Lfe,
    SideLeft,
    SideRight,
    FrontLeftOfCenter,
    FrontRightOfCenter,
    RearCenter,
    RearLeft,
    RearRight,
    TopCenter,
    TopFrontLeft,
    TopFrontCenter,
    TopFrontRight,
    TopRearLeft,
    TopRearCenter,
    TopRearRight,
    RearLeftOfCenter,
    RearRightOfCenter,
    FrontLeftWide,
    FrontRightWide,
    Lfe2,
    FrontLeftHigh,
    FrontCenterHigh,
    FrontRightHigh,
    TopFrontLeftOfCenter,
    TopFrontRightOfCenter,
    TopSideLeft,
    TopSideRight,
    LeftLfe,
    RightLfe,
    BottomCenter,
    BottomLeftOfCenter,
    BottomRightOfCenter,
}

impl AudioChannel {
    /// Parses one token of a "`<rate>:<channel1>,<channel2>,…`" configuration string.
    fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "FL" => Self::FrontLeft,
            "FR" => Self::FrontRight,
            "FC" => Self::FrontCenter,
            "LFE" => Self::Lfe,
            "SL" => Self::SideLeft,
            "SR" => Self::SideRight,
            "FLC" => Self::FrontLeftOfCenter,
            "FRC" => Self::FrontRightOfCenter,
            "RC" => Self::RearCenter,
            "RL" => Self::RearLeft,
            "RR" => Self::RearRight,
            "TC" => Self::TopCenter,
            "TFL" => Self::TopFrontLeft,
            "TFC" => Self::TopFrontCenter,
            "TFR" => Self::TopFrontRight,
            "TRL" => Self::TopRearLeft,
            "TRC" => Self::TopRearCenter,
            "TRR" => Self::TopRearRight,
            "RLC" => Self::RearLeftOfCenter,
            "RRC" => Self::RearRightOfCenter,
            "FLW" => Self::FrontLeftWide,
            "FRW" => Self::FrontRightWide,
            "LFE2" => Self::Lfe2,
            "FLH" => Self::FrontLeftHigh,
            "FCH" => Self::FrontCenterHigh,
            "FRH" => Self::FrontRightHigh,
            "TFLC" => Self::TopFrontLeftOfCenter,
            "TFRC" => Self::TopFrontRightOfCenter,
            "TSL" => Self::TopSideLeft,
            "TSR" => Self::TopSideRight,
            "LLFE" => Self::LeftLfe,
            "RLFE" => Self::RightLfe,
            "BC" => Self::BottomCenter,
            "BLC" => Self::BottomLeftOfCenter,
            "BRC" => Self::BottomRightOfCenter,
            other => return Err(ProtocolError::UnknownAudioChannel(other.to_string())),
        })
    }
}

/// The parsed contents of the first audio record's configuration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: Vec<AudioChannel>,
}

impl AudioConfig {
    /// Parses `"<rate>:<channel1>,<channel2>,…"`, e.g. `"48000:FL,FR"`.
    pub fn parse(text: &str) -> Result<Self> {
        let (rate, channels) = text.split_once(':').ok_or(ProtocolError::InvalidAudioConfig)?;

        let sample_rate: u32 = rate.parse().map_err(|_| ProtocolError::InvalidAudioConfig)?;
        if sample_rate != 44_100 && sample_rate != 48_000 {
            return Err(ProtocolError::UnsupportedSampleRate(sample_rate));
        }

        let channels = channels
            .split(',')
            .map(AudioChannel::from_name)
            .collect::<Result<Vec<_>>>()?;
        if channels.is_empty() {
            return Err(ProtocolError::InvalidAudioConfig);
        }

        Ok(Self { sample_rate, channels })
    }

    /// Bytes per interleaved PCM frame: 2 (S16LE) times the channel count.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels.len() * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stereo_48k() {
        let config = AudioConfig::parse("48000:FL,FR").unwrap();
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.channels, vec![AudioChannel::FrontLeft, AudioChannel::FrontRight]);
        assert_eq!(config.bytes_per_frame(), 4);
    }

    #[test]
    fn parses_five_point_one_44k() {
        let config = AudioConfig::parse("44100:FL,FR,FC,LFE,SL,SR").unwrap();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels.len(), 6);
    }

    #[test]
    fn rejects_unsupported_sample_rate() {
        let err = AudioConfig::parse("96000:FL,FR").unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedSampleRate(96_000)));
    }

    #[test]
    fn rejects_unknown_channel_name() {
        let err = AudioConfig::parse("48000:FL,XX").unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownAudioChannel(name) if name == "XX"));
    }

    #[test]
    fn rejects_malformed_string_without_colon() {
        assert!(matches!(AudioConfig::parse("48000FLFR"), Err(ProtocolError::InvalidAudioConfig)));
    }
}
