#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] scuffle_protocol::ProtocolError),
    #[error(transparent)]
    Decoder(#[from] scuffle_decoder::DecoderError),
    #[error(transparent)]
    Accel(#[from] scuffle_accel::AccelError),
    #[error(transparent)]
    Input(#[from] scuffle_input::InputError),
    #[error("failed to parse a NAL unit: {0}")]
    NalParse(#[source] std::io::Error),
    #[error("slice segment arrived before its SPS/PPS were seen")]
    HeaderNotSeen,
    #[error("could not resolve server address {addr}")]
    UnresolvedAddress { addr: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;
