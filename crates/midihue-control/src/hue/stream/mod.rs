//! Entertainment streaming: frame encoding, secured channel and session

mod channel;
#[cfg(feature = "dtls")]
mod dtls;
mod protocol;
mod session;

pub use channel::{
    DryRunChannel, HandshakeStatus, PskIdentity, SecureDatagramChannel, UnavailableChannel,
    STREAM_PORT,
};
#[cfg(feature = "dtls")]
pub use dtls::DtlsChannel;
pub use protocol::{StreamMessage, API_VERSION, HEADER_LEN, PROTOCOL_NAME, RECORD_LEN};
pub use session::{SessionSettings, SessionState, StreamingSession};
