//! Error types for the control pipeline
use thiserror::Error;

/// Control pipeline errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Malformed configuration detected while building lights or bindings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The bridge rejected a group stream-mode toggle
    #[error("Remote error: {0}")]
    Remote(String),

    /// The secured channel never became ready
    #[error("Handshake exhausted after {attempts} attempts")]
    HandshakeExhausted { attempts: u32 },

    /// An operation was called in a session state that does not allow it
    #[error("Protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// The secured channel could not be set up
    #[error("Channel error: {0}")]
    Channel(String),

    /// Generic MIDI error
    #[error("MIDI error: {0}")]
    Midi(String),

    /// MIDI initialization error
    #[error("MIDI init error: {0}")]
    #[cfg(feature = "midi")]
    MidiInit(#[from] midir::InitError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
