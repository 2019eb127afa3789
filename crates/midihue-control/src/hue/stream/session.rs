use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::channel::{HandshakeStatus, SecureDatagramChannel, STREAM_PORT};
use super::protocol::StreamMessage;
use crate::hue::api::GroupStreamControl;
use crate::hue::models::BridgeDirectory;
use crate::{error::ControlError, Result};

/// Lifecycle of a [`StreamingSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    /// Handshake attempts ran out; `send` is rejected until the next `start`
    Failed,
}

/// Handshake pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub handshake_attempts: u32,
    /// How long one attempt keeps retrying a handshake that would block
    #[serde(with = "millis", rename = "attempt_timeout_ms")]
    pub attempt_timeout: Duration,
    pub port: u16,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            handshake_attempts: 3,
            attempt_timeout: Duration::from_millis(1000),
            port: STREAM_PORT,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Entertainment stream to one light group over a secured datagram channel.
///
/// `start` enables streaming on the bridge and then performs the handshake;
/// `stop` closes the channel and disables streaming again.
pub struct StreamingSession<C> {
    group_id: u32,
    directory: Box<dyn BridgeDirectory>,
    control: Box<dyn GroupStreamControl>,
    channel: C,
    settings: SessionSettings,
    state: SessionState,
    sequence: u8,
}

impl<C: SecureDatagramChannel> StreamingSession<C> {
    pub fn new(
        group_id: u32,
        directory: Box<dyn BridgeDirectory>,
        control: Box<dyn GroupStreamControl>,
        channel: C,
        settings: SessionSettings,
    ) -> Self {
        Self {
            group_id,
            directory,
            control,
            channel,
            settings,
            state: SessionState::Idle,
            sequence: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Enable streaming for the group and connect the secured channel.
    ///
    /// A rejected stream-mode toggle leaves the state unchanged. Running out
    /// of handshake attempts leaves the session `Failed`.
    pub async fn start(&mut self) -> Result<()> {
        if self.state == SessionState::Connected {
            debug!("Stream for group {} already connected", self.group_id);
            return Ok(());
        }

        let address = self.directory.resolve_address()?;
        let psk = self.directory.session_identity()?;

        info!("Activating stream mode for group {}...", self.group_id);
        self.control.set_active(self.group_id, true).await?;

        self.state = SessionState::Connecting;
        let attempts = self.settings.handshake_attempts.max(1);

        for attempt in 1..=attempts {
            self.channel.close();
            if let Err(e) = self.channel.connect(address, self.settings.port, &psk) {
                self.state = SessionState::Failed;
                return Err(ControlError::Channel(format!(
                    "Failed to open stream channel to {}:{}: {}",
                    address, self.settings.port, e
                )));
            }

            match self.handshake_attempt().await {
                HandshakeStatus::Ready => {
                    self.state = SessionState::Connected;
                    self.sequence = 0;
                    info!(
                        "Entertainment stream for group {} connected ({}:{})",
                        self.group_id, address, self.settings.port
                    );
                    return Ok(());
                }
                status => {
                    warn!(
                        "Handshake attempt {}/{} did not complete: {:?}",
                        attempt, attempts, status
                    );
                }
            }
        }

        self.channel.close();
        self.state = SessionState::Failed;
        Err(ControlError::HandshakeExhausted { attempts })
    }

    /// Retry a blocked handshake immediately until it settles or the
    /// per-attempt timeout runs out.
    async fn handshake_attempt(&mut self) -> HandshakeStatus {
        let deadline = Instant::now() + self.settings.attempt_timeout;
        let mut steps = 0u32;
        loop {
            steps += 1;
            match self.channel.handshake() {
                HandshakeStatus::WouldBlock => {
                    if Instant::now() >= deadline {
                        debug!("Handshake still blocked after {} steps", steps);
                        return HandshakeStatus::WouldBlock;
                    }
                    tokio::task::yield_now().await;
                }
                status => return status,
            }
        }
    }

    /// Send one frame as a single datagram. Only valid while `Connected`.
    pub fn send(&mut self, frame: &StreamMessage) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(ControlError::ProtocolMisuse(format!(
                "send called while session is {:?}",
                self.state
            )));
        }

        let bytes = frame.encode(self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        self.channel.send(&bytes)?;
        trace!("Sent stream frame ({} lights)", frame.len());
        Ok(())
    }

    /// Close the channel and disable streaming for the group. The session is
    /// `Idle` afterwards even if the bridge rejects the toggle.
    pub async fn stop(&mut self) -> Result<()> {
        self.channel.close();
        let previous = std::mem::replace(&mut self.state, SessionState::Idle);
        if previous != SessionState::Idle {
            info!("Stream for group {} closed (was {:?})", self.group_id, previous);
        }

        info!("Deactivating stream mode for group {}...", self.group_id);
        self.control.set_active(self.group_id, false).await
    }
}
