#![allow(dead_code)]

use async_trait::async_trait;
use midihue_control::hue::api::GroupStreamControl;
use midihue_control::hue::stream::{HandshakeStatus, PskIdentity, SecureDatagramChannel};
use midihue_control::hue::HueConfig;
use midihue_control::{ControlError, EventSource, MidiMessage, Result};
use std::collections::VecDeque;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

pub const GROUP_ID: u32 = 2;

pub fn hue_config() -> HueConfig {
    HueConfig {
        bridge_ip: "192.168.1.20".to_string(),
        username: "test-user".to_string(),
        client_key: "0123456789abcdef0123456789abcdef".to_string(),
        group_id: GROUP_ID,
    }
}

/// Channel with a scripted handshake that records everything sent through it
#[derive(Debug)]
pub struct MockChannel {
    script: VecDeque<HandshakeStatus>,
    fallback: HandshakeStatus,
    pub connects: Vec<(IpAddr, u16, String)>,
    pub handshakes: usize,
    pub closes: usize,
    pub sent: Vec<Vec<u8>>,
    pub connect_error: bool,
    pub send_error: bool,
    open: bool,
}

impl MockChannel {
    /// Handshake completes on the first step
    pub fn ready() -> Self {
        Self::scripted([], HandshakeStatus::Ready)
    }

    /// Handshake never completes
    pub fn blocking() -> Self {
        Self::scripted([], HandshakeStatus::WouldBlock)
    }

    pub fn scripted(
        script: impl IntoIterator<Item = HandshakeStatus>,
        fallback: HandshakeStatus,
    ) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
            connects: Vec::new(),
            handshakes: 0,
            closes: 0,
            sent: Vec::new(),
            connect_error: false,
            send_error: false,
            open: false,
        }
    }
}

impl SecureDatagramChannel for MockChannel {
    fn connect(&mut self, address: IpAddr, port: u16, psk: &PskIdentity) -> io::Result<()> {
        if self.connect_error {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }
        self.connects.push((address, port, psk.identity.clone()));
        self.open = true;
        Ok(())
    }

    fn handshake(&mut self) -> HandshakeStatus {
        self.handshakes += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        if self.send_error {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "socket buffer full"));
        }
        assert!(self.open, "send on a closed mock channel");
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
        self.open = false;
    }
}

/// Records stream-mode toggles; can be told to reject them
#[derive(Debug, Clone, Default)]
pub struct MockGroupControl {
    pub calls: Arc<Mutex<Vec<(u32, bool)>>>,
    pub reject: Option<bool>,
}

impl MockGroupControl {
    pub fn rejecting(active: bool) -> Self {
        Self {
            reject: Some(active),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(u32, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroupStreamControl for MockGroupControl {
    async fn set_active(&self, group_id: u32, active: bool) -> Result<()> {
        self.calls.lock().unwrap().push((group_id, active));
        if self.reject == Some(active) {
            return Err(ControlError::Remote("HTTP 403".to_string()));
        }
        Ok(())
    }
}

/// Hands out one pre-recorded batch of events per poll
#[derive(Debug, Default)]
pub struct ScriptedSource {
    batches: VecDeque<Vec<MidiMessage>>,
}

impl ScriptedSource {
    pub fn new(batches: impl IntoIterator<Item = Vec<MidiMessage>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedSource {
    fn poll_pending(&mut self) -> Vec<MidiMessage> {
        self.batches.pop_front().unwrap_or_default()
    }
}

pub fn cc(channel: u8, controller: u8, value: u8) -> MidiMessage {
    MidiMessage::ControlChange {
        channel,
        controller,
        value,
    }
}
