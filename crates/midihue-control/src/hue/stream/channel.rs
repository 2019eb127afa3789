use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};

use tracing::{info, trace};

/// Entertainment streaming port on the bridge
pub const STREAM_PORT: u16 = 2100;

/// Pre-shared identity and key for the secured channel
#[derive(Clone, PartialEq, Eq)]
pub struct PskIdentity {
    pub identity: String,
    pub key: Vec<u8>,
}

impl fmt::Debug for PskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PskIdentity")
            .field("identity", &"***REDACTED***")
            .field("key", &format!("<{} bytes>", self.key.len()))
            .finish()
    }
}

/// Outcome of one handshake step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    Ready,
    /// The handshake needs more data; call again
    WouldBlock,
    Failed,
}

/// An encrypted, connectionless transport authenticated with a pre-shared key.
///
/// `handshake` is non-blocking: it advances the handshake as far as currently
/// possible and reports whether it finished.
pub trait SecureDatagramChannel {
    fn connect(&mut self, address: IpAddr, port: u16, psk: &PskIdentity) -> io::Result<()>;

    fn handshake(&mut self) -> HandshakeStatus;

    /// Send one datagram
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;

    /// Tear the channel down. Safe to call when already closed.
    fn close(&mut self);
}

impl<C: SecureDatagramChannel + ?Sized> SecureDatagramChannel for Box<C> {
    fn connect(&mut self, address: IpAddr, port: u16, psk: &PskIdentity) -> io::Result<()> {
        (**self).connect(address, port, psk)
    }

    fn handshake(&mut self) -> HandshakeStatus {
        (**self).handshake()
    }

    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        (**self).send(datagram)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Channel that only logs frames, for running without a bridge
#[derive(Debug, Default)]
pub struct DryRunChannel {
    peer: Option<SocketAddr>,
    sent: u64,
}

impl DryRunChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Datagrams accepted since the last connect
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl SecureDatagramChannel for DryRunChannel {
    fn connect(&mut self, address: IpAddr, port: u16, _psk: &PskIdentity) -> io::Result<()> {
        let peer = SocketAddr::new(address, port);
        info!("Dry run: pretending to stream to {}", peer);
        self.peer = Some(peer);
        self.sent = 0;
        Ok(())
    }

    fn handshake(&mut self) -> HandshakeStatus {
        if self.peer.is_some() {
            HandshakeStatus::Ready
        } else {
            HandshakeStatus::Failed
        }
    }

    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        if self.peer.is_none() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "dry run channel closed"));
        }
        self.sent += 1;
        trace!("Dry run frame #{}: {:02X?}", self.sent, datagram);
        Ok(())
    }

    fn close(&mut self) {
        self.peer = None;
    }
}

/// Placeholder used when the crate is built without the `dtls` feature.
#[derive(Debug, Default)]
pub struct UnavailableChannel;

impl SecureDatagramChannel for UnavailableChannel {
    fn connect(&mut self, _address: IpAddr, _port: u16, _psk: &PskIdentity) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Hue entertainment streaming needs DTLS; rebuild with the `dtls` feature",
        ))
    }

    fn handshake(&mut self) -> HandshakeStatus {
        HandshakeStatus::Failed
    }

    fn send(&mut self, _datagram: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "DTLS support not compiled in"))
    }

    fn close(&mut self) {}
}
