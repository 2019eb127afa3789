//! DTLS-PSK channel to the Hue Bridge (OpenSSL).
//!
//! The socket is non-blocking, so the handshake is driven step by step from
//! [`SecureDatagramChannel::handshake`] and OpenSSL's want-read/want-write
//! surfaces as [`HandshakeStatus::WouldBlock`].

use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use openssl::ssl::{
    HandshakeError, MidHandshakeSslStream, Ssl, SslContext, SslMethod, SslStream, SslVerifyMode,
};
use tracing::{debug, warn};

use super::channel::{HandshakeStatus, PskIdentity, SecureDatagramChannel};

/// The only cipher suite the bridge accepts for streaming
const CIPHER_LIST: &str = "PSK-AES128-GCM-SHA256";

/// Connected UDP socket as a byte stream for OpenSSL
#[derive(Debug)]
struct UdpStream(UdpSocket);

impl Read for UdpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf)
    }
}

impl Write for UdpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum State {
    Closed,
    Pending(Ssl, UdpStream),
    Handshaking(MidHandshakeSslStream<UdpStream>),
    Established(SslStream<UdpStream>),
}

pub struct DtlsChannel {
    state: State,
}

impl DtlsChannel {
    pub fn new() -> Self {
        Self {
            state: State::Closed,
        }
    }

    fn build_ssl(psk: &PskIdentity) -> io::Result<Ssl> {
        let mut builder = SslContext::builder(SslMethod::dtls()).map_err(io::Error::other)?;
        builder
            .set_cipher_list(CIPHER_LIST)
            .map_err(io::Error::other)?;
        builder.set_verify(SslVerifyMode::NONE);

        let identity = psk.identity.clone().into_bytes();
        let key = psk.key.clone();
        builder.set_psk_client_callback(move |_ssl, _hint, identity_out, psk_out| {
            // identity_out receives a NUL-terminated string
            if identity.len() >= identity_out.len() || key.len() > psk_out.len() {
                return Ok(0);
            }
            identity_out[..identity.len()].copy_from_slice(&identity);
            identity_out[identity.len()] = 0;
            psk_out[..key.len()].copy_from_slice(&key);
            Ok(key.len())
        });

        Ssl::new(&builder.build()).map_err(io::Error::other)
    }
}

impl Default for DtlsChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureDatagramChannel for DtlsChannel {
    fn connect(&mut self, address: IpAddr, port: u16, psk: &PskIdentity) -> io::Result<()> {
        self.close();

        let local = match address {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(SocketAddr::new(address, port))?;
        socket.set_nonblocking(true)?;

        let ssl = Self::build_ssl(psk)?;
        self.state = State::Pending(ssl, UdpStream(socket));
        debug!("DTLS socket ready for {}:{}", address, port);
        Ok(())
    }

    fn handshake(&mut self) -> HandshakeStatus {
        let result = match std::mem::replace(&mut self.state, State::Closed) {
            State::Closed => return HandshakeStatus::Failed,
            State::Established(stream) => {
                self.state = State::Established(stream);
                return HandshakeStatus::Ready;
            }
            State::Pending(ssl, stream) => ssl.connect(stream),
            State::Handshaking(mid) => mid.handshake(),
        };

        match result {
            Ok(stream) => {
                self.state = State::Established(stream);
                HandshakeStatus::Ready
            }
            Err(HandshakeError::WouldBlock(mid)) => {
                self.state = State::Handshaking(mid);
                HandshakeStatus::WouldBlock
            }
            Err(HandshakeError::Failure(mid)) => {
                warn!("DTLS handshake failed: {}", mid.error());
                HandshakeStatus::Failed
            }
            Err(HandshakeError::SetupFailure(e)) => {
                warn!("DTLS setup failed: {}", e);
                HandshakeStatus::Failed
            }
        }
    }

    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        match &mut self.state {
            State::Established(stream) => {
                stream.write_all(datagram)?;
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "DTLS handshake not complete",
            )),
        }
    }

    fn close(&mut self) {
        if let State::Established(mut stream) = std::mem::replace(&mut self.state, State::Closed) {
            // Best effort close_notify; the bridge also times out idle streams.
            let _ = stream.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_channel() {
        let mut channel = DtlsChannel::new();
        assert_eq!(channel.handshake(), HandshakeStatus::Failed);
        assert!(channel.send(b"frame").is_err());
        channel.close();
    }

    #[test]
    fn test_handshake_without_peer_would_block() {
        // Nothing answers on this socket, so the ClientHello goes out and the
        // handshake waits for a reply.
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = peer.local_addr().unwrap().port();
        let psk = PskIdentity {
            identity: "user".to_string(),
            key: vec![0xAB; 16],
        };

        let mut channel = DtlsChannel::new();
        channel
            .connect(IpAddr::V4(Ipv4Addr::LOCALHOST), port, &psk)
            .unwrap();
        assert_eq!(channel.handshake(), HandshakeStatus::WouldBlock);
        assert!(channel.send(b"frame").is_err());
        channel.close();
    }
}
