//! Subscription rendezvous with the publisher
//!
//! A publisher that emits its first event immediately races its slow
//! joiners: a subscriber still wiring up filters misses everything already
//! sent. The coordinator closes that window with a ready/ack exchange on a
//! dedicated sync channel; the publisher holds the first real event until
//! every expected subscriber has checked in.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Instant;

use tracing::{debug, warn};

use takt_core::{Endpoint, TaktError, TaktResult};
use takt_wire::{self as wire, WireFrame};

use crate::SyncConfig;

/// Progress of the rendezvous exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    /// No rendezvous channel has been opened.
    Idle,
    /// Channel open; readiness has not been acknowledged yet.
    AwaitingAck,
    /// The publisher acknowledged; the slow-joiner window is closed.
    Synchronized,
    /// The last attempt failed; `prepare_synchronization` re-arms.
    Failed,
}

/// One-shot ready/ack state machine for a single subscriber.
pub struct SyncCoordinator {
    config: SyncConfig,
    socket: Option<UdpSocket>,
    state: HandshakeState,
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        SyncCoordinator {
            config,
            socket: None,
            state: HandshakeState::Idle,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Opens the rendezvous channel toward the publisher's sync endpoint.
    ///
    /// Valid from `Idle`, and from `Failed` so callers can drive their own
    /// retry loop; each call is one attempt with no internal retry. Once
    /// `Synchronized`, the exchange is over and this reports `false`.
    pub fn prepare_synchronization(&mut self, endpoint: Endpoint) -> bool {
        if self.state == HandshakeState::Synchronized {
            warn!(endpoint = %endpoint, "rendezvous already complete");
            return false;
        }
        match open_toward(endpoint) {
            Ok(socket) => {
                self.socket = Some(socket);
                self.state = HandshakeState::AwaitingAck;
                debug!(endpoint = %endpoint, "rendezvous channel open");
                true
            }
            Err(err) => {
                self.socket = None;
                self.state = HandshakeState::Failed;
                warn!(endpoint = %endpoint, %err, "rendezvous channel open failed");
                false
            }
        }
    }

    /// Announces readiness and blocks until the publisher acknowledges or
    /// the configured timeout expires.
    ///
    /// `true` only ever follows a received ack; there is no local success
    /// path. Reports `true` again once `Synchronized`, and `false` without
    /// touching the wire when no channel was prepared.
    pub fn synchronize(&mut self) -> bool {
        match self.state {
            HandshakeState::Synchronized => return true,
            HandshakeState::AwaitingAck => {}
            HandshakeState::Idle | HandshakeState::Failed => {
                warn!(state = ?self.state, "synchronize without an open rendezvous channel");
                return false;
            }
        }

        match self.exchange() {
            Ok(()) => {
                // One-shot: the ack consumed the channel's purpose.
                self.socket = None;
                self.state = HandshakeState::Synchronized;
                debug!("rendezvous acknowledged");
                true
            }
            Err(err) => {
                self.socket = None;
                self.state = HandshakeState::Failed;
                warn!(%err, "rendezvous failed");
                false
            }
        }
    }

    fn exchange(&self) -> TaktResult<()> {
        let socket = self.socket.as_ref().ok_or(TaktError::NotConnected)?;

        socket
            .send(&wire::encode_ready())
            .map_err(|e| TaktError::HandshakeFailed(e.to_string()))?;

        let deadline = self.config.ack_timeout.map(|t| Instant::now() + t);
        let mut buf = [0u8; 64];

        loop {
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TaktError::HandshakeTimeout);
                }
                socket
                    .set_read_timeout(Some(deadline - now))
                    .map_err(|e| TaktError::HandshakeFailed(e.to_string()))?;
            }

            let len = match socket.recv(&mut buf) {
                Ok(len) => len,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(TaktError::HandshakeTimeout);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TaktError::HandshakeFailed(e.to_string())),
            };

            match wire::decode(&buf[..len]) {
                Ok(WireFrame::Ack) => return Ok(()),
                Ok(frame) => debug!(?frame, "ignoring non-ack frame during rendezvous"),
                Err(err) => warn!(%err, "malformed datagram on sync channel"),
            }
        }
    }
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn open_toward(endpoint: Endpoint) -> TaktResult<UdpSocket> {
    let bind_addr: SocketAddr = if endpoint.ip().is_ipv6() {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind_addr)
        .map_err(|e| TaktError::ConnectionFailed(e.to_string()))?;
    socket
        .connect(endpoint.as_socket_addr())
        .map_err(|e| TaktError::ConnectionFailed(e.to_string()))?;
    Ok(socket)
}
