//! Topic-filtered event reception
//!
//! The channel owns one connected datagram socket pointed at the publisher's
//! data plane. Filtering happens here, not at the publisher: whatever arrives
//! is decoded, matched against the subscription set, and dropped silently on
//! a miss. Subscriptions are also announced upstream as a courtesy, but
//! delivery never depends on the publisher honoring them.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use tracing::{debug, trace, warn};

use takt_core::{Endpoint, TaktError, TaktResult};
use takt_wire::{self as wire, WireFrame};

use crate::ChannelConfig;

/// Subscriber end of the publisher's data plane.
///
/// Single-threaded by contract: blocking calls suspend the caller, and the
/// current-event accessors borrow channel-owned storage that the next
/// successful receive overwrites.
pub struct EventChannel {
    socket: Option<UdpSocket>,
    topics: HashSet<String>,
    scratch: Vec<u8>,
    event_name: String,
    event_payload: Vec<u8>,
    owner: String,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    pub fn with_config(config: ChannelConfig) -> Self {
        let scratch = vec![0u8; config.recv_buffer_bytes];
        EventChannel {
            socket: None,
            topics: HashSet::new(),
            scratch,
            event_name: String::new(),
            event_payload: Vec::new(),
            owner: String::new(),
        }
    }

    /// Connects the data plane toward `endpoint` and announces this
    /// subscriber. Filters registered before the call are re-announced.
    ///
    /// `false` leaves the channel disconnected; calling again is the only
    /// retry there is.
    pub fn connect(&mut self, endpoint: Endpoint) -> bool {
        match self.open(endpoint) {
            Ok(()) => {
                debug!(
                    endpoint = %endpoint,
                    topics = self.topics.len(),
                    owner = %self.owner,
                    "event channel connected"
                );
                true
            }
            Err(err) => {
                self.socket = None;
                warn!(endpoint = %endpoint, owner = %self.owner, %err, "event channel connect failed");
                false
            }
        }
    }

    fn open(&mut self, endpoint: Endpoint) -> TaktResult<()> {
        let socket = UdpSocket::bind(bind_addr_for(endpoint)).map_err(connection_err)?;
        socket
            .connect(endpoint.as_socket_addr())
            .map_err(connection_err)?;
        socket.send(&wire::encode_attach()).map_err(connection_err)?;

        for topic in &self.topics {
            match wire::encode_subscribe(topic) {
                Ok(frame) => {
                    let _ = socket.send(&frame);
                }
                Err(err) => warn!(topic = %topic, %err, "subscription not announced upstream"),
            }
        }

        self.socket = Some(socket);
        Ok(())
    }

    /// Registers `topic` for delivery and announces it upstream when
    /// connected. Best-effort by contract: the announcement is
    /// fire-and-forget and its outcome is not reported. Duplicates are
    /// no-ops. Topics match exactly; there is no prefix matching.
    pub fn subscribe_to(&mut self, topic: &str) {
        if !self.topics.insert(topic.to_string()) {
            trace!(topic, "already subscribed");
            return;
        }
        if let Some(socket) = &self.socket {
            match wire::encode_subscribe(topic) {
                Ok(frame) => {
                    let _ = socket.send(&frame);
                }
                Err(err) => warn!(topic, %err, "subscription not announced upstream"),
            }
        }
        debug!(topic, "subscribed");
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    /// Waits for the next event on a subscribed topic.
    ///
    /// With `no_block` set, returns `false` immediately when nothing relevant
    /// is pending; pending events for other topics are drained without
    /// waiting and do not disturb the current-event accessors. Without it,
    /// the call suspends until a matching event arrives, the wait is
    /// interrupted by a signal, or the socket fails; the latter two return
    /// `false` so the caller can poll its interrupt flag and decide.
    pub fn receive_event(&mut self, no_block: bool) -> bool {
        loop {
            let len = match self.recv_datagram(no_block) {
                Ok(Some(len)) => len,
                Ok(None) => return false,
                Err(err) => {
                    warn!(owner = %self.owner, %err, "event channel receive failed");
                    return false;
                }
            };

            match wire::decode(&self.scratch[..len]) {
                Ok(WireFrame::Event(ev)) if self.topics.contains(ev.topic) => {
                    self.event_name.clear();
                    self.event_name.push_str(ev.topic);
                    self.event_payload.clear();
                    self.event_payload.extend_from_slice(ev.payload);
                    trace!(
                        topic = %self.event_name,
                        len = self.event_payload.len(),
                        "event received"
                    );
                    return true;
                }
                Ok(WireFrame::Event(ev)) => {
                    trace!(topic = ev.topic, "event dropped: not subscribed");
                }
                Ok(frame) => {
                    debug!(?frame, "control frame ignored on event channel");
                }
                Err(err) => {
                    warn!(owner = %self.owner, %err, "malformed datagram dropped");
                }
            }
        }
    }

    fn recv_datagram(&mut self, no_block: bool) -> TaktResult<Option<usize>> {
        let socket = self.socket.as_ref().ok_or(TaktError::NotConnected)?;

        if no_block {
            socket.set_nonblocking(true).map_err(connection_err)?;
            let received = socket.recv(&mut self.scratch);
            socket.set_nonblocking(false).map_err(connection_err)?;
            match received {
                Ok(len) => Ok(Some(len)),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    Ok(None)
                }
                Err(e) => Err(connection_err(e)),
            }
        } else {
            match socket.recv(&mut self.scratch) {
                Ok(len) => Ok(Some(len)),
                // A signal ended the wait; hand control back without an event.
                Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
                Err(e) => Err(connection_err(e)),
            }
        }
    }

    /// Topic of the most recently received event.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Payload of the most recently received event. The slice aliases
    /// channel-owned storage and is overwritten by the next successful
    /// receive; copy out to retain it.
    pub fn event_buffer(&self) -> &[u8] {
        &self.event_payload
    }

    /// Diagnostic tag carried in this channel's log lines. No wire effect.
    pub fn set_ownership_name(&mut self, name: &str) {
        self.owner = name.to_string();
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Releases the socket. Subsequent receives report `false` until a new
    /// `connect`. Dropping the channel has the same effect.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!(owner = %self.owner, "event channel closed");
        }
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn bind_addr_for(endpoint: Endpoint) -> SocketAddr {
    if endpoint.ip().is_ipv6() {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    }
}

fn connection_err(e: std::io::Error) -> TaktError {
    TaktError::ConnectionFailed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    fn peer() -> (UdpSocket, Endpoint) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(1)))
            .unwrap();
        let endpoint = Endpoint::from(socket.local_addr().unwrap());
        (socket, endpoint)
    }

    /// Reads the attach frame the channel sends on connect and returns the
    /// subscriber's address.
    fn subscriber_addr(peer: &UdpSocket) -> SocketAddr {
        let mut buf = [0u8; 64];
        let (len, from) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(wire::decode(&buf[..len]).unwrap(), WireFrame::Attach);
        from
    }

    #[test]
    fn test_receive_before_connect_is_false() {
        let mut channel = EventChannel::new();
        assert!(!channel.receive_event(true));
        assert!(!channel.receive_event(false));
    }

    #[test]
    fn test_connect_announces_attach_then_earlier_subscriptions() {
        let (peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        channel.subscribe_to("alpha");

        assert!(channel.connect(endpoint));
        assert!(channel.is_connected());

        subscriber_addr(&peer);
        let mut buf = [0u8; 64];
        let (len, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(
            wire::decode(&buf[..len]).unwrap(),
            WireFrame::Subscribe("alpha")
        );
    }

    #[test]
    fn test_subscribe_is_idempotent_and_local() {
        let mut channel = EventChannel::new();
        channel.subscribe_to("alpha");
        channel.subscribe_to("alpha");
        assert!(channel.is_subscribed("alpha"));
        assert!(!channel.is_subscribed("beta"));
    }

    #[test]
    fn test_nonblocking_empty_channel_is_false_and_fast() {
        let (_peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));

        let started = Instant::now();
        assert!(!channel.receive_event(true));
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn test_blocking_receive_delivers_matching_event() {
        let (peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));
        channel.subscribe_to("alpha");

        let addr = subscriber_addr(&peer);
        peer.send_to(&wire::encode_event("alpha", b"hello").unwrap(), addr)
            .unwrap();

        assert!(channel.receive_event(false));
        assert_eq!(channel.event_name(), "alpha");
        assert_eq!(channel.event_buffer(), b"hello");
    }

    #[test]
    fn test_unsubscribed_topic_is_dropped() {
        let (peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));
        channel.subscribe_to("alpha");

        let addr = subscriber_addr(&peer);
        peer.send_to(&wire::encode_event("beta", b"skip").unwrap(), addr)
            .unwrap();
        peer.send_to(&wire::encode_event("alpha", b"keep").unwrap(), addr)
            .unwrap();

        assert!(channel.receive_event(false));
        assert_eq!(channel.event_name(), "alpha");
        assert_eq!(channel.event_buffer(), b"keep");
    }

    #[test]
    fn test_malformed_datagram_is_skipped() {
        let (peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));
        channel.subscribe_to("alpha");

        let addr = subscriber_addr(&peer);
        peer.send_to(&[0xFF, 0x01, 0x02], addr).unwrap();
        peer.send_to(&wire::encode_event("alpha", b"ok").unwrap(), addr)
            .unwrap();

        assert!(channel.receive_event(false));
        assert_eq!(channel.event_buffer(), b"ok");
    }

    #[test]
    fn test_accessors_track_latest_event() {
        let (peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));
        channel.subscribe_to("alpha");

        let addr = subscriber_addr(&peer);
        peer.send_to(&wire::encode_event("alpha", b"first").unwrap(), addr)
            .unwrap();
        peer.send_to(&wire::encode_event("alpha", b"second-longer").unwrap(), addr)
            .unwrap();

        assert!(channel.receive_event(false));
        assert_eq!(channel.event_buffer(), b"first");
        assert!(channel.receive_event(false));
        assert_eq!(channel.event_buffer(), b"second-longer");
    }

    #[test]
    fn test_refused_peer_fails_the_blocking_receive() {
        // Bind and drop a peer so the attach datagram draws a refusal back
        // onto the connected socket.
        let endpoint = {
            let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
            Endpoint::from(peer.local_addr().unwrap())
        };

        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));

        // Let the refusal land before the wait starts.
        thread::sleep(Duration::from_millis(100));

        let started = Instant::now();
        assert!(!channel.receive_event(false));
        assert!(started.elapsed() < Duration::from_millis(500));
        // No event surfaced; the socket stays for the caller to close.
        assert_eq!(channel.event_name(), "");
        assert!(channel.is_connected());
    }

    #[test]
    fn test_close_releases_the_socket() {
        let (_peer, endpoint) = peer();
        let mut channel = EventChannel::new();
        assert!(channel.connect(endpoint));

        channel.close();
        assert!(!channel.is_connected());
        assert!(!channel.receive_event(true));
    }

    #[test]
    fn test_ownership_name_is_a_local_tag() {
        let mut channel = EventChannel::new();
        assert_eq!(channel.owner(), "");
        channel.set_ownership_name("eps-subscriber");
        assert_eq!(channel.owner(), "eps-subscriber");
    }
}
