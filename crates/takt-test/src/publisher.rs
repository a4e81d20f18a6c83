//! In-process publisher fixture
//!
//! Binds both publisher planes on loopback so tests can drive a real
//! subscriber stack end to end: learn subscribers from their attach and
//! subscribe frames, answer the rendezvous, then emit events. Delivery is
//! deliberately unfiltered; enforcing topic filters is the subscriber's job
//! and exactly what the scenarios assert.

use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use takt_core::Endpoint;
use takt_wire::{self as wire, WireFrame};

/// Publisher half of the protocol, test grade.
pub struct TestPublisher {
    data_socket: UdpSocket,
    sync_socket: UdpSocket,
    data_endpoint: Endpoint,
    sync_endpoint: Endpoint,
    subscribers: Vec<SocketAddr>,
    subscriptions: HashMap<SocketAddr, HashSet<String>>,
}

impl TestPublisher {
    /// Binds both planes on ephemeral loopback ports.
    pub fn bind() -> io::Result<Self> {
        let data_socket = UdpSocket::bind("127.0.0.1:0")?;
        let sync_socket = UdpSocket::bind("127.0.0.1:0")?;
        let data_endpoint = Endpoint::from(data_socket.local_addr()?);
        let sync_endpoint = Endpoint::from(sync_socket.local_addr()?);

        Ok(TestPublisher {
            data_socket,
            sync_socket,
            data_endpoint,
            sync_endpoint,
            subscribers: Vec::new(),
            subscriptions: HashMap::new(),
        })
    }

    /// Where subscribers connect their event channel.
    pub fn data_endpoint(&self) -> Endpoint {
        self.data_endpoint
    }

    /// Where subscribers run the rendezvous.
    pub fn sync_endpoint(&self) -> Endpoint {
        self.sync_endpoint
    }

    /// Drains attach and subscribe traffic, recording senders, until the
    /// data plane stays quiet for `window`. Returns the frame count seen.
    pub fn poll_control(&mut self, window: Duration) -> io::Result<usize> {
        self.data_socket.set_read_timeout(Some(window))?;
        let mut buf = [0u8; 2048];
        let mut seen = 0;

        loop {
            match self.data_socket.recv_from(&mut buf) {
                Ok((len, from)) => {
                    self.note_control(&buf[..len], from);
                    seen += 1;
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(seen);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn note_control(&mut self, buf: &[u8], from: SocketAddr) {
        match wire::decode(buf) {
            Ok(WireFrame::Attach) => self.note_subscriber(from),
            Ok(WireFrame::Subscribe(topic)) => {
                self.note_subscriber(from);
                self.subscriptions
                    .entry(from)
                    .or_default()
                    .insert(topic.to_string());
            }
            // Nothing else flows subscriber to publisher.
            _ => {}
        }
    }

    fn note_subscriber(&mut self, from: SocketAddr) {
        if !self.subscribers.contains(&from) {
            self.subscribers.push(from);
        }
    }

    /// Waits up to `window` for one ready frame and acknowledges it.
    /// Returns the subscriber's sync address, or `None` on timeout.
    pub fn accept_ready(&mut self, window: Duration) -> io::Result<Option<SocketAddr>> {
        self.sync_socket.set_read_timeout(Some(window))?;
        let mut buf = [0u8; 64];

        loop {
            match self.sync_socket.recv_from(&mut buf) {
                Ok((len, from)) => {
                    if matches!(wire::decode(&buf[..len]), Ok(WireFrame::Ready)) {
                        self.sync_socket.send_to(&wire::encode_ack(), from)?;
                        return Ok(Some(from));
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends one event to every attached subscriber, regardless of their
    /// announced filters. Returns the number of receivers.
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> io::Result<usize> {
        let frame = wire::encode_event(topic, payload)
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))?;
        for addr in &self.subscribers {
            self.data_socket.send_to(&frame, *addr)?;
        }
        Ok(self.subscribers.len())
    }

    /// Subscribers learned so far, in attach order.
    pub fn subscribers(&self) -> &[SocketAddr] {
        &self.subscribers
    }

    /// Filters a subscriber announced upstream, if any were seen.
    pub fn subscriptions_of(&self, addr: SocketAddr) -> Option<&HashSet<String>> {
        self.subscriptions.get(&addr)
    }
}
