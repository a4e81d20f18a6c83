//! Frame layout for the TAKT wire protocol
//!
//! Every datagram starts with one header byte:
//! - High nibble: wire version
//! - Low nibble: frame kind
//!
//! Bodies by kind:
//! - Attach, Ready, Ack: header byte only
//! - Subscribe: topic bytes (UTF-8) to the end of the datagram
//! - Event: topic length (u16 LE) + topic bytes + payload to the end
//!
//! Payload bytes are opaque here; any structure inside them is a consumer
//! convention.

use takt_core::{TaktError, TaktResult};

/// Current wire protocol version
pub const WIRE_VERSION: u8 = 1;

/// Largest encodable datagram (UDP payload limit over IPv4)
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Frame kind carried in the low nibble of the header byte
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Subscriber announces itself after connecting the data plane
    Attach = 0x01,
    /// Topic filter registration forwarded upstream
    Subscribe = 0x02,
    /// Published event: topic plus opaque payload
    Event = 0x03,
    /// Rendezvous: subscriber is ready to receive
    Ready = 0x04,
    /// Rendezvous: publisher acknowledges readiness
    Ack = 0x05,
}

impl FrameKind {
    pub fn from_nibble(n: u8) -> Option<Self> {
        match n {
            0x01 => Some(FrameKind::Attach),
            0x02 => Some(FrameKind::Subscribe),
            0x03 => Some(FrameKind::Event),
            0x04 => Some(FrameKind::Ready),
            0x05 => Some(FrameKind::Ack),
            _ => None,
        }
    }

    #[inline]
    pub fn to_nibble(self) -> u8 {
        self as u8
    }
}

/// Borrowed view of an event frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRef<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
}

/// A decoded frame, borrowing topic and payload from the input datagram
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireFrame<'a> {
    Attach,
    Subscribe(&'a str),
    Event(EventRef<'a>),
    Ready,
    Ack,
}

#[inline]
fn header_byte(kind: FrameKind) -> u8 {
    (WIRE_VERSION << 4) | kind.to_nibble()
}

fn validate_topic(topic: &str) -> TaktResult<()> {
    if topic.is_empty() {
        return Err(TaktError::InvalidTopic("empty topic".into()));
    }
    if topic.len() > u16::MAX as usize {
        return Err(TaktError::InvalidTopic(format!(
            "topic of {} bytes exceeds length field",
            topic.len()
        )));
    }
    Ok(())
}

/// Encode an attach announcement.
pub fn encode_attach() -> [u8; 1] {
    [header_byte(FrameKind::Attach)]
}

/// Encode a rendezvous ready frame. Presence is the whole message.
pub fn encode_ready() -> [u8; 1] {
    [header_byte(FrameKind::Ready)]
}

/// Encode a rendezvous acknowledgement.
pub fn encode_ack() -> [u8; 1] {
    [header_byte(FrameKind::Ack)]
}

/// Encode a subscription announcement for `topic`.
pub fn encode_subscribe(topic: &str) -> TaktResult<Vec<u8>> {
    validate_topic(topic)?;
    let size = 1 + topic.len();
    if size > MAX_DATAGRAM_SIZE {
        return Err(TaktError::FrameTooLarge {
            size,
            max: MAX_DATAGRAM_SIZE,
        });
    }
    let mut buf = Vec::with_capacity(size);
    buf.push(header_byte(FrameKind::Subscribe));
    buf.extend_from_slice(topic.as_bytes());
    Ok(buf)
}

/// Encode an event frame carrying an opaque payload.
pub fn encode_event(topic: &str, payload: &[u8]) -> TaktResult<Vec<u8>> {
    validate_topic(topic)?;
    let size = 1 + 2 + topic.len() + payload.len();
    if size > MAX_DATAGRAM_SIZE {
        return Err(TaktError::FrameTooLarge {
            size,
            max: MAX_DATAGRAM_SIZE,
        });
    }
    let mut buf = Vec::with_capacity(size);
    buf.push(header_byte(FrameKind::Event));
    buf.extend_from_slice(&(topic.len() as u16).to_le_bytes());
    buf.extend_from_slice(topic.as_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Decode one datagram. Topic and payload borrow from `buf`.
pub fn decode(buf: &[u8]) -> TaktResult<WireFrame<'_>> {
    if buf.is_empty() {
        return Err(TaktError::BufferTooShort {
            expected: 1,
            actual: 0,
        });
    }

    let version = buf[0] >> 4;
    if version != WIRE_VERSION {
        return Err(TaktError::UnsupportedVersion(version));
    }

    let kind = FrameKind::from_nibble(buf[0] & 0x0F)
        .ok_or(TaktError::UnknownFrameKind(buf[0] & 0x0F))?;
    let body = &buf[1..];

    match kind {
        FrameKind::Attach => {
            expect_empty(body)?;
            Ok(WireFrame::Attach)
        }
        FrameKind::Ready => {
            expect_empty(body)?;
            Ok(WireFrame::Ready)
        }
        FrameKind::Ack => {
            expect_empty(body)?;
            Ok(WireFrame::Ack)
        }
        FrameKind::Subscribe => {
            let topic = decode_topic(body)?;
            Ok(WireFrame::Subscribe(topic))
        }
        FrameKind::Event => {
            if body.len() < 2 {
                return Err(TaktError::BufferTooShort {
                    expected: 3,
                    actual: buf.len(),
                });
            }
            let topic_len = u16::from_le_bytes([body[0], body[1]]) as usize;
            let rest = &body[2..];
            if rest.len() < topic_len {
                return Err(TaktError::BufferTooShort {
                    expected: 3 + topic_len,
                    actual: buf.len(),
                });
            }
            let topic = decode_topic(&rest[..topic_len])?;
            Ok(WireFrame::Event(EventRef {
                topic,
                payload: &rest[topic_len..],
            }))
        }
    }
}

fn expect_empty(body: &[u8]) -> TaktResult<()> {
    if body.is_empty() {
        Ok(())
    } else {
        Err(TaktError::InvalidWireFormat(format!(
            "{} trailing bytes on a bodyless frame",
            body.len()
        )))
    }
}

fn decode_topic(bytes: &[u8]) -> TaktResult<&str> {
    if bytes.is_empty() {
        return Err(TaktError::InvalidTopic("empty topic".into()));
    }
    std::str::from_utf8(bytes)
        .map_err(|_| TaktError::InvalidTopic("topic is not UTF-8".into()))
}
