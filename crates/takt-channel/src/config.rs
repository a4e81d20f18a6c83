//! Channel configuration

use std::time::Duration;

use takt_wire::MAX_DATAGRAM_SIZE;

/// Tuning for the event channel.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Scratch buffer size for one incoming datagram. Datagrams longer than
    /// this are truncated by the OS; the default fits the largest possible
    /// UDP payload.
    pub recv_buffer_bytes: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            recv_buffer_bytes: MAX_DATAGRAM_SIZE,
        }
    }
}

impl ChannelConfig {
    pub fn with_recv_buffer_bytes(mut self, bytes: usize) -> Self {
        self.recv_buffer_bytes = bytes;
        self
    }
}

/// Tuning for the rendezvous exchange.
///
/// Retry policy stays with the caller: a failed round is retried by calling
/// `prepare_synchronization` and `synchronize` again, never internally.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// How long `synchronize` waits for the publisher's acknowledgement.
    /// `None` waits indefinitely.
    pub ack_timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            ack_timeout: Some(Duration::from_millis(500)),
        }
    }
}

impl SyncConfig {
    pub fn with_ack_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ack_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ChannelConfig::default().recv_buffer_bytes, MAX_DATAGRAM_SIZE);
        assert_eq!(
            SyncConfig::default().ack_timeout,
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_builders() {
        let channel = ChannelConfig::default().with_recv_buffer_bytes(2048);
        assert_eq!(channel.recv_buffer_bytes, 2048);

        let sync = SyncConfig::default().with_ack_timeout(None);
        assert_eq!(sync.ack_timeout, None);
    }
}
