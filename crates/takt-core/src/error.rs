//! Error types for the TAKT stack
//!
//! Subscriber-facing calls report coarse booleans; these variants classify
//! what actually went wrong so the failing call can log it before the
//! boundary flattens it. Two signals are deliberately absent: cycle
//! regressions (reported by the watchdog, not an error) and interrupt
//! requests (a clean-exit request, not a failure).

use thiserror::Error;

/// Core TAKT errors
#[derive(Error, Debug)]
pub enum TaktError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unsupported wire version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown frame kind: {0}")]
    UnknownFrameKind(u8),

    #[error("Frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    // Channel errors
    #[error("Channel not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    // Rendezvous errors
    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("Handshake timed out waiting for acknowledgement")]
    HandshakeTimeout,
}

/// Result type for TAKT operations
pub type TaktResult<T> = Result<T, TaktError>;
