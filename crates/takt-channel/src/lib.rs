//! TAKT Channel - Subscriber-side event delivery
//!
//! This crate implements the subscriber half of the publish/subscribe
//! contract:
//! - EventChannel: connected data-plane socket, topic filtering, blocking
//!   and non-blocking reception
//! - SyncCoordinator: the ready/ack rendezvous that closes the slow-joiner
//!   window before the first real event
//!
//! Everything here runs on the caller's thread. There are no internal
//! threads or locks; a blocking call suspends the caller until the socket
//! produces something.

pub mod config;
pub mod event;
pub mod sync;

pub use config::*;
pub use event::*;
pub use sync::*;
