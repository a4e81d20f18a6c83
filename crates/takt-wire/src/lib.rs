//! TAKT Wire - Datagram framing
//!
//! One datagram is one frame; the transport's message boundary delimits the
//! payload, so frames carry no trailing length fields. The data plane moves
//! attach/subscribe/event frames, the sync plane the two rendezvous frames.

pub mod frame;

pub use frame::*;
