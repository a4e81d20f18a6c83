//! TAKT Core - Fundamental types for simulation participants
//!
//! This crate defines the types shared across the TAKT stack:
//! - Network addressing (Endpoint)
//! - Logical simulation time (SimTime)
//! - Error classification behind the boolean API boundary

pub mod endpoint;
pub mod error;
pub mod time;

pub use endpoint::*;
pub use error::*;
pub use time::*;
