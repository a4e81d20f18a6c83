//! TAKT Test Harness - Publisher fixture and protocol validation
//!
//! This crate provides:
//! - An in-process publisher driving both planes over loopback
//! - A counting participant and payload helpers for lifecycle scenarios
//! - End-to-end scenarios: rendezvous, filtered delivery, interruption
//! - Wire framing benchmarks

pub mod integration;
pub mod publisher;

pub use integration::*;
pub use publisher::*;
