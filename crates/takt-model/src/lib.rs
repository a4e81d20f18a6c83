//! TAKT Model - Participant lifecycle
//!
//! A participant is anything that joins the simulation bus: a device model,
//! a monitor, a logger. This crate defines the lifecycle they share and the
//! two utilities every run loop composes with:
//! - CycleWatchdog: flags delta cycles that regress behind the high-water
//!   mark
//! - InterruptFlag: cooperative SIGINT handling polled between iterations

pub mod cycle;
pub mod interrupt;
pub mod model;

pub use cycle::*;
pub use interrupt::*;
pub use model::*;
