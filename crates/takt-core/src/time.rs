//! Logical time for stepped simulation
//!
//! Participants never read wall clocks to order work; the simulation master
//! assigns each delta cycle a logical time and events carry it to the edges.

use std::fmt;

/// Logical simulation time: the delta-cycle counter assigned by the master.
///
/// Monotonic from the master's point of view; participants verify that
/// rather than assume it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn new(t: u64) -> Self {
        SimTime(t)
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Wire form used by payload conventions that lead with the cycle time.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        SimTime(u64::from_le_bytes(bytes))
    }
}

impl From<u64> for SimTime {
    fn from(t: u64) -> Self {
        SimTime(t)
    }
}

impl fmt::Debug for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t({})", self.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
