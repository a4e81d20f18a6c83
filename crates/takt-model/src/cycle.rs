//! Delta-cycle anomaly detection
//!
//! Events carry the logical time of the cycle that produced them. A cycle
//! arriving strictly behind the highest time seen so far means two cycles
//! are interleaving somewhere upstream; the watchdog reports it and leaves
//! the reaction to the caller.

use tracing::warn;

use takt_core::SimTime;

/// Tracks the high-water mark of observed simulation time.
#[derive(Debug, Default)]
pub struct CycleWatchdog {
    high_water: Option<SimTime>,
}

impl CycleWatchdog {
    pub fn new() -> Self {
        CycleWatchdog { high_water: None }
    }

    /// Feeds one observed cycle time.
    ///
    /// Returns `true` when `t` regressed behind the high-water mark. The
    /// first observation records `t` (time zero included); repeats of the
    /// current mark are not anomalous; the mark itself never moves
    /// backwards.
    pub fn observe(&mut self, t: SimTime) -> bool {
        match self.high_water {
            None => {
                self.high_water = Some(t);
                false
            }
            Some(mark) if t < mark => {
                warn!(
                    observed = %t,
                    high_water = %mark,
                    "delta cycle behind the high-water mark; duplicate cycles may be running"
                );
                true
            }
            Some(mark) => {
                if t > mark {
                    self.high_water = Some(t);
                }
                false
            }
        }
    }

    /// Highest simulation time observed so far, if any.
    pub fn high_water(&self) -> Option<SimTime> {
        self.high_water
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_observation_records_even_zero() {
        let mut watchdog = CycleWatchdog::new();
        assert!(!watchdog.observe(SimTime::ZERO));
        assert_eq!(watchdog.high_water(), Some(SimTime::ZERO));
        // A later cycle behind an initial zero cannot exist; forward moves.
        assert!(!watchdog.observe(SimTime::new(1)));
    }

    #[test]
    fn test_regression_is_flagged_once_seen() {
        let mut watchdog = CycleWatchdog::new();
        let verdicts: Vec<bool> = [5u64, 6, 4, 6]
            .into_iter()
            .map(|t| watchdog.observe(SimTime::new(t)))
            .collect();
        assert_eq!(verdicts, vec![false, false, true, false]);
    }

    #[test]
    fn test_repeated_cycle_is_not_anomalous() {
        let mut watchdog = CycleWatchdog::new();
        assert!(!watchdog.observe(SimTime::new(7)));
        assert!(!watchdog.observe(SimTime::new(7)));
        assert_eq!(watchdog.high_water(), Some(SimTime::new(7)));
    }

    #[test]
    fn test_mark_survives_regressions() {
        let mut watchdog = CycleWatchdog::new();
        assert!(!watchdog.observe(SimTime::new(9)));
        assert!(watchdog.observe(SimTime::new(3)));
        assert_eq!(watchdog.high_water(), Some(SimTime::new(9)));
    }

    proptest! {
        /// The verdict is `true` exactly when an observation falls strictly
        /// behind the running maximum, and the mark always equals that
        /// maximum. The narrow time range forces repeats and regressions.
        #[test]
        fn test_verdict_tracks_the_running_maximum(
            times in proptest::collection::vec(0u64..48, 1..128),
        ) {
            let mut watchdog = CycleWatchdog::new();
            let mut max_seen: Option<u64> = None;

            for t in times {
                let regressed = watchdog.observe(SimTime::new(t));
                prop_assert_eq!(regressed, max_seen.is_some_and(|m| t < m));

                max_seen = Some(max_seen.map_or(t, |m| m.max(t)));
                prop_assert_eq!(watchdog.high_water(), max_seen.map(SimTime::new));
            }
        }
    }
}
