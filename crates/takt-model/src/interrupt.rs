//! Cooperative interrupt handling
//!
//! SIGINT must not tear a participant down mid-cycle. The handler performs
//! one relaxed store into a shared flag; run loops poll the flag between
//! iterations and unwind on their own schedule, releasing their channels on
//! the way out. There is no preemptive cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::error;

/// Shared cancellation flag polled by participant run loops.
///
/// Clones observe the same underlying flag.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// A detached flag, raised only by explicit `raise` calls. For tests and
    /// embeddings that manage signals themselves.
    pub fn new() -> Self {
        InterruptFlag {
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The process-wide flag wired to SIGINT.
    ///
    /// The handler is installed on first use; every later call returns a
    /// handle to the same flag, so registration happens once per process.
    /// A refused registration is logged and the flag still works manually.
    pub fn registered() -> Self {
        static PROCESS_FLAG: OnceLock<InterruptFlag> = OnceLock::new();
        PROCESS_FLAG
            .get_or_init(|| {
                let flag = InterruptFlag::new();
                if let Err(err) = signal_hook::flag::register(
                    signal_hook::consts::SIGINT,
                    Arc::clone(&flag.raised),
                ) {
                    error!(%err, "SIGINT handler not installed; interrupts will not be observed");
                }
                flag
            })
            .clone()
    }

    /// Requests cooperative shutdown. Idempotent and safe from any thread;
    /// this store is the entire signal handler.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    /// `true` once an interrupt was requested. Relaxed suffices: the flag
    /// only ever moves from clear to raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_observable_and_idempotent() {
        let flag = InterruptFlag::new();
        assert!(!flag.is_raised());
        flag.raise();
        assert!(flag.is_raised());
        flag.raise();
        assert!(flag.is_raised());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let flag = InterruptFlag::new();
        let observer = flag.clone();
        flag.raise();
        assert!(observer.is_raised());
    }

    #[test]
    fn test_registered_returns_one_process_flag() {
        let first = InterruptFlag::registered();
        let second = InterruptFlag::registered();
        assert!(!first.is_raised());
        first.raise();
        assert!(second.is_raised());
    }
}
