//! Participant lifecycle
//!
//! Participants are trait objects composed with the utilities they need
//! (watchdog, interrupt flag, channels) rather than a base-class hierarchy.
//! The lifecycle is three phases: infallible local setup, a fallible
//! connect-and-synchronize phase, and the run loop.

use tracing::{error, info};

use crate::InterruptFlag;

/// Everything a run loop needs from its surroundings.
///
/// Today that is the interrupt flag. Owning it here keeps cancellation out
/// of global state and lets tests raise it directly.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    interrupt: InterruptFlag,
}

impl RunContext {
    pub fn new(interrupt: InterruptFlag) -> Self {
        RunContext { interrupt }
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Shorthand for the between-iterations poll.
    pub fn interrupted(&self) -> bool {
        self.interrupt.is_raised()
    }
}

/// A simulation participant.
///
/// `prepare` is the only fallible phase: connection and rendezvous belong
/// there, and `false` means the participant must not run. `run` owns the
/// event loop; it returns once the context's interrupt flag is observed or
/// its channel fails, releasing channel resources before it does.
pub trait Model {
    /// Internal setup with no external effects.
    fn init(&mut self);

    /// Connect and synchronize. `false` aborts the launch before `run`.
    fn prepare(&mut self) -> bool;

    /// Main loop. Polls `ctx` between iterations; there is no preemption.
    fn run(&mut self, ctx: &RunContext);

    /// Stable identity for log lines.
    fn name(&self) -> &str;

    /// Human-oriented summary.
    fn description(&self) -> &str;
}

/// Drives a participant through its lifecycle.
///
/// Returns `true` when the model ran and came back; `false` when `prepare`
/// refused, in which case `run` is never invoked.
pub fn launch(model: &mut dyn Model, ctx: &RunContext) -> bool {
    info!(model = model.name(), "initializing");
    model.init();

    if !model.prepare() {
        error!(model = model.name(), "prepare failed; participant will not run");
        return false;
    }

    info!(model = model.name(), "running");
    model.run(ctx);
    info!(
        model = model.name(),
        interrupted = ctx.interrupted(),
        "participant stopped"
    );
    true
}
