//! End-to-end lifecycle scenarios
//!
//! The scenarios run a real participant against the in-process publisher:
//! connect, announce filters, rendezvous, stepped delivery, cooperative
//! interrupt. Payloads here follow the harness convention of leading with
//! the cycle time in eight little-endian bytes; the channel itself never
//! looks inside them.

use std::time::Duration;

use takt_channel::{EventChannel, SyncConfig, SyncCoordinator};
use takt_core::{Endpoint, SimTime};
use takt_model::{CycleWatchdog, Model, RunContext};

/// Builds a payload leading with the cycle time.
pub fn cycle_payload(t: SimTime) -> Vec<u8> {
    t.to_le_bytes().to_vec()
}

/// Reads the cycle time off a harness payload, if it carries one.
pub fn read_cycle(payload: &[u8]) -> Option<SimTime> {
    let bytes: [u8; 8] = payload.get(..8)?.try_into().ok()?;
    Some(SimTime::from_le_bytes(bytes))
}

/// A participant that records what it receives and interrupts itself after
/// a target number of events.
pub struct CountingModel {
    channel: EventChannel,
    sync: SyncCoordinator,
    data_endpoint: Endpoint,
    sync_endpoint: Endpoint,
    topics: Vec<String>,
    stop_after: usize,
    watchdog: CycleWatchdog,
    /// Delivered events in arrival order: topic and carried cycle time.
    pub received: Vec<(String, SimTime)>,
    /// Cycle regressions the watchdog flagged.
    pub anomalies: usize,
}

impl CountingModel {
    pub fn new(
        data_endpoint: Endpoint,
        sync_endpoint: Endpoint,
        topics: Vec<String>,
        stop_after: usize,
    ) -> Self {
        // Scenarios drive the publisher side from the test thread; the ack
        // may lag a control-plane drain, so the rendezvous gets extra room.
        let sync_config = SyncConfig::default().with_ack_timeout(Some(Duration::from_secs(2)));
        CountingModel {
            channel: EventChannel::new(),
            sync: SyncCoordinator::with_config(sync_config),
            data_endpoint,
            sync_endpoint,
            topics,
            stop_after,
            watchdog: CycleWatchdog::new(),
            received: Vec::new(),
            anomalies: 0,
        }
    }
}

impl Model for CountingModel {
    fn init(&mut self) {
        self.channel.set_ownership_name("counting-model");
    }

    fn prepare(&mut self) -> bool {
        if !self.channel.connect(self.data_endpoint) {
            return false;
        }
        for topic in &self.topics {
            self.channel.subscribe_to(topic);
        }
        if !self.sync.prepare_synchronization(self.sync_endpoint) {
            return false;
        }
        self.sync.synchronize()
    }

    fn run(&mut self, ctx: &RunContext) {
        while !ctx.interrupted() {
            if !self.channel.receive_event(false) {
                break;
            }
            if let Some(t) = read_cycle(self.channel.event_buffer()) {
                if self.watchdog.observe(t) {
                    self.anomalies += 1;
                }
                self.received
                    .push((self.channel.event_name().to_string(), t));
            }
            if self.received.len() >= self.stop_after {
                ctx.interrupt().raise();
            }
        }
        self.channel.close();
    }

    fn name(&self) -> &str {
        "counting-model"
    }

    fn description(&self) -> &str {
        "records delivered events and watchdog verdicts"
    }
}
