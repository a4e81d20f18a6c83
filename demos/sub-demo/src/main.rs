//! Minimal TAKT subscriber
//!
//! Joins a running publisher, rendezvouses, and logs every event on the
//! subscribed topics until Ctrl+C. Payloads that lead with eight bytes of
//! little-endian cycle time get that time logged and watched for
//! regressions; anything else is logged by size.

use takt_channel::{EventChannel, SyncCoordinator};
use takt_core::{Endpoint, SimTime};
use takt_model::{launch, CycleWatchdog, InterruptFlag, Model, RunContext};
use tracing::info;

struct EventLogger {
    channel: EventChannel,
    sync: SyncCoordinator,
    data_endpoint: Endpoint,
    sync_endpoint: Endpoint,
    topics: Vec<String>,
    watchdog: CycleWatchdog,
    delivered: u64,
}

impl EventLogger {
    fn new(data_endpoint: Endpoint, sync_endpoint: Endpoint, topics: Vec<String>) -> Self {
        EventLogger {
            channel: EventChannel::new(),
            sync: SyncCoordinator::new(),
            data_endpoint,
            sync_endpoint,
            topics,
            watchdog: CycleWatchdog::new(),
            delivered: 0,
        }
    }
}

fn leading_cycle(payload: &[u8]) -> Option<SimTime> {
    let bytes: [u8; 8] = payload.get(..8)?.try_into().ok()?;
    Some(SimTime::from_le_bytes(bytes))
}

impl Model for EventLogger {
    fn init(&mut self) {
        self.channel.set_ownership_name("sub-demo");
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
            self.delivered += 1;

            match leading_cycle(self.channel.event_buffer()) {
                Some(t) => {
                    self.watchdog.observe(t);
                    info!(
                        topic = %self.channel.event_name(),
                        cycle = %t,
                        bytes = self.channel.event_buffer().len(),
                        "event"
                    );
                }
                None => info!(
                    topic = %self.channel.event_name(),
                    bytes = self.channel.event_buffer().len(),
                    "event without a cycle prefix"
                ),
            }
        }
        self.channel.close();
    }

    fn name(&self) -> &str {
        "sub-demo"
    }

    fn description(&self) -> &str {
        "logs events from the simulation bus"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: sub-demo <data_addr> <sync_addr> <topic> [topic ...]");
        println!("Example: sub-demo 127.0.0.1:5556 127.0.0.1:5557 telemetry power");
        return Ok(());
    }

    let data_endpoint: Endpoint = args[1].parse()?;
    let sync_endpoint: Endpoint = args[2].parse()?;
    let topics: Vec<String> = args[3..].to_vec();

    let interrupt = InterruptFlag::registered();
    let ctx = RunContext::new(interrupt);

    let mut model = EventLogger::new(data_endpoint, sync_endpoint, topics);
    if !launch(&mut model, &ctx) {
        return Err("participant failed to prepare".into());
    }

    info!(delivered = model.delivered, "bye");
    Ok(())
}
