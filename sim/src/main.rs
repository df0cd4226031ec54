//! Host simulation of the sensor node.
//!
//! Runs the firmware's worker loop against a scripted supervisor on
//! virtual time, so a whole reporting day takes seconds. Usage:
//!
//! ```text
//! node-sim [SIMULATED_SECONDS]
//! ```
//!
//! `RUST_LOG=debug` additionally shows the supervisor-side channel
//! traffic.

mod peripherals;
mod supervisor;

use hal_abstractions::MonotonicClock;
use node_core::channel::ChannelManager;
use node_core::config::NodeConfig;
use node_core::error::FatalFault;
use node_core::net::NetworkLink;
use node_core::notify::{EventLatch, NotificationRing};
use node_core::worker::{render_fault, WorkerLoop, IRQ_CHANNEL_NOTIFY};

use peripherals::{ConsoleDisplay, SimMotion, SimThermometer};
use supervisor::SimSupervisor;

/// Simulated run length when no argument is given.
const DEFAULT_RUN_SECONDS: u32 = 300;

/// Virtual double-tap cadence, in worker polls.
const TAP_EVERY_POLLS: u32 = 4_500;

/// Millisecond clock over virtual time: `delay_ms` advances instantly.
struct VirtualClock {
    now: u32,
}

impl MonotonicClock for VirtualClock {
    fn now_ms(&mut self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

fn fail(display: &mut ConsoleDisplay, fault: FatalFault) -> ! {
    render_fault(display, &fault);
    log::error!("fatal fault {}: {}", fault.code(), fault);
    std::process::exit(i32::from(fault.code()));
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let run_seconds = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECONDS);

    log::info!(
        "sensor node sim v{}, simulating {} second(s)",
        env!("CARGO_PKG_VERSION"),
        run_seconds
    );

    let config = NodeConfig::default();
    let tick_ms = config.tick_ms;

    let mut display = ConsoleDisplay::new();
    display.splash();

    let mut sv = SimSupervisor::new();

    let mut net = NetworkLink::new();
    if let Err(fault) = net.attach(&mut sv) {
        fail(&mut display, fault);
    }

    let latch = EventLatch::new();
    let mut ring = NotificationRing::new();
    let notification = match ring.register(&mut sv, IRQ_CHANNEL_NOTIFY) {
        Ok(handle) => handle,
        Err(fault) => fail(&mut display, fault),
    };

    let manager = ChannelManager::new(notification, &config);
    let mut worker = WorkerLoop::new(
        config,
        manager,
        &latch,
        SimThermometer::new(),
        Some(SimMotion::new(TAP_EVERY_POLLS)),
        display,
    );
    worker.init();

    let mut clock = VirtualClock { now: 0 };
    let end_ms = run_seconds.saturating_mul(1_000);
    while clock.now_ms() < end_ms {
        let now = clock.now_ms();
        sv.now_ms = now;

        // Due events get written to the ring and serviced exactly as the
        // interrupt handler would on hardware.
        for record in sv.take_due(now) {
            ring.deliver(record);
            ring.service(&latch);
        }

        if let Err(fault) = worker.tick(now, &mut sv, &net) {
            let fault_display = worker.display_mut();
            render_fault(fault_display, &fault);
            log::error!("fatal fault {}: {}", fault.code(), fault);
            std::process::exit(i32::from(fault.code()));
        }

        clock.delay_ms(tick_ms);
    }

    log::info!(
        "simulation complete: last reading {:.2} C",
        worker.temperature()
    );
}
