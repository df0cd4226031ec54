//! Cooperative worker loop
//!
//! One tick every few milliseconds, no blocking waits. Each tick reads the
//! sensor, reports upstream when the read period has elapsed, consumes any
//! events the interrupt handler latched since the previous tick, enforces
//! the kill-timer, and — whenever a response was processed or anything
//! went wrong — returns the channel to a known-closed state. The channel
//! never stays open across a completed exchange: with no request IDs on
//! the wire, an overlapping response could not be told apart from a stale
//! one.

#![deny(unsafe_code)]

use hal_abstractions::{MonotonicClock, MotionSensor, SegmentDisplay, TemperatureSensor};

use crate::channel::ChannelManager;
use crate::config::NodeConfig;
use crate::error::{FatalFault, OpenError};
use crate::http::{self, ResponseOutcome};
use crate::net::NetworkLink;
use crate::notify::EventLatch;
use crate::supervisor::Supervisor;

/// Interrupt line assigned to channel notifications.
pub const IRQ_CHANNEL_NOTIFY: u32 = 2;

/// Drives the sensing/reporting cycle against one channel manager.
pub struct WorkerLoop<'a, TS, MS, D> {
    config: NodeConfig,
    manager: ChannelManager,
    latch: &'a EventLatch,
    sensor: TS,
    motion: Option<MS>,
    display: D,
    got_sensor: bool,
    got_motion: bool,
    temp: f64,
    last_read: u32,
    last_refresh: u32,
    alert_pending: bool,
    connected: bool,
}

impl<'a, TS, MS, D> WorkerLoop<'a, TS, MS, D>
where
    TS: TemperatureSensor,
    MS: MotionSensor,
    D: SegmentDisplay,
{
    pub fn new(
        config: NodeConfig,
        manager: ChannelManager,
        latch: &'a EventLatch,
        sensor: TS,
        motion: Option<MS>,
        display: D,
    ) -> Self {
        Self {
            config,
            manager,
            latch,
            sensor,
            motion,
            display,
            got_sensor: false,
            got_motion: false,
            temp: 0.0,
            last_read: 0,
            last_refresh: 0,
            alert_pending: false,
            connected: false,
        }
    }

    /// Probe the sensors and take the first reading. Absent parts are
    /// skipped for the lifetime of the loop.
    pub fn init(&mut self) {
        self.got_sensor = self.sensor.init();
        if self.got_sensor {
            self.temp = self.sensor.read();
        } else {
            warn!("temperature sensor not found");
        }

        if let Some(motion) = self.motion.as_mut() {
            self.got_motion = motion.init();
            if !self.got_motion {
                warn!("motion sensor not found");
            }
        }
    }

    /// Last temperature reading, degrees Celsius.
    pub fn temperature(&self) -> f64 {
        self.temp
    }

    /// Whether the channel is currently open.
    pub fn channel_open(&self) -> bool {
        self.manager.is_open()
    }

    /// Borrow the display, e.g. to render a fault code once the loop has
    /// stopped.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// One pass of the cycle.
    ///
    /// Returns the response outcome if one was consumed this tick.
    /// `Err` means the supervisor broke its close contract; the caller
    /// must stop scheduling and surface the fault code.
    pub fn tick<S: Supervisor>(
        &mut self,
        now: u32,
        sv: &mut S,
        net: &NetworkLink,
    ) -> Result<Option<ResponseOutcome>, FatalFault> {
        let mut force_close = false;

        // Sensing and the periodic telemetry report.
        if self.got_sensor {
            self.temp = self.sensor.read();

            if now.wrapping_sub(self.last_read) >= self.config.read_period_ms {
                self.last_read = now;
                info!("temperature: {} C", self.temp);
                self.display.set_point(0, true);
                self.display.draw();

                if self.manager.is_open() {
                    // Previous exchange still holds the channel; skip this
                    // period rather than overlap requests.
                    error!("channel handle not zero, skipping report");
                } else if self.report_telemetry(sv, net, now).is_err() {
                    force_close = true;
                }
            }
        }

        // Motion alert path: a double tap queues a warning push, sent as
        // soon as the channel is free.
        if self.got_motion {
            if let Some(motion) = self.motion.as_mut() {
                if motion.poll_clicks().double {
                    info!("double tap detected");
                    self.alert_pending = true;
                }
            }
        }
        if self.alert_pending && !self.manager.is_open() && self.send_warning(sv, net, now).is_err()
        {
            force_close = true;
        }

        // Consume the events the interrupt handler latched since last tick.
        let mut outcome = None;
        if self.latch.take_response_ready() {
            let result = http::read_response(sv, self.manager.handle());
            match &result {
                ResponseOutcome::Success { status_code, body } => {
                    info!(
                        "request succeeded: status {}, {} body byte(s)",
                        status_code,
                        body.len()
                    );
                }
                ResponseOutcome::TransportError { code } => {
                    warn!("transport failed, code {}", code);
                }
                ResponseOutcome::ApplicationError { status_code } => {
                    warn!("server answered status {}", status_code);
                }
            }
            outcome = Some(result);
        }

        if self.latch.take_channel_force_closed() {
            warn!("channel closed remotely");
            force_close = true;
        }

        if self.manager.poll_timeout(now) {
            warn!("request timed out, killing channel");
            force_close = true;
        }

        // The channel is single-use: close after a processed response or
        // any failure, so the next period starts from Closed.
        if force_close || outcome.is_some() {
            self.manager.close(sv)?;
        }

        self.refresh_display(now, sv, net);

        Ok(outcome)
    }

    /// Run ticks off the board clock until a fatal fault surfaces.
    pub fn run<S: Supervisor, C: MonotonicClock>(
        &mut self,
        sv: &mut S,
        net: &NetworkLink,
        clock: &mut C,
    ) -> FatalFault {
        loop {
            let now = clock.now_ms();
            match self.tick(now, sv, net) {
                Ok(_) => clock.delay_ms(self.config.tick_ms),
                Err(fault) => {
                    error!("fatal fault {}: {:?}", fault.code(), fault);
                    return fault;
                }
            }
        }
    }

    fn report_telemetry<S: Supervisor>(
        &mut self,
        sv: &mut S,
        net: &NetworkLink,
        now: u32,
    ) -> Result<(), ()> {
        match self.manager.open(sv, net.handle()) {
            Ok(()) => {}
            Err(e) => {
                warn!("channel open failed: {:?}", e);
                return Err(());
            }
        }

        let body = match http::telemetry_body(self.temp) {
            Ok(body) => body,
            Err(_) => {
                warn!("telemetry body overflow, skipping report");
                return Err(());
            }
        };

        self.manager.send(sv, body.as_bytes(), now).map_err(|e| {
            warn!("telemetry send failed: {:?}", e);
        })
    }

    fn send_warning<S: Supervisor>(
        &mut self,
        sv: &mut S,
        net: &NetworkLink,
        now: u32,
    ) -> Result<(), ()> {
        match self.manager.open(sv, net.handle()) {
            Ok(()) => {}
            // Not up yet; keep the alert queued and retry next tick.
            Err(OpenError::NetworkNotReady) => return Ok(()),
            Err(e) => {
                warn!("channel open failed: {:?}", e);
                return Err(());
            }
        }

        let body = match http::warning_body(http::WARNING_MOVEMENT) {
            Ok(body) => body,
            Err(_) => {
                self.alert_pending = false;
                return Ok(());
            }
        };

        match self.manager.send(sv, body.as_bytes(), now) {
            Ok(()) => {
                self.alert_pending = false;
                Ok(())
            }
            Err(e) => {
                warn!("warning send failed: {:?}", e);
                Err(())
            }
        }
    }

    fn refresh_display<S: Supervisor>(&mut self, now: u32, sv: &mut S, net: &NetworkLink) {
        if now.wrapping_sub(self.last_refresh) < self.config.display_refresh_ms {
            return;
        }
        self.last_refresh = now;
        self.connected = net.is_connected(sv);

        if self.got_sensor {
            self.display.show_value(display_value(self.temp), true);
            self.display.set_alpha('c', 3, !self.connected);
            self.display.draw();
        }
    }
}

/// Scale a reading for the 4-digit display: hundredths of a degree,
/// clamped to what four digits can show. Display policy only — the
/// reported telemetry carries the unclamped value.
pub fn display_value(temp: f64) -> u16 {
    let scaled = temp * 100.0;
    if scaled <= 0.0 {
        0
    } else if scaled >= 9999.0 {
        9999
    } else {
        (scaled + 0.5) as u16
    }
}

/// Render a fatal fault code on the display: `E` followed by the code.
pub fn render_fault<D: SegmentDisplay>(display: &mut D, fault: &FatalFault) {
    display.clear();
    display.show_value(fault.code(), false);
    display.set_alpha('e', 0, false);
    display.set_alpha(' ', 1, false);
    display.draw();
}
