//! Hardware abstraction traits for the sensor-node firmware
//!
//! This crate defines traits that abstract over the hardware collaborators
//! the core logic talks to: the temperature sensor, the optional motion
//! sensor, the 4-digit segment display, and the board's millisecond clock.
//! BSPs and host simulators implement these traits; the core crate only
//! ever sees the trait surface.

#![no_std]
#![deny(unsafe_code)]

/// A temperature sensor (e.g. an I2C ambient-temperature part).
pub trait TemperatureSensor {
    /// Probe and configure the sensor. Returns `false` if the part is
    /// absent or did not acknowledge; the caller must then skip all reads.
    fn init(&mut self) -> bool;

    /// Read the current temperature in degrees Celsius.
    fn read(&mut self) -> f64;
}

/// One accelerometer sample, raw axis counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Click/tap events latched by the motion sensor since the last poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickEvents {
    /// A single tap was detected.
    pub single: bool,
    /// A double tap was detected.
    pub double: bool,
    /// Raw axis bits from the sensor's click-source register.
    pub axes: u8,
}

/// An accelerometer with click/tap detection (e.g. LIS3DH-class parts).
pub trait MotionSensor {
    /// Probe and configure the sensor. Returns `false` if absent.
    fn init(&mut self) -> bool;

    /// Read the current acceleration sample.
    fn read_accel(&mut self) -> AccelSample;

    /// Drain any click events latched since the previous poll.
    fn poll_clicks(&mut self) -> ClickEvents;
}

/// Stand-in for boards without a motion sensor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMotion;

impl MotionSensor for NoMotion {
    fn init(&mut self) -> bool {
        false
    }

    fn read_accel(&mut self) -> AccelSample {
        AccelSample::default()
    }

    fn poll_clicks(&mut self) -> ClickEvents {
        ClickEvents::default()
    }
}

/// A 4-digit seven-segment display (e.g. HT16K33-driven).
///
/// Mutators only touch an internal frame buffer; nothing reaches the
/// hardware until [`draw`](SegmentDisplay::draw) is called.
pub trait SegmentDisplay {
    /// Write a value in the range 0..=9999 across the four digits.
    /// `decimal` places a decimal point after the second digit, for
    /// fixed-point presentation of scaled readings.
    fn show_value(&mut self, value: u16, decimal: bool);

    /// Put an alphanumeric character on one digit (0..=3), optionally
    /// lighting that digit's point.
    fn set_alpha(&mut self, ch: char, digit: usize, dot: bool);

    /// Light or clear the decimal point on one digit (0..=3).
    fn set_point(&mut self, digit: usize, on: bool);

    /// Clear the frame buffer.
    fn clear(&mut self);

    /// Push the frame buffer to the hardware.
    fn draw(&mut self);
}

/// Millisecond tick source driving the cooperative worker loop.
///
/// The counter is free-running and wraps at `u32::MAX`; consumers must
/// compare instants with `wrapping_sub`.
pub trait MonotonicClock {
    /// Current tick value in milliseconds.
    fn now_ms(&mut self) -> u32;

    /// Sleep (or spin) for the given number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}
