//! Host stand-ins for the board peripherals.

use hal_abstractions::{AccelSample, ClickEvents, MotionSensor, SegmentDisplay, TemperatureSensor};

/// Thermometer wandering slowly around room temperature.
pub struct SimThermometer {
    value: f64,
    state: u32,
}

impl SimThermometer {
    pub fn new() -> Self {
        Self {
            value: 21.50,
            state: 0x2545_f491,
        }
    }
}

impl TemperatureSensor for SimThermometer {
    fn init(&mut self) -> bool {
        true
    }

    fn read(&mut self) -> f64 {
        // xorshift-driven drift, bounded to a plausible indoor range
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        let step = (self.state % 5) as f64 / 100.0 - 0.02;
        self.value = (self.value + step).clamp(15.0, 35.0);
        self.value
    }
}

/// Motion sensor that fakes a double tap every so often.
pub struct SimMotion {
    polls: u32,
    tap_every: u32,
}

impl SimMotion {
    /// `tap_every` is in polls; the worker polls once per tick.
    pub fn new(tap_every: u32) -> Self {
        Self {
            polls: 0,
            tap_every,
        }
    }
}

impl MotionSensor for SimMotion {
    fn init(&mut self) -> bool {
        true
    }

    fn read_accel(&mut self) -> AccelSample {
        AccelSample { x: 0, y: 0, z: 1024 }
    }

    fn poll_clicks(&mut self) -> ClickEvents {
        self.polls += 1;
        if self.tap_every != 0 && self.polls % self.tap_every == 0 {
            return ClickEvents {
                single: false,
                double: true,
                axes: 0b0100,
            };
        }
        ClickEvents::default()
    }
}

/// Console rendition of the 4-digit segment display.
///
/// Keeps the same frame-buffer semantics as the hardware part: mutators
/// only touch the buffer, and `draw` publishes it. A frame is only logged
/// when it differs from the one last drawn.
pub struct ConsoleDisplay {
    digits: [char; 4],
    points: [bool; 4],
    last_frame: Option<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            digits: [' '; 4],
            points: [false; 4],
            last_frame: None,
        }
    }

    /// Boot splash, shown until the first reading replaces it.
    pub fn splash(&mut self) {
        for (i, ch) in "boot".chars().enumerate() {
            self.set_alpha(ch, i, false);
        }
        self.draw();
    }

    fn render(&self) -> String {
        let mut frame = String::new();
        for (i, ch) in self.digits.iter().enumerate() {
            frame.push(*ch);
            if self.points[i] {
                frame.push('.');
            }
        }
        frame
    }
}

impl SegmentDisplay for ConsoleDisplay {
    fn show_value(&mut self, value: u16, decimal: bool) {
        let value = value.min(9999);
        let text = format!("{:04}", value);
        for (i, ch) in text.chars().enumerate() {
            self.digits[i] = ch;
        }
        self.points = [false, decimal, false, false];
    }

    fn set_alpha(&mut self, ch: char, digit: usize, dot: bool) {
        if digit < 4 {
            self.digits[digit] = ch;
            self.points[digit] = dot;
        }
    }

    fn set_point(&mut self, digit: usize, on: bool) {
        if digit < 4 {
            self.points[digit] = on;
        }
    }

    fn clear(&mut self) {
        self.digits = [' '; 4];
        self.points = [false; 4];
    }

    fn draw(&mut self) {
        let frame = self.render();
        if self.last_frame.as_deref() != Some(&frame) {
            log::info!("display: [{}]", frame);
            self.last_frame = Some(frame);
        }
    }
}
