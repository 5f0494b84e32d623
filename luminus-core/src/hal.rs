//! Traits for the peripherals the engine drives.
//!
//! Firmware binds these to the PIO strip driver, the SSD1306 and the ADC;
//! the emulator binds them to a terminal. Delays come from
//! [`embedded_hal::delay::DelayNs`] so the same drivers work on both.

use embedded_hal::delay::DelayNs;
use smart_leds::RGB8;

use crate::input::{AxisSample, InputSnapshot};

/// Physical LED strip.
pub trait LedStrip {
    /// Transmits a full frame in strip order. Blocks until the data is out.
    fn write_frame(&mut self, pixels: &[RGB8]);
}

/// Two-line status display.
pub trait TextDisplay {
    /// Replaces the display contents. Lines longer than the display are cut.
    fn show_message(&mut self, line1: &str, line2: &str);
}

/// Joystick and buttons, read fresh on every call.
pub trait Controls {
    fn read_axes(&mut self) -> AxisSample;

    fn is_confirm_pressed(&mut self) -> bool;

    fn is_alt_pressed(&mut self) -> bool;

    /// Reads every control once.
    fn sample(&mut self) -> InputSnapshot {
        InputSnapshot {
            axes: self.read_axes(),
            confirm: self.is_confirm_pressed(),
            alt: self.is_alt_pressed(),
        }
    }
}

/// Everything the blocking session driver needs.
pub trait Board: LedStrip + TextDisplay + Controls + DelayNs {}

impl<T> Board for T where T: LedStrip + TextDisplay + Controls + DelayNs {}
