//! BitDogLab-style Pico wiring and the [`PicoBoard`] that binds it to the
//! engine's peripheral traits.
//!
//! | Signal        | Pin            |
//! |---------------|----------------|
//! | LED data      | GP7 (PIO0 SM0) |
//! | Button A      | GP5, active low |
//! | Button B      | GP6, active low |
//! | Joystick Y    | GP26 / ADC0    |
//! | Joystick X    | GP27 / ADC1    |
//! | OLED SDA/SCL  | GP14 / GP15 (I2C1) |

#![cfg(target_os = "none")]

use embassy_futures::block_on;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::Input;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, PIO0};
use embassy_rp::pio_programs::ws2812::PioWs2812;
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;
use luminus_core::grid::LED_COUNT;
use luminus_core::hal::{Controls, LedStrip, TextDisplay};
use luminus_core::input::{AXIS_CENTER, AxisSample};
use smart_leds::RGB8;

use crate::display::Ssd1306;

pub const OLED_I2C_HZ: u32 = 400_000;
/// Conversions folded into the boot seed.
pub const NOISE_SAMPLES: usize = 16;

/// Stick deflection from centre needed before the cursor moves on this board.
pub const JOYSTICK_DEADZONE: u16 = 1000;

pub type Strip<'d> = PioWs2812<'d, PIO0, 0, LED_COUNT>;
pub type Oled<'d> = Ssd1306<I2c<'d, I2C1, i2c::Blocking>>;

/// Two-axis analog stick on the RP2040 ADC.
pub struct Joystick<'d> {
    adc: Adc<'d, adc::Blocking>,
    x: Channel<'d>,
    y: Channel<'d>,
}

impl<'d> Joystick<'d> {
    pub fn new(adc: Adc<'d, adc::Blocking>, x: Channel<'d>, y: Channel<'d>) -> Self {
        Self { adc, x, y }
    }

    /// A failed conversion reads as centred so the cursor simply stays put.
    pub fn read(&mut self) -> AxisSample {
        let y = read_or_center(&mut self.adc, &mut self.y);
        let x = read_or_center(&mut self.adc, &mut self.x);
        AxisSample::new(x, y)
    }

    pub fn noise(&mut self) -> [u16; NOISE_SAMPLES] {
        let mut samples = [0; NOISE_SAMPLES];
        for (index, sample) in samples.iter_mut().enumerate() {
            let channel = if index % 2 == 0 { &mut self.x } else { &mut self.y };
            *sample = read_or_center(&mut self.adc, channel);
        }
        samples
    }
}

fn read_or_center(adc: &mut Adc<'_, adc::Blocking>, channel: &mut Channel<'_>) -> u16 {
    match adc.blocking_read(channel) {
        Ok(raw) => raw,
        Err(err) => {
            defmt::warn!("joystick: adc read failed: {}", err);
            AXIS_CENTER
        }
    }
}

pub struct PicoBoard<'d> {
    strip: Strip<'d>,
    oled: Oled<'d>,
    joystick: Joystick<'d>,
    button_a: Input<'d>,
    button_b: Input<'d>,
    delay: Delay,
    pixels: [RGB8; LED_COUNT],
}

impl<'d> PicoBoard<'d> {
    pub fn new(
        strip: Strip<'d>,
        oled: Oled<'d>,
        joystick: Joystick<'d>,
        button_a: Input<'d>,
        button_b: Input<'d>,
    ) -> Self {
        Self {
            strip,
            oled,
            joystick,
            button_a,
            button_b,
            delay: Delay,
            pixels: [RGB8::default(); LED_COUNT],
        }
    }

    pub fn joystick_mut(&mut self) -> &mut Joystick<'d> {
        &mut self.joystick
    }
}

impl LedStrip for PicoBoard<'_> {
    fn write_frame(&mut self, pixels: &[RGB8]) {
        for (slot, pixel) in self.pixels.iter_mut().zip(pixels) {
            *slot = *pixel;
        }
        block_on(self.strip.write(&self.pixels));
    }
}

impl TextDisplay for PicoBoard<'_> {
    fn show_message(&mut self, line1: &str, line2: &str) {
        if let Err(err) = self.oled.show_lines(line1, line2) {
            defmt::warn!("oled: write failed: {}", err);
        }
    }
}

impl Controls for PicoBoard<'_> {
    fn read_axes(&mut self) -> AxisSample {
        self.joystick.read()
    }

    fn is_confirm_pressed(&mut self) -> bool {
        self.button_a.is_low()
    }

    fn is_alt_pressed(&mut self) -> bool {
        self.button_b.is_low()
    }
}

impl DelayNs for PicoBoard<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
