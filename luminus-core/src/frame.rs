//! In-memory copy of the matrix and the playback palette.

use embedded_hal::delay::DelayNs;
use smart_leds::RGB8;

use crate::config::MAX_ROUNDS;
use crate::grid::{LED_COUNT, LinearIndex};
use crate::hal::LedStrip;

/// Minimum gap after a frame before the strip accepts the next one.
pub const STRIP_SETTLE_US: u32 = 100;

pub const BLACK: RGB8 = RGB8::new(0, 0, 0);

/// Colour of the player's cursor. Already at display brightness.
pub const CURSOR_COLOR: RGB8 = RGB8::new(2, 2, 2);

/// Pixel buffer covering the whole strip, in strip order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pixels: [RGB8; LED_COUNT],
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            pixels: [BLACK; LED_COUNT],
        }
    }

    /// Sets one pixel. Writes past the end of the strip are dropped and
    /// reported as `false`.
    pub fn set_pixel(&mut self, index: LinearIndex, color: RGB8) -> bool {
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }

    pub fn pixel(&self, index: LinearIndex) -> Option<RGB8> {
        self.pixels.get(index).copied()
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.pixels.fill(BLACK);
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// Indices of every pixel that is not black.
    pub fn lit(&self) -> impl Iterator<Item = LinearIndex> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, pixel)| **pixel != BLACK)
            .map(|(index, _)| index)
    }

    /// Sends the whole frame to the strip, then waits out the settle time.
    pub fn flush<T>(&self, target: &mut T)
    where
        T: LedStrip + DelayNs + ?Sized,
    {
        target.write_frame(&self.pixels);
        target.delay_us(STRIP_SETTLE_US);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// One colour per sequence position, so repeated cells still look different.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    colors: [RGB8; MAX_ROUNDS],
}

impl Palette {
    pub const fn new(colors: [RGB8; MAX_ROUNDS]) -> Self {
        Self { colors }
    }

    /// Colour for sequence position `step`.
    pub fn color(&self, step: usize) -> RGB8 {
        self.colors[step % MAX_ROUNDS]
    }
}

impl Default for Palette {
    fn default() -> Self {
        DEFAULT_PALETTE
    }
}

pub const DEFAULT_PALETTE: Palette = Palette::new([
    RGB8::new(163, 85, 85),
    RGB8::new(75, 209, 144),
    RGB8::new(108, 109, 168),
    RGB8::new(194, 186, 97),
    RGB8::new(163, 85, 136),
    RGB8::new(149, 210, 245),
    RGB8::new(150, 98, 179),
    RGB8::new(222, 165, 104),
    RGB8::new(128, 128, 128),
    RGB8::new(82, 156, 87),
]);

/// Divides each channel by `divisor`. A divisor of zero leaves the colour alone.
pub const fn dim(color: RGB8, divisor: u8) -> RGB8 {
    if divisor == 0 {
        return color;
    }
    RGB8::new(color.r / divisor, color.g / divisor, color.b / divisor)
}
