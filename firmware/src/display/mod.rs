//! SSD1306 128x64 OLED over I2C.
//!
//! Text is rasterised with `embedded-graphics` into [`OledFrame`], a page-
//! ordered 1-bit buffer matching the controller's GDDRAM layout, and the
//! whole buffer is pushed after every message.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::convert::Infallible;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Point, Size};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::{Drawable, Pixel};
use embedded_hal::i2c::I2c;
use luminus_core::messages::truncate_line;

pub const OLED_WIDTH: usize = 128;
pub const OLED_HEIGHT: usize = 64;
pub const OLED_PAGES: usize = OLED_HEIGHT / 8;
pub const OLED_ADDRESS: u8 = 0x3C;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// Top-left of the first and second text line.
const LINE_ORIGINS: [Point; 2] = [Point::new(5, 10), Point::new(5, 20)];

/// Power-on configuration for a 128x64 panel with the internal charge pump.
const INIT_SEQUENCE: &[&[u8]] = &[
    &[0xAE],       // display off
    &[0x20, 0x00], // horizontal addressing
    &[0x40],       // start line 0
    &[0xA1],       // segment remap
    &[0xA8, 0x3F], // multiplex 64
    &[0xC8],       // COM scan descending
    &[0xD3, 0x00], // no vertical offset
    &[0xDA, 0x12], // alternative COM pins
    &[0xD5, 0x80], // clock divide
    &[0xD9, 0xF1], // pre-charge
    &[0xDB, 0x30], // VCOMH deselect
    &[0x81, 0xFF], // contrast
    &[0xA4],       // follow RAM
    &[0xA6],       // not inverted
    &[0x8D, 0x14], // charge pump on
    &[0xAF],       // display on
];

/// 1-bit frame buffer, one byte per 8 vertical pixels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OledFrame {
    bytes: [u8; OLED_WIDTH * OLED_PAGES],
}

impl OledFrame {
    pub const fn new() -> Self {
        Self {
            bytes: [0; OLED_WIDTH * OLED_PAGES],
        }
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        if x >= OLED_WIDTH || y >= OLED_HEIGHT {
            return false;
        }
        self.bytes[x + (y / 8) * OLED_WIDTH] & (1 << (y % 8)) != 0
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x >= OLED_WIDTH || y >= OLED_HEIGHT {
            return;
        }
        let byte = &mut self.bytes[x + (y / 8) * OLED_WIDTH];
        let mask = 1 << (y % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Clears the frame and draws both lines, cut to the display width.
    pub fn render_lines(&mut self, line1: &str, line2: &str) {
        self.clear();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        for (line, origin) in [line1, line2].into_iter().zip(LINE_ORIGINS) {
            let _ = Text::with_baseline(truncate_line(line), origin, style, Baseline::Top).draw(self);
        }
    }

    /// Rows of GDDRAM in transmission order.
    pub fn pages(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.bytes.chunks_exact(OLED_WIDTH)
    }
}

impl Default for OledFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for OledFrame {
    fn size(&self) -> Size {
        Size::new(OLED_WIDTH as u32, OLED_HEIGHT as u32)
    }
}

impl DrawTarget for OledFrame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

/// SSD1306 controller behind any blocking `embedded-hal` I2C bus.
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    frame: OledFrame,
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: OLED_ADDRESS,
            frame: OledFrame::new(),
        }
    }

    /// Configures the panel and blanks it.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        for command in INIT_SEQUENCE {
            self.command(command)?;
        }
        self.frame.clear();
        self.flush()
    }

    pub fn show_lines(&mut self, line1: &str, line2: &str) -> Result<(), I2C::Error> {
        self.frame.render_lines(line1, line2);
        self.flush()
    }

    pub fn frame(&self) -> &OledFrame {
        &self.frame
    }

    fn flush(&mut self) -> Result<(), I2C::Error> {
        self.command(&[0x21, 0, (OLED_WIDTH - 1) as u8])?;
        self.command(&[0x22, 0, (OLED_PAGES - 1) as u8])?;

        let mut packet = [0_u8; OLED_WIDTH + 1];
        packet[0] = CONTROL_DATA;
        for page in self.frame.pages() {
            packet[1..].copy_from_slice(page);
            self.i2c.write(self.address, &packet)?;
        }
        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        let mut packet = [CONTROL_COMMAND; 4];
        let len = bytes.len().min(packet.len() - 1);
        packet[1..=len].copy_from_slice(&bytes[..len]);
        self.i2c.write(self.address, &packet[..=len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for RecordingBus {
        type Error = Infallible;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                if let Operation::Write(bytes) = operation {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    fn lit_pixels(frame: &OledFrame) -> usize {
        frame.pages().map(|page| page.iter().map(|b| b.count_ones() as usize).sum::<usize>()).sum()
    }

    #[test]
    fn pixels_map_to_page_bits() {
        let mut frame = OledFrame::new();
        frame.set(3, 9, true);
        assert!(frame.is_set(3, 9));
        assert_eq!(frame.pages().nth(1).map(|page| page[3]), Some(0b10));

        frame.set(OLED_WIDTH, 0, true);
        assert_eq!(lit_pixels(&frame), 1);
    }

    #[test]
    fn text_stays_inside_the_two_line_band() {
        let mut frame = OledFrame::new();
        frame.render_lines("Welcome to", "Luminus Memory");

        assert!(lit_pixels(&frame) > 0);
        for y in 0..OLED_HEIGHT {
            for x in 0..OLED_WIDTH {
                if frame.is_set(x, y) {
                    assert!((10..30).contains(&y), "pixel at ({x}, {y})");
                    assert!(x >= 5, "pixel at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn rendering_replaces_previous_text() {
        let mut frame = OledFrame::new();
        frame.render_lines("You lost!", "Try again");
        let lost = frame.clone();
        frame.render_lines("", "");
        assert_eq!(lit_pixels(&frame), 0);
        frame.render_lines("You lost!", "Try again");
        assert_eq!(frame, lost);
    }

    #[test]
    fn init_configures_then_blanks_every_page() {
        let mut oled = Ssd1306::new(RecordingBus::default());
        oled.init().expect("infallible");

        let writes = &oled.i2c.writes;
        assert!(writes.iter().all(|(address, _)| *address == OLED_ADDRESS));
        assert_eq!(writes[0].1, vec![CONTROL_COMMAND, 0xAE]);
        assert_eq!(writes[INIT_SEQUENCE.len() - 1].1, vec![CONTROL_COMMAND, 0xAF]);

        let data: Vec<_> = writes.iter().filter(|(_, bytes)| bytes[0] == CONTROL_DATA).collect();
        assert_eq!(data.len(), OLED_PAGES);
        assert!(data.iter().all(|(_, bytes)| bytes.len() == OLED_WIDTH + 1));
        assert!(data.iter().all(|(_, bytes)| bytes[1..].iter().all(|b| *b == 0)));
    }

    #[test]
    fn show_lines_pushes_the_rendered_frame() {
        let mut oled = Ssd1306::new(RecordingBus::default());
        oled.show_lines("Press A to", "start the game").expect("infallible");

        let sent: Vec<u8> = oled
            .i2c
            .writes
            .iter()
            .filter(|(_, bytes)| bytes[0] == CONTROL_DATA)
            .flat_map(|(_, bytes)| bytes[1..].iter().copied())
            .collect();
        let expected: Vec<u8> = oled.frame().pages().flatten().copied().collect();
        assert_eq!(sent, expected);
    }
}
