//! Terminal stand-in for the Pico board.
//!
//! The 5x5 strip is drawn as coloured blocks, the OLED as a two-line box
//! below it. Arrow keys stand in for the joystick and `A`/`B` for the
//! buttons. Key presses are latched until the engine samples them, so a
//! tap that lands during a hold is not lost.

use std::cell::Cell as SharedCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use embedded_hal::delay::DelayNs;
use luminus_core::grid::{GRID_HEIGHT, GRID_WIDTH, LED_COUNT, to_linear};
use luminus_core::hal::{Controls, LedStrip, TextDisplay};
use luminus_core::input::{AXIS_CENTER, AXIS_MAX, AxisSample, InputSnapshot};
use luminus_core::messages::{MAX_LINE_CHARS, truncate_line};
use smart_leds::RGB8;

/// The strip runs very dim; terminals need the colours brightened to show them.
const DISPLAY_GAIN: u8 = 10;
const OLED_ROW: u16 = GRID_HEIGHT as u16 + 2;
const HELP_ROW: u16 = OLED_ROW + 5;

#[derive(Copy, Clone, Debug, Default)]
struct LatchedInput {
    dx: i8,
    dy: i8,
    confirm: bool,
    alt: bool,
}

pub struct TerminalBoard<W: Write> {
    out: W,
    pixels: [RGB8; LED_COUNT],
    lines: (String, String),
    latched: LatchedInput,
    quit: Rc<SharedCell<bool>>,
    last_sample: Rc<SharedCell<InputSnapshot>>,
    error: Option<io::Error>,
}

impl<W: Write> TerminalBoard<W> {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn open(mut out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        let mut board = Self {
            out,
            pixels: [RGB8::default(); LED_COUNT],
            lines: (String::new(), String::new()),
            latched: LatchedInput::default(),
            quit: Rc::new(SharedCell::new(false)),
            last_sample: Rc::new(SharedCell::new(InputSnapshot::idle())),
            error: None,
        };
        board.render()?;
        Ok(board)
    }

    /// Flag raised once the player asks to leave (or the terminal failed).
    pub fn quit_flag(&self) -> Rc<SharedCell<bool>> {
        Rc::clone(&self.quit)
    }

    /// Snapshot the engine sampled most recently.
    pub fn last_sample(&self) -> Rc<SharedCell<InputSnapshot>> {
        Rc::clone(&self.last_sample)
    }

    /// Restores the terminal and reports the first I/O error seen while playing.
    pub fn close(mut self) -> io::Result<()> {
        let restore = execute!(self.out, ResetColor, Show, LeaveAlternateScreen)
            .and_then(|()| terminal::disable_raw_mode());
        match self.error.take() {
            Some(err) => Err(err),
            None => restore,
        }
    }

    fn fail(&mut self, err: io::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.quit.set(true);
    }

    fn redraw(&mut self) {
        if let Err(err) = self.render() {
            self.fail(err);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        queue!(self.out, MoveTo(0, 0), Print("Luminus Memory"))?;

        for y in 0..GRID_HEIGHT {
            queue!(self.out, MoveTo(2, y as u16 + 1))?;
            for x in 0..GRID_WIDTH {
                let pixel = to_linear(x, y)
                    .ok()
                    .and_then(|index| self.pixels.get(index).copied())
                    .unwrap_or_default();
                if pixel == RGB8::default() {
                    queue!(self.out, SetForegroundColor(Color::DarkGrey), Print(" ·"))?;
                } else {
                    queue!(self.out, SetForegroundColor(terminal_color(pixel)), Print("██"))?;
                }
            }
            queue!(self.out, ResetColor)?;
        }

        let border = "─".repeat(MAX_LINE_CHARS + 2);
        queue!(
            self.out,
            MoveTo(0, OLED_ROW),
            Print(format!("┌{border}┐")),
            MoveTo(0, OLED_ROW + 1),
            Print(format!("│ {:<width$} │", self.lines.0, width = MAX_LINE_CHARS)),
            MoveTo(0, OLED_ROW + 2),
            Print(format!("│ {:<width$} │", self.lines.1, width = MAX_LINE_CHARS)),
            MoveTo(0, OLED_ROW + 3),
            Print(format!("└{border}┘")),
            MoveTo(0, HELP_ROW),
            Print("arrows: move   A/Enter: confirm   B/Space: alt   Q/Esc: quit"),
        )?;
        self.out.flush()
    }

    /// Waits up to `timeout` for one key event and latches it.
    fn pump(&mut self, timeout: Duration) {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => self.handle_key(key),
                Ok(Event::Resize(..)) => self.redraw(),
                Ok(_) => {}
                Err(err) => self.fail(err),
            },
            Ok(false) => {}
            Err(err) => self.fail(err),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit.set(true);
            }
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => self.quit.set(true),
            KeyCode::Left => self.latched.dx = -1,
            KeyCode::Right => self.latched.dx = 1,
            KeyCode::Up => self.latched.dy = -1,
            KeyCode::Down => self.latched.dy = 1,
            KeyCode::Char('a' | 'A') | KeyCode::Enter => self.latched.confirm = true,
            KeyCode::Char('b' | 'B' | ' ') => self.latched.alt = true,
            _ => {}
        }
    }

    fn drain_pending(&mut self) {
        while !self.quit.get() {
            match event::poll(Duration::ZERO) {
                Ok(true) => self.pump(Duration::ZERO),
                Ok(false) => break,
                Err(err) => self.fail(err),
            }
        }
    }
}

impl<W: Write> LedStrip for TerminalBoard<W> {
    fn write_frame(&mut self, pixels: &[RGB8]) {
        for (slot, pixel) in self.pixels.iter_mut().zip(pixels) {
            *slot = *pixel;
        }
        self.redraw();
    }
}

impl<W: Write> TextDisplay for TerminalBoard<W> {
    fn show_message(&mut self, line1: &str, line2: &str) {
        self.lines = (truncate_line(line1).to_owned(), truncate_line(line2).to_owned());
        self.redraw();
    }
}

impl<W: Write> Controls for TerminalBoard<W> {
    fn read_axes(&mut self) -> AxisSample {
        self.drain_pending();
        let axes = AxisSample::new(deflect(self.latched.dx), deflect(self.latched.dy));
        self.latched.dx = 0;
        self.latched.dy = 0;
        axes
    }

    fn is_confirm_pressed(&mut self) -> bool {
        core::mem::take(&mut self.latched.confirm)
    }

    fn is_alt_pressed(&mut self) -> bool {
        core::mem::take(&mut self.latched.alt)
    }

    fn sample(&mut self) -> InputSnapshot {
        let input = InputSnapshot {
            axes: self.read_axes(),
            confirm: self.is_confirm_pressed(),
            alt: self.is_alt_pressed(),
        };
        self.last_sample.set(input);
        input
    }
}

impl<W: Write> DelayNs for TerminalBoard<W> {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(u64::from(ns));
        while !self.quit.get() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.pump(remaining);
        }
    }
}

fn deflect(direction: i8) -> u16 {
    match direction {
        d if d < 0 => 0,
        0 => AXIS_CENTER,
        _ => AXIS_MAX,
    }
}

fn terminal_color(pixel: RGB8) -> Color {
    Color::Rgb {
        r: pixel.r.saturating_mul(DISPLAY_GAIN),
        g: pixel.g.saturating_mul(DISPLAY_GAIN),
        b: pixel.b.saturating_mul(DISPLAY_GAIN),
    }
}
