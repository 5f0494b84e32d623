//! Shows the revealed prefix of a sequence one cell at a time.
//!
//! Playback is a small state machine of its own: every call to
//! [`Playback::advance`] either lights the next cell or blanks the matrix, and
//! reports how long the caller must hold that frame. Cells are shown strictly in
//! sequence order and only one is ever lit.

use core::time::Duration;

use smart_leds::RGB8;

use crate::config::GameConfig;
use crate::frame::{Frame, Palette, dim};
use crate::grid::LinearIndex;
use crate::sequence::Sequence;

/// Colours and hold times used while playing a sequence back.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlaybackStyle {
    pub palette: Palette,
    pub dim_divisor: u8,
    pub on: Duration,
    pub off: Duration,
}

impl PlaybackStyle {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            palette: Palette::default(),
            dim_divisor: config.dim_divisor,
            on: config.timing.playback_on,
            off: config.timing.playback_off,
        }
    }

    /// Colour shown for sequence position `step`.
    pub fn color(&self, step: usize) -> RGB8 {
        dim(self.palette.color(step), self.dim_divisor)
    }
}

/// Result of one [`Playback::advance`] call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackStep {
    /// `index` is lit in the colour for `step`; flush and hold.
    Lit {
        step: usize,
        index: LinearIndex,
        hold: Duration,
    },
    /// The matrix was blanked after `step`; flush and hold.
    Dark { step: usize, hold: Duration },
    /// Every revealed cell has been shown.
    Done,
}

/// Progress through one playback of the revealed prefix.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Playback {
    revealed: usize,
    next: usize,
    lit: bool,
}

impl Playback {
    pub const fn new(revealed: usize) -> Self {
        Self {
            revealed,
            next: 0,
            lit: false,
        }
    }

    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    pub const fn is_done(&self) -> bool {
        !self.lit && self.next >= self.revealed
    }

    /// Moves playback forward by one frame, updating `frame` in place.
    pub fn advance(
        &mut self,
        frame: &mut Frame,
        sequence: &Sequence,
        style: &PlaybackStyle,
    ) -> PlaybackStep {
        if self.lit {
            self.lit = false;
            frame.clear();
            return PlaybackStep::Dark {
                step: self.next - 1,
                hold: style.off,
            };
        }

        let step = self.next;
        let Some(index) = sequence.prefix(self.revealed).get(step).copied() else {
            return PlaybackStep::Done;
        };

        frame.clear();
        frame.set_pixel(index, style.color(step));
        self.next += 1;
        self.lit = true;
        PlaybackStep::Lit {
            step,
            index,
            hold: style.on,
        }
    }
}
