//! Game constants and the tunables grouped into [`GameConfig`].
//!
//! Defaults reproduce the timing of the original handheld; the host emulator
//! uses [`GameTiming::scaled`] to speed play up without touching game rules.

use core::time::Duration;

use crate::cursor::CursorConfig;
use crate::messages::{self, Message};

/// Length of a full sequence and the number of rounds needed to win.
pub const MAX_ROUNDS: usize = 10;

/// Positions kept in the cursor history.
pub const MAX_TRAIL: usize = 16;

/// Integer divisor applied to palette colours before they reach the strip.
pub const DEFAULT_DIM_DIVISOR: u8 = 10;

/// Score that ends the session with a win.
pub const WIN_SCORE: u32 = 10;

/// Encouragement shown the first time the score reaches `threshold`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Milestone {
    pub threshold: u32,
    pub message: Message,
}

impl Milestone {
    pub const fn new(threshold: u32, message: Message) -> Self {
        Self { threshold, message }
    }

    /// Returns `true` when moving from `previous` to `current` crosses the threshold.
    pub const fn crossed(&self, previous: u32, current: u32) -> bool {
        previous < self.threshold && self.threshold <= current
    }
}

/// Milestones in ascending threshold order.
pub const MILESTONES: [Milestone; 3] = [
    Milestone::new(3, messages::KEEP_IT_UP),
    Milestone::new(5, messages::IMPRESSIVE),
    Milestone::new(7, messages::ALMOST_THERE),
];

/// Every fixed wait the game performs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GameTiming {
    pub welcome: Duration,
    pub tutorial: [Duration; messages::TUTORIAL_PAGES],
    pub playback_on: Duration,
    pub playback_off: Duration,
    pub input_poll: Duration,
    pub debounce: Duration,
    pub result_pause: Duration,
    pub milestone: Duration,
    pub win: Duration,
    pub choice_poll: Duration,
}

impl GameTiming {
    /// Timing used on hardware.
    pub const fn standard() -> Self {
        Self {
            welcome: Duration::from_millis(4000),
            tutorial: [
                Duration::from_millis(4000),
                Duration::from_millis(4000),
                Duration::from_millis(3000),
            ],
            playback_on: Duration::from_millis(500),
            playback_off: Duration::from_millis(200),
            input_poll: Duration::from_millis(100),
            debounce: Duration::from_millis(200),
            result_pause: Duration::from_millis(2000),
            milestone: Duration::from_millis(2000),
            win: Duration::from_millis(2000),
            choice_poll: Duration::from_millis(100),
        }
    }

    /// Multiplies every wait by `numerator / denominator`.
    #[must_use]
    pub fn scaled(self, numerator: u32, denominator: u32) -> Self {
        let denominator = denominator.max(1);
        let scale = |value: Duration| value * numerator / denominator;
        Self {
            welcome: scale(self.welcome),
            tutorial: self.tutorial.map(scale),
            playback_on: scale(self.playback_on),
            playback_off: scale(self.playback_off),
            input_poll: scale(self.input_poll),
            debounce: scale(self.debounce),
            result_pause: scale(self.result_pause),
            milestone: scale(self.milestone),
            win: scale(self.win),
            choice_poll: scale(self.choice_poll),
        }
    }
}

impl Default for GameTiming {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration handed to a [`Session`](crate::session::Session).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GameConfig {
    pub timing: GameTiming,
    pub cursor: CursorConfig,
    pub dim_divisor: u8,
    pub win_score: u32,
    pub milestones: &'static [Milestone],
}

impl GameConfig {
    pub const fn new() -> Self {
        Self {
            timing: GameTiming::standard(),
            cursor: CursorConfig::new(),
            dim_divisor: DEFAULT_DIM_DIVISOR,
            win_score: WIN_SCORE,
            milestones: &MILESTONES,
        }
    }

    /// Replaces the timing table.
    #[must_use]
    pub const fn with_timing(mut self, timing: GameTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Replaces the joystick calibration.
    #[must_use]
    pub const fn with_cursor(mut self, cursor: CursorConfig) -> Self {
        self.cursor = cursor;
        self
    }

    /// Latest milestone crossed by a score change, if any.
    pub fn milestone_crossed(&self, previous: u32, current: u32) -> Option<&Milestone> {
        self.milestones
            .iter()
            .rev()
            .find(|milestone| milestone.crossed(previous, current))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_fire_on_crossing_not_equality() {
        let config = GameConfig::new();

        assert_eq!(config.milestone_crossed(2, 3).map(|m| m.threshold), Some(3));
        assert_eq!(config.milestone_crossed(3, 4), None);
        assert_eq!(config.milestone_crossed(4, 6).map(|m| m.threshold), Some(5));
        assert_eq!(config.milestone_crossed(2, 8).map(|m| m.threshold), Some(7));
    }

    #[test]
    fn scaling_keeps_ratios() {
        let fast = GameTiming::standard().scaled(1, 4);
        assert_eq!(fast.playback_on, Duration::from_millis(125));
        assert_eq!(fast.tutorial[2], Duration::from_millis(750));
    }
}
