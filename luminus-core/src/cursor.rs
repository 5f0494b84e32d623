//! Joystick-driven cursor over the matrix.
//!
//! Each tick moves the cursor at most one cell per axis. Movement is clamped
//! at the grid edges, so the cursor never leaves the matrix no matter what the
//! ADC reports.

use heapless::Deque;

use crate::config::MAX_TRAIL;
use crate::grid::{Cell, GRID_HEIGHT, GRID_WIDTH};
use crate::input::{AXIS_CENTER, AxisSample};

/// Minimum deflection from centre that counts as a push.
pub const DEADZONE: u16 = 500;

/// Joystick calibration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CursorConfig {
    pub center: u16,
    pub deadzone: u16,
    /// Move left when the X reading rises instead of right.
    pub invert_x: bool,
    /// Move up when the Y reading rises instead of down.
    pub invert_y: bool,
}

impl CursorConfig {
    pub const fn new() -> Self {
        Self {
            center: AXIS_CENTER,
            deadzone: DEADZONE,
            invert_x: false,
            invert_y: false,
        }
    }

    /// Replaces the minimum deflection that counts as a push.
    #[must_use]
    pub const fn with_deadzone(mut self, deadzone: u16) -> Self {
        self.deadzone = deadzone;
        self
    }

    #[must_use]
    pub const fn inverted(mut self, invert_x: bool, invert_y: bool) -> Self {
        self.invert_x = invert_x;
        self.invert_y = invert_y;
        self
    }

    /// Direction requested by one raw axis reading: -1, 0 or +1.
    pub fn direction(&self, raw: u16, inverted: bool) -> i8 {
        let deflection = i32::from(raw) - i32::from(self.center);
        let step = if deflection > i32::from(self.deadzone) {
            1
        } else if deflection < -i32::from(self.deadzone) {
            -1
        } else {
            0
        };
        if inverted { -step } else { step }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Player cursor plus its recent positions, most recent first.
#[derive(Clone, Debug)]
pub struct Cursor {
    config: CursorConfig,
    position: Cell,
    trail: Deque<Cell, MAX_TRAIL>,
}

impl Cursor {
    /// Cursor parked in the middle of the grid.
    pub fn new(config: CursorConfig) -> Self {
        Self::at(config, Cell::center())
    }

    /// Cursor starting at `start`, clamped onto the grid.
    pub fn at(config: CursorConfig, start: Cell) -> Self {
        let start = Cell::new(start.x.min(GRID_WIDTH - 1), start.y.min(GRID_HEIGHT - 1));
        let mut trail = Deque::new();
        let _ = trail.push_front(start);
        Self {
            config,
            position: start,
            trail,
        }
    }

    pub const fn position(&self) -> Cell {
        self.position
    }

    pub const fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Past positions, newest first. The head always equals [`Self::position`].
    /// Gameplay only ever reads the head.
    pub fn trail(&self) -> impl Iterator<Item = Cell> + '_ {
        self.trail.iter().copied()
    }

    /// Applies one joystick reading and records the result in the trail.
    pub fn tick(&mut self, axes: AxisSample) -> Cell {
        let dx = self.config.direction(axes.x, self.config.invert_x);
        let dy = self.config.direction(axes.y, self.config.invert_y);

        self.position = Cell::new(
            step_clamped(self.position.x, dx, GRID_WIDTH),
            step_clamped(self.position.y, dy, GRID_HEIGHT),
        );

        if self.trail.is_full() {
            self.trail.pop_back();
        }
        let _ = self.trail.push_front(self.position);

        self.position
    }
}

fn step_clamped(value: usize, direction: i8, limit: usize) -> usize {
    match direction {
        1 if value + 1 < limit => value + 1,
        -1 if value > 0 => value - 1,
        _ => value,
    }
}
