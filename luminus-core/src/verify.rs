//! Checks the player's confirmations against the expected sequence.

use crate::frame::{CURSOR_COLOR, Frame};
use crate::grid::{Cell, LinearIndex};

/// Outcome of one input poll while waiting for a sequence step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// Nothing confirmed yet; the cursor was drawn into the frame.
    Pending,
    /// The confirmed cell matches the expected step.
    Correct,
    /// The confirmed cell is wrong. The round is over.
    Incorrect,
}

impl Verdict {
    pub const fn is_final(self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

/// Evaluates one poll for the step whose target is `expected`.
///
/// The frame is always replaced by the cursor alone, so a press is judged
/// against the cell the caller is about to show. With a press the cursor cell
/// is mapped onto the strip and compared. The caller flushes the frame and
/// applies the debounce hold.
pub fn verify_step(
    frame: &mut Frame,
    cursor: Cell,
    confirm_pressed: bool,
    expected: LinearIndex,
) -> Verdict {
    frame.clear();
    let drawn = cursor.to_linear().ok();
    if let Some(index) = drawn {
        frame.set_pixel(index, CURSOR_COLOR);
    }

    if !confirm_pressed {
        return Verdict::Pending;
    }

    match drawn {
        Some(index) if index == expected => Verdict::Correct,
        _ => Verdict::Incorrect,
    }
}
