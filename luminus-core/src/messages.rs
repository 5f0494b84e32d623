//! Two-line texts shown on the status display.

use core::fmt;

/// Characters that fit on one display line.
pub const MAX_LINE_CHARS: usize = 15;

/// Number of tutorial pages shown before the first round.
pub const TUTORIAL_PAGES: usize = 3;

/// A full display update: two lines, each at most [`MAX_LINE_CHARS`] wide.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub line1: &'static str,
    pub line2: &'static str,
}

impl Message {
    pub const fn new(line1: &'static str, line2: &'static str) -> Self {
        Self { line1, line2 }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.line1, self.line2)
    }
}

pub const WELCOME: Message = Message::new("Welcome to", "Luminus Memory");
pub const PRESS_TO_START: Message = Message::new("Press A to", "start the game");
pub const TUTORIAL: [Message; TUTORIAL_PAGES] = [
    Message::new("MOVE JOYSTICK", "TO NAVIGATE"),
    Message::new("PRESS A TO", "PICK THE LED"),
    Message::new("GET READY", "GO!"),
];
pub const LOST: Message = Message::new("You lost!", "Try again");
pub const KEEP_IT_UP: Message = Message::new("WOW KEEP", "IT UP!");
pub const IMPRESSIVE: Message = Message::new("YOU ARE", "IMPRESSIVE!");
pub const ALMOST_THERE: Message = Message::new("YOU ARE", "ALMOST THERE!!!");
pub const WON: Message = Message::new("You won!", "Congrats!");
pub const CHOICE: Message = Message::new("A - FINISH", "B - CONTINUE");

/// Cuts `line` down to what the display can show, respecting char boundaries.
pub fn truncate_line(line: &str) -> &str {
    match line.char_indices().nth(MAX_LINE_CHARS) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}
