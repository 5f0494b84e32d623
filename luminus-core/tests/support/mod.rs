#![allow(dead_code)]

use std::cell::Cell as SharedCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use luminus_core::grid::{Cell, from_linear};
use luminus_core::hal::{Controls, LedStrip, TextDisplay};
use luminus_core::input::{AXIS_CENTER, AXIS_MAX, AxisSample, InputSnapshot};
use luminus_core::session::{Phase, Session};
use rand::RngCore;
use smart_leds::RGB8;

/// Board double that records everything the engine sends it and replays
/// whatever input was last queued through `next_input`.
pub struct RecordingBoard {
    pub frames: Vec<Vec<RGB8>>,
    pub messages: Vec<(String, String)>,
    pub delayed_ns: u64,
    pub next_input: Rc<SharedCell<InputSnapshot>>,
}

impl RecordingBoard {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            messages: Vec::new(),
            delayed_ns: 0,
            next_input: Rc::new(SharedCell::new(InputSnapshot::idle())),
        }
    }

    pub fn shown(&self, line1: &str) -> usize {
        self.messages
            .iter()
            .filter(|(first, _)| first == line1)
            .count()
    }
}

impl LedStrip for RecordingBoard {
    fn write_frame(&mut self, pixels: &[RGB8]) {
        self.frames.push(pixels.to_vec());
    }
}

impl TextDisplay for RecordingBoard {
    fn show_message(&mut self, line1: &str, line2: &str) {
        self.messages.push((line1.to_string(), line2.to_string()));
    }
}

impl Controls for RecordingBoard {
    fn read_axes(&mut self) -> AxisSample {
        self.next_input.get().axes
    }

    fn is_confirm_pressed(&mut self) -> bool {
        self.next_input.get().confirm
    }

    fn is_alt_pressed(&mut self) -> bool {
        self.next_input.get().alt
    }
}

impl DelayNs for RecordingBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
    }
}

/// Axis reading that moves one cell from `from` towards `to`.
pub fn toward(from: Cell, to: Cell) -> AxisSample {
    let axis = |current: usize, target: usize| {
        if target > current {
            AXIS_MAX
        } else if target < current {
            0
        } else {
            AXIS_CENTER
        }
    };
    AxisSample::new(axis(from.x, to.x), axis(from.y, to.y))
}

/// Target cell for the step the session is waiting on.
pub fn expected_cell<R: RngCore>(session: &Session<R>, step: usize) -> Cell {
    let index = session
        .sequence()
        .and_then(|sequence| sequence.get(step))
        .expect("session should have a sequence while awaiting input");
    from_linear(index).expect("sequence holds strip indices")
}

/// Input a player who remembers every cell would give.
pub fn perfect_input<R: RngCore>(session: &Session<R>) -> InputSnapshot {
    match session.phase() {
        Phase::AwaitStart => InputSnapshot::idle().with_confirm(),
        Phase::AwaitInput { step } => {
            let target = expected_cell(session, step);
            let position = session.cursor().position();
            if position == target {
                InputSnapshot::idle().with_confirm()
            } else {
                InputSnapshot::idle().with_axes(toward(position, target))
            }
        }
        _ => InputSnapshot::idle(),
    }
}

/// Input that confirms a wrong cell for the current step.
pub fn wrong_input<R: RngCore>(session: &Session<R>) -> InputSnapshot {
    let Phase::AwaitInput { step } = session.phase() else {
        return perfect_input(session);
    };
    let target = expected_cell(session, step);
    let position = session.cursor().position();
    if position != target {
        return InputSnapshot::idle().with_confirm();
    }
    let away = Cell::new(if position.x == 0 { 1 } else { 0 }, position.y);
    InputSnapshot::idle().with_axes(toward(position, away))
}

/// Steps with `input_for` until `done` holds, panicking if it never does.
pub fn drive_until<R, I, D>(session: &mut Session<R>, mut input_for: I, mut done: D)
where
    R: RngCore,
    I: FnMut(&Session<R>) -> InputSnapshot,
    D: FnMut(&Session<R>) -> bool,
{
    for _ in 0..20_000 {
        if done(session) {
            return;
        }
        let input = input_for(session);
        session.step(input);
    }
    panic!("session never reached the expected state; stuck in {:?}", session.phase());
}
