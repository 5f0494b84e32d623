//! Plays a seeded session with a scripted player and prints the transcript.
//!
//! The player remembers every cell. `--miss <round>` makes it confirm one
//! wrong cell during that round so the loss path shows up as well. Holds are
//! not slept; timestamps come from the game clock.

use std::cell::Cell as SharedCell;
use std::env;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use luminus_core::config::GameConfig;
use luminus_core::grid::{Cell, from_linear};
use luminus_core::hal::{Controls, LedStrip, TextDisplay};
use luminus_core::input::{AXIS_CENTER, AXIS_MAX, AxisSample, InputSnapshot};
use luminus_core::session::{Phase, Session, run_with};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use smart_leds::RGB8;

#[allow(dead_code)]
#[path = "../transcript.rs"]
mod transcript;

use transcript::TranscriptLogger;

const DEFAULT_SEED: u64 = 2024;
const USAGE: &str = "Usage: autoplay [--seed <u64>] [--miss <round>] [--transcript <path>]";

struct Options {
    seed: u64,
    miss_round: Option<usize>,
    transcript: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let header = format!("Luminus Memory autoplay transcript (seed {})", options.seed);
    let writer: Box<dyn Write> = match &options.transcript {
        Some(path) => Box::new(transcript::open_file(path)?),
        None => Box::new(io::stdout()),
    };
    let mut log = TranscriptLogger::with_writer(writer, &header)?;

    let mut session = Session::new(GameConfig::default(), SmallRng::seed_from_u64(options.seed));
    let mut board = HeadlessBoard::default();
    let next = Rc::clone(&board.next_input);
    let mut player = Player::new(options.miss_round);
    let mut forwarded = session.events().next_id();
    let mut failure = None;

    let _ = run_with(&mut session, &mut board, |session, step| {
        let at = session.clock();
        let logged = step
            .messages()
            .try_for_each(|message| log.log_message(at, &message))
            .and_then(|()| {
                session
                    .events()
                    .since(forwarded)
                    .try_for_each(|record| log.log_event(at, record))
            });
        forwarded = session.events().next_id();

        let input = player.next_input(session);
        match logged.and_then(|()| log.log_input(at, &input)) {
            Ok(()) => {
                next.set(input);
                ControlFlow::Continue(())
            }
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }

    println!(
        "# score={} frames={} game-clock={}ms finished={}",
        session.score(),
        board.frames,
        session.clock().as_millis(),
        session.phase() == Phase::Finished
    );
    Ok(())
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        seed: DEFAULT_SEED,
        miss_round: None,
        transcript: None,
    };
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("Expected value after --seed")?;
                options.seed = value
                    .parse()
                    .map_err(|_| format!("Invalid seed `{value}`"))?;
            }
            "--miss" => {
                let value = args.next().ok_or("Expected value after --miss")?;
                options.miss_round = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid round `{value}`"))?,
                );
            }
            "--transcript" => {
                let value = args.next().ok_or("Expected value after --transcript")?;
                options.transcript = Some(PathBuf::from(value));
            }
            other => return Err(format!("Unknown argument `{other}`")),
        }
    }

    Ok(options)
}

/// Board with no outputs; input comes from whatever the player queued last.
#[derive(Default)]
struct HeadlessBoard {
    next_input: Rc<SharedCell<InputSnapshot>>,
    frames: usize,
}

impl LedStrip for HeadlessBoard {
    fn write_frame(&mut self, _pixels: &[RGB8]) {
        self.frames += 1;
    }
}

impl TextDisplay for HeadlessBoard {
    fn show_message(&mut self, _line1: &str, _line2: &str) {}
}

impl Controls for HeadlessBoard {
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

impl DelayNs for HeadlessBoard {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct Player {
    miss_round: Option<usize>,
}

impl Player {
    fn new(miss_round: Option<usize>) -> Self {
        Self { miss_round }
    }

    fn next_input<R: RngCore>(&mut self, session: &Session<R>) -> InputSnapshot {
        match session.phase() {
            Phase::AwaitStart | Phase::WinChoice => InputSnapshot::idle().with_confirm(),
            Phase::AwaitInput { step } => {
                let Some(target) = session
                    .sequence()
                    .and_then(|sequence| sequence.get(step))
                    .and_then(|index| from_linear(index).ok())
                else {
                    return InputSnapshot::idle();
                };
                let position = session.cursor().position();

                if self.miss_round == Some(session.progress().revealed) {
                    if position != target {
                        self.miss_round = None;
                        return InputSnapshot::idle().with_confirm();
                    }
                    let away = Cell::new(if position.x == 0 { 1 } else { 0 }, position.y);
                    return InputSnapshot::idle().with_axes(toward(position, away));
                }

                if position == target {
                    InputSnapshot::idle().with_confirm()
                } else {
                    InputSnapshot::idle().with_axes(toward(position, target))
                }
            }
            _ => InputSnapshot::idle(),
        }
    }
}

fn toward(from: Cell, to: Cell) -> AxisSample {
    let axis = |current: usize, target: usize| match target.cmp(&current) {
        std::cmp::Ordering::Greater => AXIS_MAX,
        std::cmp::Ordering::Less => 0,
        std::cmp::Ordering::Equal => AXIS_CENTER,
    };
    AxisSample::new(axis(from.x, to.x), axis(from.y, to.y))
}
