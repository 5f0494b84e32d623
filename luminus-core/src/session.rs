//! Round and session state machine.
//!
//! A [`Session`] owns every piece of mutable game state: the frame, cursor,
//! sequence, progress and score. [`Session::step`] performs exactly one
//! transition for a freshly sampled [`InputSnapshot`] and returns the side
//! effects the driver has to carry out, in order. The session itself never
//! touches hardware and never sleeps, which keeps the whole game testable on the
//! host. [`run`] is the blocking single-threaded driver used with a [`Board`].

use core::ops::ControlFlow;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use rand::RngCore;

use crate::config::{GameConfig, MAX_ROUNDS};
use crate::cursor::Cursor;
use crate::frame::Frame;
use crate::hal::{Board, LedStrip, TextDisplay};
use crate::input::InputSnapshot;
use crate::messages::{self, Message};
use crate::playback::{Playback, PlaybackStep, PlaybackStyle};
use crate::sequence::Sequence;
use crate::telemetry::{EventLog, GameEvent};
use crate::verify::{Verdict, verify_step};

/// Most effects a single transition produces.
pub const MAX_EFFECTS: usize = 4;

/// Side effect requested by a transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Put a message on the status display.
    Show(Message),
    /// Send the session frame to the strip.
    Flush,
    /// Block for the given time.
    Hold(Duration),
}

/// How a round ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoundOutcome {
    /// Every revealed step was confirmed. `previous` is the score before the round.
    Won { previous: u32 },
    Lost,
}

/// Where the session currently is.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Welcome,
    AwaitStart,
    Tutorial { page: usize },
    RoundStart,
    Playback(Playback),
    AwaitInput { step: usize },
    RoundResult(RoundOutcome),
    WinChoice,
    Finished,
}

impl Phase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished)
    }
}

/// Revealed prefix length and verification progress within it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RoundProgress {
    pub revealed: usize,
    pub verified: usize,
}

impl RoundProgress {
    pub const fn new() -> Self {
        Self {
            revealed: 1,
            verified: 0,
        }
    }
}

impl Default for RoundProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Count of fully correct rounds in the current session.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScoreBoard {
    correct_rounds: u32,
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { correct_rounds: 0 }
    }

    pub const fn correct_rounds(&self) -> u32 {
        self.correct_rounds
    }

    /// Adds a won round and returns the score it replaced.
    pub fn record_round(&mut self) -> u32 {
        let previous = self.correct_rounds;
        self.correct_rounds = self.correct_rounds.saturating_add(1);
        previous
    }

    pub fn reset(&mut self) {
        self.correct_rounds = 0;
    }
}

/// One transition: the phase entered and the effects to apply, in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    phase: Phase,
    effects: Vec<Effect, MAX_EFFECTS>,
}

impl Step {
    fn new() -> Self {
        Self {
            phase: Phase::Welcome,
            effects: Vec::new(),
        }
    }

    /// Phase the session moved into.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Messages shown by this step.
    pub fn messages(&self) -> impl Iterator<Item = Message> + '_ {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Show(message) => Some(*message),
            _ => None,
        })
    }

    /// Sum of every hold in this step.
    pub fn hold_total(&self) -> Duration {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Hold(duration) => Some(*duration),
                _ => None,
            })
            .sum()
    }

    pub fn flushes(&self) -> bool {
        self.effects.contains(&Effect::Flush)
    }

    fn push(&mut self, effect: Effect) {
        let pushed = self.effects.push(effect);
        debug_assert!(pushed.is_ok(), "transition produced too many effects");
    }

    fn show(&mut self, message: Message) {
        self.push(Effect::Show(message));
    }

    fn flush(&mut self) {
        self.push(Effect::Flush);
    }

    fn hold(&mut self, duration: Duration) {
        self.push(Effect::Hold(duration));
    }
}

/// All state for one game session, from power-on until the player finishes.
pub struct Session<R> {
    config: GameConfig,
    style: PlaybackStyle,
    rng: R,
    phase: Phase,
    frame: Frame,
    cursor: Cursor,
    sequence: Option<Sequence>,
    needs_sequence: bool,
    progress: RoundProgress,
    score: ScoreBoard,
    clock: Duration,
    events: EventLog,
}

impl<R: RngCore> Session<R> {
    /// Starts a session at the welcome screen. `rng` feeds sequence generation.
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            style: PlaybackStyle::from_config(&config),
            cursor: Cursor::new(config.cursor),
            config,
            rng,
            phase: Phase::Welcome,
            frame: Frame::new(),
            sequence: None,
            needs_sequence: true,
            progress: RoundProgress::new(),
            score: ScoreBoard::new(),
            clock: Duration::ZERO,
            events: EventLog::new(),
        }
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Current target sequence, once the first round has started.
    pub const fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub const fn progress(&self) -> RoundProgress {
        self.progress
    }

    pub const fn score(&self) -> u32 {
        self.score.correct_rounds()
    }

    /// Total of every hold requested so far.
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Performs one transition using `input`, which must be sampled fresh.
    pub fn step(&mut self, input: InputSnapshot) -> Step {
        let mut step = Step::new();
        let phase = self.phase;
        self.phase = match phase {
            Phase::Welcome => self.welcome(&mut step),
            Phase::AwaitStart => self.await_start(input, &mut step),
            Phase::Tutorial { page } => self.tutorial(page, &mut step),
            Phase::RoundStart => self.round_start(),
            Phase::Playback(playback) => self.playback(playback, &mut step),
            Phase::AwaitInput { step: index } => self.await_input(index, input, &mut step),
            Phase::RoundResult(RoundOutcome::Lost) => self.round_lost(&mut step),
            Phase::RoundResult(RoundOutcome::Won { previous }) => {
                self.round_won(previous, &mut step)
            }
            Phase::WinChoice => self.win_choice(input, &mut step),
            Phase::Finished => Phase::Finished,
        };
        step.phase = self.phase;
        self.clock += step.hold_total();
        step
    }

    fn record(&mut self, event: GameEvent) {
        self.events.record(event, self.clock);
    }

    fn welcome(&mut self, step: &mut Step) -> Phase {
        step.show(messages::WELCOME);
        step.hold(self.config.timing.welcome);
        step.show(messages::PRESS_TO_START);
        Phase::AwaitStart
    }

    fn await_start(&mut self, input: InputSnapshot, step: &mut Step) -> Phase {
        if input.confirm {
            self.record(GameEvent::TutorialStarted);
            Phase::Tutorial { page: 0 }
        } else {
            step.hold(self.config.timing.input_poll);
            Phase::AwaitStart
        }
    }

    fn tutorial(&mut self, page: usize, step: &mut Step) -> Phase {
        let (Some(message), Some(dwell)) = (
            messages::TUTORIAL.get(page),
            self.config.timing.tutorial.get(page),
        ) else {
            return Phase::RoundStart;
        };

        step.show(*message);
        step.hold(*dwell);
        if page + 1 < messages::TUTORIAL_PAGES {
            Phase::Tutorial { page: page + 1 }
        } else {
            Phase::RoundStart
        }
    }

    fn round_start(&mut self) -> Phase {
        if self.needs_sequence || self.sequence.is_none() || self.progress.revealed > MAX_ROUNDS {
            self.sequence = Some(Sequence::generate(&mut self.rng));
            self.needs_sequence = false;
            self.progress.revealed = 1;
            self.record(GameEvent::SequenceGenerated);
        }

        self.progress.verified = 0;
        self.record(GameEvent::RoundStarted {
            revealed: self.progress.revealed,
        });
        Phase::Playback(Playback::new(self.progress.revealed))
    }

    fn playback(&mut self, mut playback: Playback, step: &mut Step) -> Phase {
        let Some(sequence) = self.sequence else {
            return Phase::RoundStart;
        };

        match playback.advance(&mut self.frame, &sequence, &self.style) {
            PlaybackStep::Lit {
                step: index,
                index: cell,
                hold,
            } => {
                self.record(GameEvent::CellRevealed { step: index, index: cell });
                step.flush();
                step.hold(hold);
                Phase::Playback(playback)
            }
            PlaybackStep::Dark { hold, .. } => {
                step.flush();
                step.hold(hold);
                if playback.is_done() {
                    Phase::AwaitInput { step: 0 }
                } else {
                    Phase::Playback(playback)
                }
            }
            PlaybackStep::Done => Phase::AwaitInput { step: 0 },
        }
    }

    fn await_input(&mut self, index: usize, input: InputSnapshot, step: &mut Step) -> Phase {
        let Some(expected) = self.sequence.and_then(|sequence| sequence.get(index)) else {
            return Phase::RoundStart;
        };

        let position = self.cursor.tick(input.axes);
        match verify_step(&mut self.frame, position, input.confirm, expected) {
            Verdict::Pending => {
                step.flush();
                step.hold(self.config.timing.input_poll);
                Phase::AwaitInput { step: index }
            }
            Verdict::Correct => {
                step.flush();
                step.hold(self.config.timing.debounce);
                step.hold(self.config.timing.input_poll);
                self.record(GameEvent::StepAccepted {
                    step: index,
                    index: expected,
                });
                self.progress.verified = index + 1;

                if self.progress.verified >= self.progress.revealed {
                    let previous = self.score.record_round();
                    self.record(GameEvent::RoundWon {
                        score: self.score.correct_rounds(),
                    });
                    Phase::RoundResult(RoundOutcome::Won { previous })
                } else {
                    Phase::AwaitInput { step: index + 1 }
                }
            }
            Verdict::Incorrect => {
                step.flush();
                step.hold(self.config.timing.debounce);
                self.record(GameEvent::StepRejected {
                    step: index,
                    expected,
                    actual: position.to_linear().ok(),
                });
                self.record(GameEvent::RoundLost {
                    score: self.score.correct_rounds(),
                });
                Phase::RoundResult(RoundOutcome::Lost)
            }
        }
    }

    fn round_lost(&mut self, step: &mut Step) -> Phase {
        step.show(messages::LOST);
        self.frame.clear();
        step.flush();
        step.hold(self.config.timing.result_pause);

        // Score survives a loss; only the post-win "continue" clears it.
        self.needs_sequence = true;
        self.progress = RoundProgress::new();
        Phase::RoundStart
    }

    fn round_won(&mut self, previous: u32, step: &mut Step) -> Phase {
        let current = self.score.correct_rounds();

        if current >= self.config.win_score {
            self.record(GameEvent::SessionWon { score: current });
            step.show(messages::WON);
            step.hold(self.config.timing.win);
            step.show(messages::CHOICE);
            self.frame.clear();
            step.flush();
            return Phase::WinChoice;
        }

        if let Some(milestone) = self.config.milestone_crossed(previous, current).copied() {
            self.record(GameEvent::MilestoneReached {
                threshold: milestone.threshold,
            });
            step.show(milestone.message);
            step.hold(self.config.timing.milestone);
        }

        self.progress.revealed += 1;
        if self.progress.revealed > MAX_ROUNDS {
            self.needs_sequence = true;
        }
        Phase::RoundStart
    }

    fn win_choice(&mut self, input: InputSnapshot, step: &mut Step) -> Phase {
        if input.confirm {
            self.record(GameEvent::SessionFinished);
            Phase::Finished
        } else if input.alt {
            self.score.reset();
            self.needs_sequence = true;
            self.progress = RoundProgress::new();
            self.record(GameEvent::SessionContinued);
            Phase::RoundStart
        } else {
            step.hold(self.config.timing.choice_poll);
            Phase::WinChoice
        }
    }
}

/// Carries out `effects` on `board`. Flushes send `frame` as it stands now.
pub fn apply_effects<B>(frame: &Frame, effects: &[Effect], board: &mut B)
where
    B: LedStrip + TextDisplay + DelayNs + ?Sized,
{
    for effect in effects {
        match effect {
            Effect::Show(message) => board.show_message(message.line1, message.line2),
            Effect::Flush => frame.flush(board),
            Effect::Hold(duration) => hold(board, *duration),
        }
    }
}

fn hold<D: DelayNs + ?Sized>(delay: &mut D, duration: Duration) {
    let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
    delay.delay_us(micros);
}

/// Plays the session on `board` until the player chooses to finish.
pub fn run<R, B>(session: &mut Session<R>, board: &mut B)
where
    R: RngCore,
    B: Board + ?Sized,
{
    let _ = run_with(session, board, |_, _| ControlFlow::Continue(()));
}

/// Like [`run`], calling `after_step` once every transition's effects are done.
///
/// Returns `ControlFlow::Break` if the callback stopped the loop early, or
/// `ControlFlow::Continue` once the session finished.
pub fn run_with<R, B, F>(session: &mut Session<R>, board: &mut B, mut after_step: F) -> ControlFlow<()>
where
    R: RngCore,
    B: Board + ?Sized,
    F: FnMut(&Session<R>, &Step) -> ControlFlow<()>,
{
    while !session.is_finished() {
        let input = board.sample();
        let step = session.step(input);
        apply_effects(session.frame(), step.effects(), board);
        if after_step(session, &step).is_break() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}
