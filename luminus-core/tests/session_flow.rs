mod support;

use core::ops::ControlFlow;
use core::time::Duration;

use luminus_core::config::{GameConfig, MAX_ROUNDS};
use luminus_core::frame::STRIP_SETTLE_US;
use luminus_core::grid::Cell;
use luminus_core::input::InputSnapshot;
use luminus_core::messages::{self, Message};
use luminus_core::session::{Effect, Phase, RoundOutcome, Session, run_with};
use luminus_core::telemetry::GameEvent;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use support::{RecordingBoard, drive_until, expected_cell, perfect_input, toward, wrong_input};

fn session(seed: u64) -> Session<SmallRng> {
    Session::new(GameConfig::default(), SmallRng::seed_from_u64(seed))
}

fn in_round(session: &Session<SmallRng>, revealed: usize) -> bool {
    matches!(session.phase(), Phase::AwaitInput { .. }) && session.progress().revealed == revealed
}

#[test]
fn welcome_then_tutorial_then_first_round() {
    let mut session = session(1);

    let welcome = session.step(InputSnapshot::idle());
    assert_eq!(
        welcome.effects(),
        &[
            Effect::Show(messages::WELCOME),
            Effect::Hold(Duration::from_millis(4000)),
            Effect::Show(messages::PRESS_TO_START),
        ]
    );
    assert_eq!(welcome.phase(), Phase::AwaitStart);

    let idle = session.step(InputSnapshot::idle());
    assert_eq!(idle.phase(), Phase::AwaitStart);
    assert_eq!(idle.effects(), &[Effect::Hold(Duration::from_millis(100))]);

    let start = session.step(InputSnapshot::idle().with_confirm());
    assert_eq!(start.phase(), Phase::Tutorial { page: 0 });

    let mut pages = Vec::new();
    let mut dwell = Duration::ZERO;
    while matches!(session.phase(), Phase::Tutorial { .. }) {
        let step = session.step(InputSnapshot::idle());
        pages.extend(step.messages());
        dwell += step.hold_total();
    }
    assert_eq!(pages, messages::TUTORIAL.to_vec());
    assert_eq!(dwell, Duration::from_millis(11_000));
    assert_eq!(session.phase(), Phase::RoundStart);
    assert!(session.sequence().is_none());

    session.step(InputSnapshot::idle());
    assert!(session.sequence().is_some());
    assert_eq!(session.progress().revealed, 1);
    assert!(matches!(session.phase(), Phase::Playback(_)));
}

#[test]
fn playback_lights_each_revealed_cell_once() {
    let mut replay = session(7);
    drive_until(&mut replay, perfect_input, |s| {
        s.phase() == Phase::RoundStart && s.progress().revealed == 3
    });
    replay.step(InputSnapshot::idle());
    let sequence = *replay.sequence().expect("sequence");

    let mut lit = Vec::new();
    while matches!(replay.phase(), Phase::Playback(_)) {
        // Joystick and buttons are ignored while the sequence plays.
        let step = replay.step(InputSnapshot::idle().with_confirm().with_alt());
        assert!(step.flushes());
        let on: Vec<_> = replay.frame().lit().collect();
        assert!(on.len() <= 1);
        lit.extend(on);
    }

    assert_eq!(lit, sequence.prefix(3).to_vec());
    assert_eq!(replay.phase(), Phase::AwaitInput { step: 0 });
    assert!(replay.frame().lit().next().is_none());
}

#[test]
fn perfect_player_wins_after_ten_rounds() {
    let mut session = session(42);
    let mut shown: Vec<Message> = Vec::new();
    let mut last_result = None;

    drive_until(
        &mut session,
        |s| perfect_input(s),
        |s| {
            if let Phase::RoundResult(outcome) = s.phase() {
                last_result = Some(outcome);
            }
            s.phase() == Phase::WinChoice
        },
    );

    assert_eq!(session.score(), 10);
    assert_eq!(last_result, Some(RoundOutcome::Won { previous: 9 }));
    assert!(session.frame().lit().next().is_none());

    let recent: Vec<_> = session.events().oldest_first().map(|r| r.event).collect();
    assert!(recent.contains(&GameEvent::SessionWon { score: 10 }));
    assert!(!recent.iter().any(|event| matches!(event, GameEvent::RoundLost { .. })));

    // Replay for the message stream, which the drive loop above discards.
    let mut replay = self::session(42);
    while replay.phase() != Phase::WinChoice {
        let input = perfect_input(&replay);
        shown.extend(replay.step(input).messages());
    }
    let tail: Vec<_> = shown.iter().rev().take(2).rev().copied().collect();
    assert_eq!(tail, vec![messages::WON, messages::CHOICE]);
}

#[test]
fn milestones_appear_once_each_in_order() {
    let mut session = session(3);
    let mut praise = Vec::new();

    while session.phase() != Phase::WinChoice {
        let input = perfect_input(&session);
        let step = session.step(input);
        for message in step.messages() {
            if [messages::KEEP_IT_UP, messages::IMPRESSIVE, messages::ALMOST_THERE]
                .contains(&message)
            {
                praise.push((message, session.score()));
            }
        }
    }

    assert_eq!(
        praise,
        vec![
            (messages::KEEP_IT_UP, 3),
            (messages::IMPRESSIVE, 5),
            (messages::ALMOST_THERE, 7),
        ]
    );
}

#[test]
fn continue_after_win_resets_score_and_sequence() {
    let mut session = session(11);
    drive_until(&mut session, perfect_input, |s| s.phase() == Phase::WinChoice);
    let finished = *session.sequence().expect("sequence");

    let waiting = session.step(InputSnapshot::idle());
    assert_eq!(waiting.phase(), Phase::WinChoice);
    assert_eq!(waiting.effects(), &[Effect::Hold(Duration::from_millis(100))]);

    let resumed = session.step(InputSnapshot::idle().with_alt());
    assert_eq!(resumed.phase(), Phase::RoundStart);
    assert_eq!(session.score(), 0);
    assert_eq!(
        session.events().latest().map(|r| r.event),
        Some(GameEvent::SessionContinued)
    );

    session.step(InputSnapshot::idle());
    let fresh = *session.sequence().expect("sequence");
    assert_ne!(fresh, finished);
    assert_eq!(session.progress().revealed, 1);
}

#[test]
fn finish_after_win_ends_the_session() {
    let mut session = session(5);
    drive_until(&mut session, perfect_input, |s| s.phase() == Phase::WinChoice);

    session.step(InputSnapshot::idle().with_confirm());
    assert!(session.is_finished());

    let after = session.step(InputSnapshot::idle().with_confirm().with_alt());
    assert_eq!(after.phase(), Phase::Finished);
    assert!(after.effects().is_empty());
    assert_eq!(session.score(), 10);
}

#[test]
fn loss_on_round_four_keeps_score_and_restarts() {
    let mut session = session(99);
    drive_until(&mut session, perfect_input, |s| in_round(s, 4));
    let old = *session.sequence().expect("sequence");
    assert_eq!(session.score(), 3);

    drive_until(&mut session, wrong_input, |s| {
        s.phase() == Phase::RoundResult(RoundOutcome::Lost)
    });
    assert_eq!(session.score(), 3);

    let lost = session.step(InputSnapshot::idle());
    assert_eq!(
        lost.effects(),
        &[
            Effect::Show(messages::LOST),
            Effect::Flush,
            Effect::Hold(Duration::from_millis(2000)),
        ]
    );
    assert!(session.frame().lit().next().is_none());
    assert_eq!(lost.phase(), Phase::RoundStart);

    session.step(InputSnapshot::idle());
    assert_eq!(session.progress().revealed, 1);
    assert_eq!(session.score(), 3);
    assert_ne!(*session.sequence().expect("sequence"), old);
}

#[test]
fn first_wrong_confirm_ends_the_round() {
    let mut session = session(23);
    drive_until(&mut session, perfect_input, |s| in_round(s, 3));

    drive_until(&mut session, perfect_input, |s| {
        s.phase() == Phase::AwaitInput { step: 1 }
    });
    assert_eq!(session.progress().verified, 1);

    drive_until(&mut session, wrong_input, |s| {
        matches!(s.phase(), Phase::RoundResult(_))
    });
    assert_eq!(session.phase(), Phase::RoundResult(RoundOutcome::Lost));
    assert_eq!(session.progress().verified, 1);

    let events: Vec<_> = session.events().oldest_first().map(|r| r.event).collect();
    let rejected = events
        .iter()
        .position(|event| matches!(event, GameEvent::StepRejected { step: 1, .. }))
        .expect("rejection recorded");
    assert!(
        !events[rejected..]
            .iter()
            .any(|event| matches!(event, GameEvent::StepAccepted { .. }))
    );
}

#[test]
fn confirm_while_deflected_shows_the_judged_cell() {
    let mut session = session(77);
    drive_until(&mut session, perfect_input, |s| in_round(s, 1));

    let target = expected_cell(&session, 0);
    let beside = Cell::new(if target.x > 0 { target.x - 1 } else { 1 }, target.y);
    drive_until(
        &mut session,
        |s| InputSnapshot::idle().with_axes(toward(s.cursor().position(), beside)),
        |s| s.cursor().position() == beside,
    );
    assert_eq!(session.phase(), Phase::AwaitInput { step: 0 });

    let press = session.step(
        InputSnapshot::idle()
            .with_axes(toward(beside, target))
            .with_confirm(),
    );

    assert_eq!(session.cursor().position(), target);
    assert_eq!(
        press.effects(),
        &[
            Effect::Flush,
            Effect::Hold(Duration::from_millis(200)),
            Effect::Hold(Duration::from_millis(100)),
        ]
    );
    assert_eq!(
        session.frame().lit().collect::<Vec<_>>(),
        vec![target.to_linear().expect("target is on the grid")]
    );
    assert_eq!(press.phase(), Phase::RoundResult(RoundOutcome::Won { previous: 0 }));
}

#[test]
fn blocking_driver_plays_to_the_finish() {
    let mut session = session(2024);
    let mut board = RecordingBoard::new();
    let next = board.next_input.clone();
    let mut flushes = 0_u64;
    let mut rounds_seen = 0;

    let flow = run_with(&mut session, &mut board, |s, step| {
        flushes += u64::from(step.flushes());
        if matches!(step.phase(), Phase::RoundResult(_)) {
            rounds_seen += 1;
        }
        let input = if s.phase() == Phase::WinChoice {
            InputSnapshot::idle().with_confirm()
        } else {
            perfect_input(s)
        };
        next.set(input);
        ControlFlow::Continue(())
    });

    assert_eq!(flow, ControlFlow::Continue(()));
    assert!(session.is_finished());
    assert_eq!(rounds_seen, MAX_ROUNDS);
    assert_eq!(board.frames.len() as u64, flushes);
    assert_eq!(board.shown(messages::WON.line1), 1);
    assert_eq!(board.shown(messages::LOST.line1), 0);

    let slept = Duration::from_nanos(board.delayed_ns);
    let settle = Duration::from_micros(STRIP_SETTLE_US.into()) * u32::try_from(flushes).unwrap();
    assert_eq!(slept, session.clock() + settle);
}

#[test]
fn callback_can_stop_the_driver() {
    let mut session = session(8);
    let mut board = RecordingBoard::new();

    let flow = run_with(&mut session, &mut board, |s, _| {
        if s.phase() == Phase::AwaitStart {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(session.phase(), Phase::AwaitStart);
    assert_eq!(
        board.messages,
        vec![
            (
                messages::WELCOME.line1.to_string(),
                messages::WELCOME.line2.to_string()
            ),
            (
                messages::PRESS_TO_START.line1.to_string(),
                messages::PRESS_TO_START.line2.to_string()
            ),
        ]
    );
}
