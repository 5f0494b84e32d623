//! Game event catalog and a fixed-capacity record of recent events.
//!
//! The session records an [`EventRecord`] for every gameplay milestone. Drivers
//! forward new records to their own log sink (defmt on hardware, a transcript
//! file on the host) by remembering the last id they saw and calling
//! [`EventLog::since`].

use core::fmt;
use core::time::Duration;

use heapless::HistoryBuf;

use crate::grid::LinearIndex;

/// Monotonic identifier assigned to every recorded event.
pub type EventId = u32;

/// Records retained before the oldest are overwritten.
pub const EVENT_LOG_CAPACITY: usize = 32;

/// Everything the session reports about a game in progress.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GameEvent {
    TutorialStarted,
    SequenceGenerated,
    RoundStarted {
        revealed: usize,
    },
    CellRevealed {
        step: usize,
        index: LinearIndex,
    },
    StepAccepted {
        step: usize,
        index: LinearIndex,
    },
    StepRejected {
        step: usize,
        expected: LinearIndex,
        actual: Option<LinearIndex>,
    },
    RoundWon {
        score: u32,
    },
    RoundLost {
        score: u32,
    },
    MilestoneReached {
        threshold: u32,
    },
    SessionWon {
        score: u32,
    },
    SessionContinued,
    SessionFinished,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::TutorialStarted => f.write_str("tutorial-started"),
            GameEvent::SequenceGenerated => f.write_str("sequence-generated"),
            GameEvent::RoundStarted { revealed } => write!(f, "round-started length={revealed}"),
            GameEvent::CellRevealed { step, index } => {
                write!(f, "cell-revealed step={step} index={index}")
            }
            GameEvent::StepAccepted { step, index } => {
                write!(f, "step-accepted step={step} index={index}")
            }
            GameEvent::StepRejected {
                step,
                expected,
                actual: Some(actual),
            } => write!(
                f,
                "step-rejected step={step} expected={expected} actual={actual}"
            ),
            GameEvent::StepRejected {
                step,
                expected,
                actual: None,
            } => write!(f, "step-rejected step={step} expected={expected} actual=off-grid"),
            GameEvent::RoundWon { score } => write!(f, "round-won score={score}"),
            GameEvent::RoundLost { score } => write!(f, "round-lost score={score}"),
            GameEvent::MilestoneReached { threshold } => {
                write!(f, "milestone-reached threshold={threshold}")
            }
            GameEvent::SessionWon { score } => write!(f, "session-won score={score}"),
            GameEvent::SessionContinued => f.write_str("session-continued"),
            GameEvent::SessionFinished => f.write_str("session-finished"),
        }
    }
}

/// An event stamped with its id and the game-clock time it happened at.
///
/// The game clock is the sum of every hold the session has requested, so it
/// tracks wall time on hardware without the core needing a timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub at: Duration,
    pub event: GameEvent,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} t={}ms {}", self.id, self.at.as_millis(), self.event)
    }
}

/// Ring of the most recent events.
pub struct EventLog<const CAPACITY: usize = EVENT_LOG_CAPACITY> {
    ring: HistoryBuf<EventRecord, CAPACITY>,
    next_id: EventId,
}

impl<const CAPACITY: usize> EventLog<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_id: 0,
        }
    }

    /// Stores `event` and returns the id it was given.
    pub fn record(&mut self, event: GameEvent, at: Duration) -> EventId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.ring.write(EventRecord { id, at, event });
        id
    }

    /// Id the next recorded event will receive.
    pub const fn next_id(&self) -> EventId {
        self.next_id
    }

    pub fn latest(&self) -> Option<&EventRecord> {
        self.ring.recent()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Retained records in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// Retained records with an id at or after `id`, oldest first.
    ///
    /// Ids wrap, so "after" means less than half the id space ahead of `id`.
    /// Records that were already overwritten are silently skipped.
    pub fn since(&self, id: EventId) -> impl Iterator<Item = &EventRecord> + '_ {
        self.oldest_first()
            .filter(move |record| record.id.wrapping_sub(id) <= EventId::MAX / 2)
    }
}

impl<const CAPACITY: usize> Default for EventLog<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
