//! Random target sequences.
//!
//! A full sequence of [`MAX_ROUNDS`] strip indices is drawn up front; rounds
//! reveal a growing prefix of it. Repeats are allowed. The generator is only as
//! random as the [`RngCore`] it is given, so callers decide how to seed it.

use core::fmt;

use rand::{Rng, RngCore};

use crate::config::MAX_ROUNDS;
use crate::grid::{LED_COUNT, LinearIndex};

/// Errors raised when building a [`Sequence`] from explicit indices.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SequenceError {
    /// Element `position` points past the end of the strip.
    IndexOutOfRange {
        position: usize,
        index: LinearIndex,
    },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::IndexOutOfRange { position, index } => {
                write!(f, "sequence[{position}] = {index} is not a strip index")
            }
        }
    }
}

impl core::error::Error for SequenceError {}

/// Full-length target sequence. Every element is a valid strip index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sequence {
    steps: [LinearIndex; MAX_ROUNDS],
}

impl Sequence {
    /// Draws every element independently and uniformly from `[0, LED_COUNT)`.
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        let mut steps = [0; MAX_ROUNDS];
        for step in &mut steps {
            *step = rng.gen_range(0..LED_COUNT);
        }
        Self { steps }
    }

    /// Builds a sequence from known indices.
    pub fn from_indices(steps: [LinearIndex; MAX_ROUNDS]) -> Result<Self, SequenceError> {
        if let Some((position, &index)) = steps
            .iter()
            .enumerate()
            .find(|(_, index)| **index >= LED_COUNT)
        {
            return Err(SequenceError::IndexOutOfRange { position, index });
        }
        Ok(Self { steps })
    }

    /// Target for sequence position `step`.
    pub fn get(&self, step: usize) -> Option<LinearIndex> {
        self.steps.get(step).copied()
    }

    /// The first `len` targets, clamped to the sequence length.
    pub fn prefix(&self, len: usize) -> &[LinearIndex] {
        &self.steps[..len.min(MAX_ROUNDS)]
    }

    pub fn as_slice(&self) -> &[LinearIndex] {
        &self.steps
    }

    pub const fn len(&self) -> usize {
        MAX_ROUNDS
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}
