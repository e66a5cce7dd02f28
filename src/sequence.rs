use std::collections::VecDeque;

use rand::Rng;

use crate::stimulus::{Color, Position, Stimulus};

/// Anything that can hand the trial loop its next stimulus.
pub trait StimulusSource {
    fn next_stimulus(&mut self) -> Stimulus;
}

/// Draws memoryless, uniformly distributed stimuli from an injected RNG.
#[derive(Debug)]
pub struct SequenceGenerator<R: Rng> {
    grid_size: usize,
    rng: R,
}

impl<R: Rng> SequenceGenerator<R> {
    pub fn new(grid_size: usize, rng: R) -> Self {
        Self { grid_size, rng }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Stimulus {
        let position = Position::new(
            self.rng.gen_range(0..self.grid_size),
            self.rng.gen_range(0..self.grid_size),
        );
        let color = Color::ALL[self.rng.gen_range(0..Color::ALL.len())];
        Stimulus { position, color }
    }
}

impl<R: Rng> StimulusSource for SequenceGenerator<R> {
    fn next_stimulus(&mut self) -> Stimulus {
        self.next()
    }
}

/// Replays a predetermined list of stimuli, then repeats a red dot at the origin.
///
/// Used by headless sessions that need exact sequences.
pub struct FixedSequence {
    queued: VecDeque<Stimulus>,
    fallback: Stimulus,
}

impl FixedSequence {
    pub fn new(stimuli: impl IntoIterator<Item = Stimulus>) -> Self {
        Self {
            queued: stimuli.into_iter().collect(),
            fallback: Stimulus::new((0, 0), Color::Red),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queued.len()
    }
}

impl StimulusSource for FixedSequence {
    fn next_stimulus(&mut self) -> Stimulus {
        self.queued.pop_front().unwrap_or(self.fallback)
    }
}

/// Append-only record of every stimulus emitted during a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceHistory {
    stimuli: Vec<Stimulus>,
}

impl SequenceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stimulus: Stimulus) -> usize {
        self.stimuli.push(stimulus);
        self.stimuli.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Stimulus> {
        self.stimuli.get(index)
    }

    /// The stimulus shown `n` steps before `index`.
    ///
    /// Panics when `index < n` or `index` is past the end; the warm-up
    /// window guarantees callers never ask for either.
    pub fn lookback(&self, index: usize, n: usize) -> &Stimulus {
        assert!(index >= n, "lookback({index}, {n}) reaches before the first stimulus");
        &self.stimuli[index - n]
    }

    pub fn len(&self) -> usize {
        self.stimuli.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stimuli.is_empty()
    }

    pub fn clear(&mut self) {
        self.stimuli.clear();
    }
}
