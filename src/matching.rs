use crate::sequence::SequenceHistory;

/// Which modalities of the current stimulus repeat the one `n` steps back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchFlags {
    pub visual_match: bool,
    pub color_match: bool,
}

impl MatchFlags {
    pub fn new(visual_match: bool, color_match: bool) -> Self {
        Self {
            visual_match,
            color_match,
        }
    }

    /// Number of scoring opportunities this trial contributes (0, 1 or 2).
    pub fn count(&self) -> u32 {
        self.visual_match as u32 + self.color_match as u32
    }
}

/// Lag-n comparison of the stimulus at `index` against `index - n`.
///
/// Only defined for `index >= n`.
pub fn evaluate(history: &SequenceHistory, index: usize, n: usize) -> MatchFlags {
    let current = history
        .get(index)
        .unwrap_or_else(|| panic!("no stimulus at index {index}"));
    let previous = history.lookback(index, n);

    MatchFlags {
        visual_match: current.position == previous.position,
        color_match: current.color == previous.color,
    }
}
