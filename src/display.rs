use std::io;

use crate::scores::ScoreTable;
use crate::session::{SessionConfig, SessionState, SessionSummary};
use crate::stimulus::Stimulus;

/// Where a stimulus sits in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StimulusView {
    /// Warm-up item `item` (1-based) of `of`
    Memorize { item: usize, of: usize },
    /// Scored trial `number` (1-based) of `of`
    Trial { number: usize, of: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct { points: u32 },
    Incorrect,
    TimesUp,
}

/// A screen that can paint its current contents again, e.g. after the
/// terminal was resized.
pub trait Redraw {
    fn redraw(&mut self) -> io::Result<()>;
}

/// Everything the trial loop shows the player. Implementations only render;
/// nothing they return changes the session.
pub trait TrialDisplay: Redraw {
    fn show_ready(&mut self, config: &SessionConfig) -> io::Result<()>;

    fn show_stimulus(
        &mut self,
        stimulus: &Stimulus,
        config: &SessionConfig,
        state: &SessionState,
        view: StimulusView,
    ) -> io::Result<()>;

    /// Shown under the current stimulus.
    fn show_feedback(&mut self, feedback: Feedback) -> io::Result<()>;

    fn show_memorized(&mut self) -> io::Result<()>;

    fn show_help(&mut self) -> io::Result<()>;

    fn show_scores(&mut self, table: &ScoreTable) -> io::Result<()>;

    fn show_summary(&mut self, summary: &SessionSummary) -> io::Result<()>;

    fn show_warning(&mut self, message: &str) -> io::Result<()>;
}
