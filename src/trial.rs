use chrono::Local;
use tracing::{debug, info, warn};

use crate::display::{Feedback, StimulusView, TrialDisplay};
use crate::error::AppResult;
use crate::input::{HoldOutcome, InputPoller, PollOutcome, SideCommand};
use crate::matching::{self, MatchFlags};
use crate::runtime::{Clock, KeySource};
use crate::scores::{HighScores, ScoreRecord};
use crate::scoring::{self, Resolution, Response};
use crate::sequence::{SequenceHistory, StimulusSource};
use crate::session::{SessionConfig, SessionState, SessionSummary};
use crate::stimulus::Stimulus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Memorize,
    Active,
    Summary,
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(SessionSummary),
    /// Quit before the last trial; nothing was persisted
    Aborted,
}

/// Drives one session: `n` memorization items, `trial_count` scored trials,
/// then the summary. Owns all mutable session state.
pub struct TrialLoop<G: StimulusSource> {
    config: SessionConfig,
    source: G,
    history: SequenceHistory,
    state: SessionState,
    phase: Phase,
}

impl<G: StimulusSource> TrialLoop<G> {
    pub fn new(config: SessionConfig, source: G) -> Self {
        Self {
            config,
            source,
            history: SequenceHistory::new(),
            state: SessionState::default(),
            phase: Phase::Init,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &SequenceHistory {
        &self.history
    }

    /// Runs a fresh session to completion or abort.
    pub fn run<K: KeySource, C: Clock>(
        &mut self,
        poller: &mut InputPoller<K, C>,
        display: &mut dyn TrialDisplay,
        scores: &mut HighScores,
    ) -> AppResult<SessionOutcome> {
        self.phase = Phase::Init;
        poller.set_granularity(self.config.timing().poll_interval);
        loop {
            match self.phase {
                Phase::Init => self.init(),
                Phase::Memorize => self.memorize(poller, display)?,
                Phase::Active => self.active(poller, display, scores)?,
                Phase::Summary => {
                    let summary = self.summarize(display, scores)?;
                    return Ok(SessionOutcome::Completed(summary));
                }
                Phase::Aborted => return Ok(SessionOutcome::Aborted),
            }
        }
    }

    fn init(&mut self) {
        self.state.reset();
        self.history.clear();
        info!(
            n = self.config.n(),
            grid_size = self.config.grid_size(),
            trials = self.config.trial_count(),
            window_ms = self.config.response_window().as_millis() as u64,
            "session started"
        );
        self.phase = Phase::Memorize;
    }

    fn abort(&mut self) {
        info!(
            phase = ?self.phase,
            trial = self.state.current_trial_index,
            score = self.state.score,
            opportunities = self.state.opportunities,
            "session aborted"
        );
        self.state.running = false;
        self.phase = Phase::Aborted;
    }

    fn emit(&mut self) -> (Stimulus, usize) {
        let stimulus = self.source.next_stimulus();
        let index = self.history.append(stimulus);
        (stimulus, index)
    }

    fn memorize<K: KeySource, C: Clock>(
        &mut self,
        poller: &mut InputPoller<K, C>,
        display: &mut dyn TrialDisplay,
    ) -> AppResult<()> {
        let n = self.config.n();
        let timing = *self.config.timing();

        for item in 1..=n {
            let (stimulus, _) = self.emit();
            display.show_stimulus(
                &stimulus,
                &self.config,
                &self.state,
                StimulusView::Memorize { item, of: n },
            )?;
            if poller.hold(timing.memorize_hold, display)? == HoldOutcome::Quit {
                self.abort();
                return Ok(());
            }
        }

        display.show_memorized()?;
        if poller.hold(timing.transition_hold, display)? == HoldOutcome::Quit {
            self.abort();
            return Ok(());
        }
        self.phase = Phase::Active;
        Ok(())
    }

    fn active<K: KeySource, C: Clock>(
        &mut self,
        poller: &mut InputPoller<K, C>,
        display: &mut dyn TrialDisplay,
        scores: &HighScores,
    ) -> AppResult<()> {
        let n = self.config.n();
        let trial_count = self.config.trial_count();
        let feedback_hold = self.config.timing().feedback_hold;

        for t in 0..trial_count {
            self.state.current_trial_index = t;
            let view = StimulusView::Trial {
                number: t + 1,
                of: trial_count,
            };
            let (stimulus, index) = self.emit();
            display.show_stimulus(&stimulus, &self.config, &self.state, view)?;

            let flags = matching::evaluate(&self.history, index, n);
            self.state.opportunities += flags.count();

            let Some(response) = self.collect_response(&stimulus, view, poller, display, scores)?
            else {
                self.abort();
                return Ok(());
            };

            let resolution = scoring::resolve(response, flags);
            self.state.score += resolution.points;
            log_trial(t, &flags, response, &resolution);

            display.show_feedback(feedback_for(response, &resolution))?;
            if poller.hold(feedback_hold, display)? == HoldOutcome::Quit {
                self.abort();
                return Ok(());
            }
        }

        self.phase = Phase::Summary;
        Ok(())
    }

    /// Polls until a claim or the deadline, serving side commands in
    /// between. None means the player quit.
    fn collect_response<K: KeySource, C: Clock>(
        &self,
        stimulus: &Stimulus,
        view: StimulusView,
        poller: &mut InputPoller<K, C>,
        display: &mut dyn TrialDisplay,
        scores: &HighScores,
    ) -> AppResult<Option<Response>> {
        let deadline = poller.deadline_in(self.config.response_window());
        loop {
            match poller.poll_with_deadline(deadline, display)? {
                PollOutcome::Response(response) => return Ok(Some(response)),
                PollOutcome::Timeout => return Ok(Some(Response::None)),
                PollOutcome::Quit => return Ok(None),
                PollOutcome::Side(cmd) => {
                    match cmd {
                        SideCommand::Help => display.show_help()?,
                        SideCommand::Scores => display.show_scores(scores.table())?,
                    }
                    poller.wait_for_key(display)?;
                    display.show_stimulus(stimulus, &self.config, &self.state, view)?;
                }
            }
        }
    }

    fn summarize(
        &mut self,
        display: &mut dyn TrialDisplay,
        scores: &mut HighScores,
    ) -> AppResult<SessionSummary> {
        let accuracy = self.state.accuracy();
        let key = self.config.score_key();
        let mut new_record = false;

        if let Some(accuracy) = accuracy {
            if scores.is_new_record(&key, accuracy) {
                new_record = true;
                let record = ScoreRecord {
                    accuracy,
                    score: self.state.score,
                    total: self.state.opportunities,
                    date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                };
                if let Err(err) = scores.save(&key, record) {
                    warn!(error = %err, key = %key, "could not save high score");
                    display.show_warning(&format!("Could not save score: {err}"))?;
                }
            }
        }

        let summary = SessionSummary {
            n: self.config.n(),
            grid_size: self.config.grid_size(),
            score: self.state.score,
            opportunities: self.state.opportunities,
            accuracy,
            new_record,
        };
        self.state.running = false;
        info!(
            score = summary.score,
            opportunities = summary.opportunities,
            accuracy = ?summary.accuracy,
            new_record,
            "session complete"
        );
        display.show_summary(&summary)?;
        Ok(summary)
    }
}

fn feedback_for(response: Response, resolution: &Resolution) -> Feedback {
    match (response, resolution.correct) {
        (Response::None, _) => Feedback::TimesUp,
        (_, true) => Feedback::Correct {
            points: resolution.points,
        },
        (_, false) => Feedback::Incorrect,
    }
}

fn log_trial(t: usize, flags: &MatchFlags, response: Response, resolution: &Resolution) {
    debug!(
        trial = t + 1,
        visual = flags.visual_match,
        color = flags.color_match,
        %response,
        correct = resolution.correct,
        points = resolution.points,
        "trial resolved"
    );
}
