use ratatui::backend::Backend;
use tracing::info;

use crate::config::ConfigStore;
use crate::display::TrialDisplay;
use crate::error::AppResult;
use crate::input::InputPoller;
use crate::menu::{self, MenuChoice};
use crate::runtime::{Clock, KeySource};
use crate::scores::{HighScores, ScoreStore};
use crate::sequence::StimulusSource;
use crate::session::SessionConfig;
use crate::trial::{SessionOutcome, TrialLoop};
use crate::ui::TerminalDisplay;

/// Owns everything a run of the program needs: input, screen, scores and
/// remembered settings.
pub struct App<K: KeySource, C: Clock, B: Backend> {
    poller: InputPoller<K, C>,
    display: TerminalDisplay<B>,
    scores: HighScores,
    prefs: Box<dyn ConfigStore>,
}

impl<K: KeySource, C: Clock, B: Backend> App<K, C, B> {
    pub fn new(
        poller: InputPoller<K, C>,
        mut display: TerminalDisplay<B>,
        store: Box<dyn ScoreStore>,
        prefs: Box<dyn ConfigStore>,
    ) -> Self {
        let (scores, load_error) = HighScores::open(store);
        if let Some(err) = load_error {
            display.push_warning(format!("Could not load high scores: {err}"));
        }
        Self {
            poller,
            display,
            scores,
            prefs,
        }
    }

    pub fn display(&self) -> &TerminalDisplay<B> {
        &self.display
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn poller(&self) -> &InputPoller<K, C> {
        &self.poller
    }

    /// Ready screen, one session, then the summary until a key is pressed.
    pub fn run_session<G: StimulusSource>(
        &mut self,
        config: SessionConfig,
        source: G,
    ) -> AppResult<SessionOutcome> {
        self.display.show_ready(&config)?;
        self.poller.wait_for_key(&mut self.display)?;
        self.display.clear_warnings();

        let mut session = TrialLoop::new(config, source);
        let outcome = session.run(&mut self.poller, &mut self.display, &mut self.scores)?;
        if matches!(outcome, SessionOutcome::Completed(_)) {
            self.poller.wait_for_key(&mut self.display)?;
        }
        Ok(outcome)
    }

    /// Menu loop. `source_for` builds the stimulus source for each game.
    pub fn run_menu<G, F>(&mut self, mut source_for: F) -> AppResult<()>
    where
        G: StimulusSource,
        F: FnMut(&SessionConfig) -> G,
    {
        loop {
            let choice = menu::main_menu(
                &mut self.poller,
                &mut self.display,
                &self.scores,
                self.prefs.as_ref(),
            )?;
            match choice {
                MenuChoice::Play(config) => {
                    let source = source_for(&config);
                    if let SessionOutcome::Aborted = self.run_session(config, source)? {
                        info!("back to menu after quit");
                    }
                }
                MenuChoice::Exit => return Ok(()),
            }
        }
    }
}
