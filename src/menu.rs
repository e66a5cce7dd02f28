use ratatui::backend::Backend;
use tracing::{info, warn};

use crate::config::{ConfigStore, Preferences, GRID_CHOICES, N_CHOICES, RESPONSE_CHOICES, TRIAL_CHOICES};
use crate::display::TrialDisplay;
use crate::error::AppResult;
use crate::input::InputPoller;
use crate::runtime::{Clock, KeySource};
use crate::scores::HighScores;
use crate::session::SessionConfig;
use crate::ui::{MenuOption, SettingsStep, TerminalDisplay};

const WIZARD_STEPS: usize = 4;
const N_DIFFICULTY: [&str; 8] = [
    "Beginner",
    "Easy",
    "Normal",
    "Challenging",
    "Hard",
    "Very Hard",
    "Expert",
    "Master",
];

#[derive(Debug, Clone, PartialEq)]
pub enum MenuChoice {
    Play(SessionConfig),
    Exit,
}

fn digit(i: usize) -> char {
    (b'0' + i as u8) as char
}

/// Main menu loop. Returns once the player starts a game or exits.
pub fn main_menu<K: KeySource, C: Clock, B: Backend>(
    poller: &mut InputPoller<K, C>,
    display: &mut TerminalDisplay<B>,
    scores: &HighScores,
    prefs: &dyn ConfigStore,
) -> AppResult<MenuChoice> {
    loop {
        display.show_menu()?;
        match poller.wait_for_char(display)? {
            '1' => return configure(poller, display, prefs).map(MenuChoice::Play),
            '2' => {
                display.show_scores(scores.table())?;
                poller.wait_for_key(display)?;
            }
            '3' => {
                display.show_help()?;
                poller.wait_for_key(display)?;
            }
            '4' => {
                info!("exit from menu");
                display.show_farewell()?;
                return Ok(MenuChoice::Exit);
            }
            _ => {}
        }
    }
}

fn choose<K: KeySource, C: Clock, B: Backend>(
    poller: &mut InputPoller<K, C>,
    display: &mut TerminalDisplay<B>,
    step: SettingsStep,
) -> AppResult<usize> {
    let keys: Vec<char> = step.options.iter().map(|o| o.key).collect();
    display.show_settings(step)?;
    loop {
        let c = poller.wait_for_char(display)?;
        if let Some(index) = keys.iter().position(|&k| k == c) {
            return Ok(index);
        }
    }
}

/// Four-step settings wizard. The chosen values are remembered for the
/// next run.
pub fn configure<K: KeySource, C: Clock, B: Backend>(
    poller: &mut InputPoller<K, C>,
    display: &mut TerminalDisplay<B>,
    prefs: &dyn ConfigStore,
) -> AppResult<SessionConfig> {
    let recommended = Preferences::default();

    let n_values: Vec<usize> = N_CHOICES.collect();
    let n = n_values[choose(
        poller,
        display,
        SettingsStep {
            number: 1,
            of: WIZARD_STEPS,
            title: "Select N-Back Level",
            options: n_values
                .iter()
                .zip(N_DIFFICULTY)
                .map(|(&n, difficulty)| MenuOption {
                    key: digit(n),
                    label: format!("N={n}"),
                    detail: difficulty.to_string(),
                    marked: n == recommended.n,
                })
                .collect(),
        },
    )?];

    let grid_values: Vec<usize> = GRID_CHOICES.collect();
    let grid_size = grid_values[choose(
        poller,
        display,
        SettingsStep {
            number: 2,
            of: WIZARD_STEPS,
            title: "Select Grid Size",
            options: grid_values
                .iter()
                .map(|&g| MenuOption {
                    key: digit(g),
                    label: format!("{g}×{g} Grid"),
                    detail: String::new(),
                    marked: g == recommended.grid_size,
                })
                .collect(),
        },
    )?];

    let trial_count = TRIAL_CHOICES[choose(
        poller,
        display,
        SettingsStep {
            number: 3,
            of: WIZARD_STEPS,
            title: "Select Trial Count",
            options: TRIAL_CHOICES
                .iter()
                .enumerate()
                .map(|(i, &t)| MenuOption {
                    key: digit(i + 1),
                    label: format!("{t} Trials"),
                    detail: String::new(),
                    marked: t == recommended.trial_count,
                })
                .collect(),
        },
    )?];

    let response_secs = RESPONSE_CHOICES[choose(
        poller,
        display,
        SettingsStep {
            number: 4,
            of: WIZARD_STEPS,
            title: "Select Response Time",
            options: RESPONSE_CHOICES
                .iter()
                .enumerate()
                .map(|(i, &secs)| MenuOption {
                    key: digit(i + 1),
                    label: format!("{secs:.1}s per trial"),
                    detail: String::new(),
                    marked: secs == recommended.response_secs,
                })
                .collect(),
        },
    )?];

    let chosen = Preferences {
        n,
        grid_size,
        trial_count,
        response_secs,
    };
    let config = chosen.to_session_config()?;

    if let Err(err) = prefs.save(&chosen) {
        warn!(error = %err, "could not save preferences");
        display.push_warning(format!("Could not save settings: {err}"));
    }
    Ok(config)
}
