use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{cursor, execute, terminal, tty::IsTty};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdin};
use std::process::ExitCode;
use tracing::{error, warn};

use nback::{
    app::App,
    config::{ConfigStore, FileConfigStore, Preferences, TRIAL_CHOICES},
    error::{AppError, AppResult},
    input::InputPoller,
    logging,
    runtime::{CrosstermKeySource, InterruptFlag, SystemClock},
    scores::FileScoreStore,
    sequence::SequenceGenerator,
    session::{ConfigError, SessionConfig, DEFAULT_POLL_INTERVAL},
    ui::TerminalDisplay,
};

/// dual n-back working memory trainer for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Dual N-Back Trainer: watch a dot move around a grid and press L, A or SPACE when its position, color or both match the one from N steps back. Passing any option starts a game right away; without options a menu is shown."
)]
pub struct Cli {
    /// n-back level (1-8)
    #[clap(short = 'n', long = "n-value", value_parser = clap::value_parser!(u8).range(1..=8))]
    n_value: Option<u8>,

    /// grid size (3-9)
    #[clap(short = 'g', long, value_parser = clap::value_parser!(u8).range(3..=9))]
    grid_size: Option<u8>,

    /// number of trials (20, 30, 40, 50, 60 or 80)
    #[clap(short = 't', long, value_parser = parse_trials)]
    trials: Option<usize>,

    /// seconds allowed for each response
    #[clap(short = 'd', long, value_parser = parse_seconds)]
    display_time: Option<f64>,
}

fn parse_trials(s: &str) -> Result<usize, String> {
    let trials: usize = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if TRIAL_CHOICES.contains(&trials) {
        Ok(trials)
    } else {
        Err(format!("trials must be one of {TRIAL_CHOICES:?}"))
    }
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err("display time must be a positive number of seconds".to_string())
    }
}

impl Cli {
    fn any_game_option(&self) -> bool {
        self.n_value.is_some()
            || self.grid_size.is_some()
            || self.trials.is_some()
            || self.display_time.is_some()
    }

    /// Settings for a game started straight from the command line, with
    /// anything not given taken from `prefs`. `None` means show the menu.
    fn session_config(&self, prefs: &Preferences) -> Result<Option<SessionConfig>, ConfigError> {
        if !self.any_game_option() {
            return Ok(None);
        }
        SessionConfig::from_secs(
            self.n_value.map_or(prefs.n, usize::from),
            self.grid_size.map_or(prefs.grid_size, usize::from),
            self.trials.unwrap_or(prefs.trial_count),
            self.display_time.unwrap_or(prefs.response_secs),
        )
        .map(Some)
    }
}

/// Alternate screen for the lifetime of the game. Raw mode is handled per
/// key read, so only the screen and cursor need restoring here.
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if terminal::is_raw_mode_enabled().unwrap_or(false) {
            let _ = terminal::disable_raw_mode();
        }
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        let _ = cmd.error(ErrorKind::Io, "stdin must be a tty").print();
        return ExitCode::FAILURE;
    }

    let _log = logging::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Interrupted) => {
            println!("Game interrupted. Goodbye!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "fatal error");
            eprintln!("Fatal error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let prefs = FileConfigStore::new();
    let direct = cli.session_config(&prefs.load())?;

    // Ctrl+C outside a key read arrives as SIGINT rather than a key press
    let interrupt = InterruptFlag::new();
    if let Err(err) = interrupt.install() {
        warn!(error = %err, "could not install the interrupt handler");
    }

    let _screen = ScreenGuard::enter()?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let poller = InputPoller::new(
        CrosstermKeySource::new(),
        SystemClock::new(),
        DEFAULT_POLL_INTERVAL,
    )
    .with_interrupt(interrupt);
    let mut app = App::new(
        poller,
        TerminalDisplay::new(terminal),
        Box::new(FileScoreStore::new()),
        Box::new(prefs),
    );

    match direct {
        Some(config) => {
            let source = SequenceGenerator::new(config.grid_size(), rand::thread_rng());
            app.run_session(config, source)?;
        }
        None => {
            app.run_menu(|config| SequenceGenerator::new(config.grid_size(), rand::thread_rng()))?
        }
    }
    Ok(())
}
