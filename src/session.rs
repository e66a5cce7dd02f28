use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_FEEDBACK_HOLD: Duration = Duration::from_millis(600);
pub const DEFAULT_TRANSITION_HOLD: Duration = Duration::from_millis(1500);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("n must be at least 1")]
    InvalidN,
    #[error("grid size must be at least 1")]
    InvalidGridSize,
    #[error("response window must be positive")]
    InvalidResponseWindow,
}

/// Fixed-duration waits and the input polling granularity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// How long each memorization item stays on screen
    pub memorize_hold: Duration,
    /// Pause after per-trial feedback
    pub feedback_hold: Duration,
    /// "Memory phase complete" screen
    pub transition_hold: Duration,
    pub poll_interval: Duration,
}

impl Timing {
    pub fn for_window(response_window: Duration) -> Self {
        Self {
            memorize_hold: response_window,
            feedback_hold: DEFAULT_FEEDBACK_HOLD,
            transition_hold: DEFAULT_TRANSITION_HOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Settings fixed for the lifetime of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    n: usize,
    grid_size: usize,
    trial_count: usize,
    response_window: Duration,
    timing: Timing,
}

impl SessionConfig {
    pub fn new(
        n: usize,
        grid_size: usize,
        trial_count: usize,
        response_window: Duration,
    ) -> Result<Self, ConfigError> {
        if n < 1 {
            return Err(ConfigError::InvalidN);
        }
        if grid_size < 1 {
            return Err(ConfigError::InvalidGridSize);
        }
        if response_window.is_zero() {
            return Err(ConfigError::InvalidResponseWindow);
        }
        Ok(Self {
            n,
            grid_size,
            trial_count,
            response_window,
            timing: Timing::for_window(response_window),
        })
    }

    /// Same as `new`, with the response window given in (possibly
    /// fractional) seconds as on the command line.
    pub fn from_secs(
        n: usize,
        grid_size: usize,
        trial_count: usize,
        response_secs: f64,
    ) -> Result<Self, ConfigError> {
        let window = Duration::try_from_secs_f64(response_secs)
            .map_err(|_| ConfigError::InvalidResponseWindow)?;
        Self::new(n, grid_size, trial_count, window)
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn response_window(&self) -> Duration {
        self.response_window
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// High-score table key for this level, e.g. `DN2_G8`.
    pub fn score_key(&self) -> String {
        crate::scores::score_key(self.n, self.grid_size)
    }
}

/// Mutable counters owned by the trial loop for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub score: u32,
    /// Matching events seen so far, whether or not the player responded
    pub opportunities: u32,
    /// Zero-based index of the current active trial
    pub current_trial_index: usize,
    pub running: bool,
}

impl SessionState {
    pub fn reset(&mut self) {
        *self = SessionState {
            running: true,
            ..SessionState::default()
        };
    }

    /// Score as a percentage of opportunities, None before the first one.
    pub fn accuracy(&self) -> Option<f64> {
        match self.opportunities {
            0 => None,
            total => Some(self.score as f64 / total as f64 * 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Outstanding,
    Excellent,
    GoodJob,
    KeepPracticing,
    TryAgain,
}

impl Rating {
    pub fn from_accuracy(accuracy: f64) -> Self {
        match accuracy {
            a if a >= 90.0 => Rating::Outstanding,
            a if a >= 75.0 => Rating::Excellent,
            a if a >= 60.0 => Rating::GoodJob,
            a if a >= 40.0 => Rating::KeepPracticing,
            _ => Rating::TryAgain,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Outstanding => "OUTSTANDING!",
            Rating::Excellent => "EXCELLENT!",
            Rating::GoodJob => "GOOD JOB!",
            Rating::KeepPracticing => "KEEP PRACTICING!",
            Rating::TryAgain => "TRY AGAIN!",
        }
    }

    pub fn stars(&self) -> usize {
        match self {
            Rating::Outstanding => 5,
            Rating::Excellent => 4,
            Rating::GoodJob => 3,
            Rating::KeepPracticing => 2,
            Rating::TryAgain => 1,
        }
    }
}

/// Final figures of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub n: usize,
    pub grid_size: usize,
    pub score: u32,
    pub opportunities: u32,
    pub accuracy: Option<f64>,
    pub new_record: bool,
}

impl SessionSummary {
    pub fn rating(&self) -> Option<Rating> {
        self.accuracy.map(Rating::from_accuracy)
    }
}
