use thiserror::Error;

use crate::session::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Ctrl+C was read while the terminal was in raw mode.
    #[error("interrupted")]
    Interrupted,

    #[error("invalid session settings: {0}")]
    Config(#[from] ConfigError),
}

pub type AppResult<T> = Result<T, AppError>;
