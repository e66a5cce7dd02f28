use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::{ConfigError, SessionConfig};

pub const N_CHOICES: std::ops::RangeInclusive<usize> = 1..=8;
pub const GRID_CHOICES: std::ops::RangeInclusive<usize> = 3..=9;
pub const TRIAL_CHOICES: [usize; 6] = [20, 30, 40, 50, 60, 80];
pub const RESPONSE_CHOICES: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// Last-used session settings, remembered between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub n: usize,
    pub grid_size: usize,
    pub trial_count: usize,
    pub response_secs: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            n: 2,
            grid_size: 8,
            trial_count: 20,
            response_secs: 2.0,
        }
    }
}

impl Preferences {
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        SessionConfig::from_secs(self.n, self.grid_size, self.trial_count, self.response_secs)
    }
}

impl From<&SessionConfig> for Preferences {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            n: cfg.n(),
            grid_size: cfg.grid_size(),
            trial_count: cfg.trial_count(),
            response_secs: cfg.response_window().as_secs_f64(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Preferences;
    fn save(&self, prefs: &Preferences) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("nback_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Preferences {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(prefs) = serde_json::from_slice::<Preferences>(&bytes) {
                return prefs;
            }
        }
        Preferences::default()
    }

    fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(prefs).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// Keeps preferences in memory only.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    prefs: std::cell::RefCell<Option<Preferences>>,
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Preferences {
        self.prefs.borrow().clone().unwrap_or_default()
    }

    fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        *self.prefs.borrow_mut() = Some(prefs.clone());
        Ok(())
    }
}
