use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// High-score table, `~/.nback_scores.json` when HOME is known.
    pub fn scores_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".nback_scores.json"))
        } else {
            ProjectDirs::from("", "", "nback")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("scores.json"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "nback").map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("nback"))
        } else {
            ProjectDirs::from("", "", "nback").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
