use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Name of the launcher's directory under the platform config directory.
pub const APP_DIR_NAME: &str = "eremetic";

pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

/// `~/.config/eremetic` on most platforms, `./eremetic` when no config
/// directory is known.
pub fn app_config_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}
