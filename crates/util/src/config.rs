//! Launcher configuration.
//!
//! Settings come from, in order of precedence: an explicit override (the
//! `--base-url` flag), environment variables, the YAML config file
//! (`~/.config/eremetic/config.yaml` unless `EREMETIC_CONFIG_PATH` points
//! elsewhere), and built-in defaults.
//!
//! ```yaml
//! base_url: http://scheduler.internal:8000
//! url_prefix: /eremetic
//! timeout_secs: 10
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::path_processing::{app_config_dir, expand_tilde};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "EREMETIC_CONFIG_PATH";
/// Environment variable overriding the scheduler base URL.
pub const URL_ENV: &str = "EREMETIC_URL";
/// Environment variable overriding the URL prefix.
pub const URL_PREFIX_ENV: &str = "EREMETIC_URL_PREFIX";

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const LOG_FILE_NAME: &str = "eremetic.log";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub url_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Fully resolved settings for talking to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub base_url: String,
    pub url_prefix: Option<String>,
    pub timeout: Duration,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            url_prefix: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl LauncherConfig {
    /// Resolve settings from the environment and the config file.
    ///
    /// A missing config file means defaults. A file that does not parse is
    /// logged and ignored; only unreadable files are errors.
    pub fn load(base_url_override: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_path();
        let file = read_config_file(&path)?;
        Ok(Self::resolve(
            file,
            base_url_override,
            non_empty_var(URL_ENV),
            non_empty_var(URL_PREFIX_ENV),
        ))
    }

    fn resolve(
        file: FileConfig,
        base_url_override: Option<&str>,
        env_url: Option<String>,
        env_prefix: Option<String>,
    ) -> Self {
        let base_url = base_url_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or(env_url)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let url_prefix = env_prefix
            .or(file.url_prefix)
            .filter(|prefix| !prefix.trim().is_empty());
        let timeout = Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1));
        debug!(%base_url, ?url_prefix, ?timeout, "resolved launcher config");
        Self {
            base_url,
            url_prefix,
            timeout,
        }
    }
}

/// Location of the YAML config file.
pub fn config_path() -> PathBuf {
    match non_empty_var(CONFIG_PATH_ENV) {
        Some(path) => expand_tilde(&path),
        None => app_config_dir().join(CONFIG_FILE_NAME),
    }
}

/// File receiving logs while the terminal UI owns the screen.
pub fn log_file_path() -> PathBuf {
    app_config_dir().join(LOG_FILE_NAME)
}

fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => match FileConfig::parse(&text) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(path = %path.display(), %error, "Failed to parse config file; using defaults");
                Ok(FileConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_config_file<F: FnOnce()>(contents: &str, url: Option<&str>, prefix: Option<&str>, test: F) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();
        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path.as_str())),
                (URL_ENV, url),
                (URL_PREFIX_ENV, prefix),
            ],
            test,
        );
    }

    #[test]
    fn defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(missing.to_string_lossy().to_string())),
                (URL_ENV, None),
                (URL_PREFIX_ENV, None),
            ],
            || {
                assert_eq!(LauncherConfig::load(None).unwrap(), LauncherConfig::default());
            },
        );
    }

    #[test]
    fn file_values_are_used() {
        with_config_file("base_url: http://sched:9000\nurl_prefix: /eremetic\ntimeout_secs: 5\n", None, None, || {
            let config = LauncherConfig::load(None).unwrap();
            assert_eq!(config.base_url, "http://sched:9000");
            assert_eq!(config.url_prefix.as_deref(), Some("/eremetic"));
            assert_eq!(config.timeout, Duration::from_secs(5));
        });
    }

    #[test]
    fn env_beats_file_and_flag_beats_env() {
        with_config_file("base_url: http://file:1\n", Some("http://env:2"), Some("/env"), || {
            let config = LauncherConfig::load(None).unwrap();
            assert_eq!(config.base_url, "http://env:2");
            assert_eq!(config.url_prefix.as_deref(), Some("/env"));

            let config = LauncherConfig::load(Some("http://flag:3")).unwrap();
            assert_eq!(config.base_url, "http://flag:3");
        });
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        with_config_file("base_url: [not, a, string\n", None, None, || {
            assert_eq!(LauncherConfig::load(None).unwrap(), LauncherConfig::default());
        });
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(FileConfig::parse("  \n").unwrap(), FileConfig::default());
    }
}
