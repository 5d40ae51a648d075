//! tend configuration.
//!
//! Loaded from `~/.tend/config.toml`. Every key is optional; a missing
//! file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Context, DEFAULT_FOLLOWUP_INTERVAL, DEFAULT_REVIEW_INTERVAL, Energy};

/// tend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Where the database lives. Defaults to `~/.tend/`.
    pub data_dir: Option<PathBuf>,

    /// Review interval, in days, for new projects.
    pub default_review_interval: u32,

    /// Follow-up interval, in days, for new waiting-for items.
    pub default_followup_interval: u32,

    pub engage: EngageDefaults,
}

/// Situation assumed by `tend engage` when flags are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngageDefaults {
    pub contexts: Vec<Context>,
    pub energy: Energy,
    pub available_minutes: u32,
    /// How many ranked actions to show.
    pub limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_review_interval: DEFAULT_REVIEW_INTERVAL,
            default_followup_interval: DEFAULT_FOLLOWUP_INTERVAL,
            engage: EngageDefaults::default(),
        }
    }
}

impl Default for EngageDefaults {
    fn default() -> Self {
        Self {
            contexts: vec![Context::Computer],
            energy: Energy::Medium,
            available_minutes: 30,
            limit: 3,
        }
    }
}

impl Config {
    /// Load config from `~/.tend/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        config
            .validate()
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        Ok(config)
    }

    /// The config file path: `~/.tend/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tend").join("config.toml"))
    }

    fn validate(&self) -> Result<(), String> {
        if self.default_review_interval == 0 {
            return Err("default-review-interval must be at least 1 day".into());
        }
        if self.default_followup_interval == 0 {
            return Err("default-followup-interval must be at least 1 day".into());
        }
        if self.engage.available_minutes == 0 {
            return Err("engage.available-minutes must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "default-review-interval = 14\n\n[engage]\ncontexts = [\"@calls\", \"@home\"]\nenergy = 3\n",
        );
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.default_review_interval, 14);
        assert_eq!(config.default_followup_interval, DEFAULT_FOLLOWUP_INTERVAL);
        assert_eq!(config.engage.contexts, vec![Context::Calls, Context::Home]);
        assert_eq!(config.engage.energy, Energy::High);
        assert_eq!(config.engage.available_minutes, 30);
        assert_eq!(config.engage.limit, 3);
    }

    #[test]
    fn zero_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "default-followup-interval = 0\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("default-followup-interval"));
    }

    #[test]
    fn unknown_context_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[engage]\ncontexts = [\"@garage\"]\n");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "default-identity = \"someone\"\n");
        assert!(Config::load_from(&path).is_err());
    }
}
