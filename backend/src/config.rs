//! User settings loaded from TOML.

use crate::types::ProcError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "PROCMON_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Time between SIGTERM and SIGKILL.
    #[serde(default = "default_terminate_grace_ms")]
    pub terminate_grace_ms: u64,
    #[serde(default = "default_true")]
    pub suspend_resume: bool,
    #[serde(default = "default_true")]
    pub verify_identity: bool,
    #[serde(default)]
    pub expand_to_subtree: bool,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub export_bom: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            terminate_grace_ms: default_terminate_grace_ms(),
            suspend_resume: true,
            verify_identity: true,
            expand_to_subtree: false,
            export_dir: None,
            export_bom: true,
        }
    }
}

impl Settings {
    /// `$PROCMON_CONFIG`, else `<config dir>/procmon/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::config_dir().map(|dir| dir.join("procmon").join("config.toml")),
        }
    }

    /// Load from the default location; a missing file gives defaults.
    pub fn load() -> Result<Self, ProcError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ProcError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ProcError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ProcError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, ProcError> {
        toml::from_str(content).map_err(|e| ProcError::Config(e.to_string()))
    }

    pub fn terminate_grace(&self) -> Duration {
        Duration::from_millis(self.terminate_grace_ms)
    }

    /// Configured export directory, else the downloads directory, else the
    /// working directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_terminate_grace_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}
