//! # Settings
//!
//! Evaluated once per process, later sources winning:
//!
//! 1. built-in defaults
//! 2. a JSON file: `$BRIGID_CONFIG`, else `config.json` in the platform config dir
//! 3. `.env` in the working directory (loaded into the environment by `dotenv`)
//! 4. environment variables `BRIGID_BASE_URL`, `BRIGID_API_TOKEN`, `BRIGID_TIMEOUT`,
//!    `BRIGID_TEMPLATE_DIR` and `DEBUG`
//!
//! Variables already present in the environment are not overwritten by `.env`.

use crate::error::{BrigidError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://brigid-prod.api.caltech.edu/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILENAME: &str = "config.json";
const CONFIG_PATH_VAR: &str = "BRIGID_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub debug: bool,
    /// Directory whose `*.tmp` files replace the built-in detail templates.
    pub template_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
            template_dir: None,
        }
    }
}

impl Settings {
    /// Full evaluation against the real process environment.
    pub fn load() -> Result<Self> {
        let mut settings = match config_path() {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        check_dotenv(dotenv::dotenv())?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Reads `path`, or returns defaults if it does not exist.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            BrigidError::Settings(format!("{}: {}", path.display(), e))
        })
    }

    /// Overlays values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BRIGID_BASE_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup("BRIGID_API_TOKEN") {
            self.api_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(raw) = lookup("BRIGID_TIMEOUT") {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                BrigidError::Settings(format!(
                    "BRIGID_TIMEOUT must be a whole number of seconds, got \"{}\"",
                    raw
                ))
            })?;
        }
        if let Some(dir) = lookup("BRIGID_TEMPLATE_DIR").filter(|v| !v.is_empty()) {
            self.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("DEBUG") {
            self.debug = parse_bool(&raw).ok_or_else(|| {
                BrigidError::Settings(format!("DEBUG must be true or false, got \"{}\"", raw))
            })?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A copy safe to print: only the last four characters of a long token survive.
    pub fn masked(&self) -> Self {
        let api_token = self.api_token.as_ref().map(|token| {
            let chars: Vec<char> = token.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            if chars.len() > 8 {
                format!("****{}", tail)
            } else {
                "****".to_string()
            }
        });
        Self {
            api_token,
            ..self.clone()
        }
    }
}

/// `$BRIGID_CONFIG`, else `config.json` under the platform config dir.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("edu", "caltech", "brigid")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// A missing `.env` is normal; an unreadable or malformed one is not.
fn check_dotenv<T>(outcome: dotenv::Result<T>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(BrigidError::Settings(format!(".env: {}", e))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
