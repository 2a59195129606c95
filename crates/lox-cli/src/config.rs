//! CLI configuration via environment variables
//!
//! Lox uses environment variables for optional configuration.
//! `LOX_DIAGNOSTICS` is read by clap together with `--diagnostics`.

use clap::ValueEnum;
use std::env;
use std::path::PathBuf;

/// How diagnostics are written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DiagnosticStyle {
    /// `[line N] Error at 'x': message`
    #[default]
    Classic,
    /// Header, location and a caret under the source line
    Human,
    /// One JSON object per line
    Json,
}

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Disable colored output (LOX_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
    /// Custom history file path (LOX_HISTORY_FILE=/path/to/file)
    pub history_file: Option<PathBuf>,
    /// Disable history by default (LOX_NO_HISTORY=1)
    pub no_history: bool,
    /// Tracing filter directives (LOX_LOG=debug, LOX_LOG=lox_runtime=trace)
    pub log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            no_color: lookup("LOX_NO_COLOR").is_some() || lookup("NO_COLOR").is_some(),
            history_file: lookup("LOX_HISTORY_FILE").map(PathBuf::from),
            no_history: lookup("LOX_NO_HISTORY").is_some(),
            log: lookup("LOX_LOG").filter(|v| !v.is_empty()),
        }
    }

    /// Get the history file path
    ///
    /// Returns:
    /// 1. LOX_HISTORY_FILE if set
    /// 2. ~/.lox/history if home directory exists
    /// 3. None otherwise
    pub fn get_history_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.history_file {
            return Some(path.clone());
        }
        dirs::home_dir().map(|home| home.join(".lox").join("history"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
