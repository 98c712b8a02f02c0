//! Configuration for wconsole.
//!
//! Loaded from `~/.wconsole/config.toml`; a missing or malformed file falls
//! back to the defaults.
//!
//! ```toml
//! # tracing filter used when RUST_LOG is not set
//! log_level = "info"
//!
//! [console]
//! # "preserve" adds window-resize notifications to the original input mode,
//! # "overwrite" replaces the mode with that flag alone
//! mode_policy = "preserve"
//! hide_cursor = true
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::console::{ModePolicy, NegotiateOptions};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive
    pub log_level: String,
    /// Negotiation settings
    pub console: ConsoleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            console: ConsoleConfig::default(),
        }
    }
}

/// Console negotiation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub mode_policy: ModePolicy,
    pub hide_cursor: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            mode_policy: ModePolicy::Preserve,
            hide_cursor: true,
        }
    }
}

impl ConsoleConfig {
    pub fn options(&self) -> NegotiateOptions {
        NegotiateOptions {
            mode_policy: self.mode_policy,
            hide_cursor: self.hide_cursor,
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// A malformed file yields the defaults plus the parse error, which the
    /// caller logs once logging is up.
    pub fn load() -> (Self, Option<toml::de::Error>) {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    return Self::parse_or_default(&content);
                }
            }
        }
        (Self::default(), None)
    }

    /// Parse TOML
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn parse_or_default(content: &str) -> (Self, Option<toml::de::Error>) {
        match Self::parse(content) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Directory holding the config file and the log
    pub fn dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".wconsole"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::dir().map(|dir| dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            log_level = "debug"

            [console]
            mode_policy = "overwrite"
            hide_cursor = false
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.console.mode_policy, ModePolicy::Overwrite);
        assert!(!config.console.hide_cursor);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::parse("[console]\nhide_cursor = false\n").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.console.mode_policy, ModePolicy::Preserve);
        assert!(!config.console.hide_cursor);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let (config, error) =
            Config::parse_or_default("[console]\nmode_policy = \"sideways\"\n");
        assert_eq!(config, Config::default());
        let error = error.unwrap().to_string();
        assert!(error.contains("sideways"), "{error}");
    }

    #[test]
    fn test_valid_config_has_no_error() {
        let (config, error) = Config::parse_or_default("log_level = \"warn\"\n");
        assert!(error.is_none());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_options_from_config() {
        let options = ConsoleConfig::default().options();
        assert_eq!(options, NegotiateOptions::default());
    }
}
