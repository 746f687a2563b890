//! # Configuration Module
//!
//! Handles loading and validating the bridge configuration file.
//!
//! The file is a handful of `Key=value` lines, which is valid TOML, so it is
//! parsed with `toml` like any other config:
//!
//! ```text
//! Threshold=0.75
//! Mode="analog"
//! Host="127.0.0.1"
//! Port=9000
//! ```
//!
//! Only `Threshold` is written when the file is first created. Every other
//! key is optional.
//!
//! [`Config::load`] is strict. [`Config::load_or_create`] keeps whatever it
//! can from a file that is not clean TOML: the `Threshold=` line is always
//! read on its own, so a note line or a bad optional key does not cost the
//! user their threshold.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::controller::shaper::ShapingPolicy;
use crate::error::{BridgeError, Result};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "InputFixer_config.txt";

/// Contents written when the config file does not exist yet
pub const DEFAULT_CONFIG_CONTENTS: &str = "Threshold=0.75\n";

/// Stick deflection that maps to full-scale output
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(rename = "Threshold", default = "default_threshold")]
    pub threshold: f32,

    #[serde(rename = "Mode", default)]
    pub mode: ShapingPolicy,

    #[serde(rename = "Host", default = "default_host")]
    pub host: String,

    #[serde(rename = "Port", default = "default_port")]
    pub port: u16,

    /// Substring of the input device name to bind to. Empty = match by role.
    #[serde(rename = "DeviceName", default)]
    pub device_name: String,
}

// Default value functions
fn default_threshold() -> f32 { DEFAULT_THRESHOLD }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 9000 }

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            mode: ShapingPolicy::default(),
            host: default_host(),
            port: default_port(),
            device_name: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use locomotion_bridge::config::Config;
    ///
    /// let config = Config::load("InputFixer_config.txt")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Best-effort read of a file that failed [`Config::parse`]
    ///
    /// `Threshold` comes from the first `Threshold=<float>` line holding a
    /// positive finite value. The optional keys are taken one by one when the
    /// file is still valid TOML; any key that does not check out keeps its
    /// default.
    pub fn recover(contents: &str) -> Self {
        let mut config = Self::default();

        if let Some(threshold) = scan_threshold(contents) {
            config.threshold = threshold;
        }

        let Ok(table) = contents.parse::<toml::Table>() else {
            return config;
        };

        if let Some(mode) = table
            .get("Mode")
            .and_then(|v| v.clone().try_into::<ShapingPolicy>().ok())
        {
            config.mode = mode;
        }
        if let Some(host) = table.get("Host").and_then(|v| v.as_str()) {
            if !host.is_empty() {
                config.host = host.to_string();
            }
        }
        if let Some(port) = table
            .get("Port")
            .and_then(|v| v.as_integer())
            .and_then(|p| u16::try_from(p).ok())
        {
            if port != 0 {
                config.port = port;
            }
        }
        if let Some(name) = table.get("DeviceName").and_then(|v| v.as_str()) {
            config.device_name = name.to_string();
        }

        config
    }

    /// Load configuration, creating the file or falling back to defaults
    ///
    /// - Missing file: written with [`DEFAULT_CONFIG_CONTENTS`], defaults returned.
    /// - Unreadable file: defaults returned.
    /// - Malformed or invalid file: left untouched, [`Config::recover`] keeps
    ///   the keys it can still read.
    ///
    /// Never fails; every fallback is logged.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!(
                "Config file not found, creating {} with defaults. Edit Threshold there to tune activation.",
                path.display()
            );
            if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENTS) {
                warn!("Failed to create config file {}: {}", path.display(), e);
            }
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Error reading config file {}: {}. Using default threshold {}",
                    path.display(),
                    e,
                    DEFAULT_THRESHOLD
                );
                return Self::default();
            }
        };

        let config = match Self::parse(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Config file {} has problems: {}. Keeping the values that can be read",
                    path.display(),
                    e
                );
                if scan_threshold(&contents).is_none() {
                    warn!("No valid Threshold in {}, using default {}", path.display(), DEFAULT_THRESHOLD);
                }
                Self::recover(&contents)
            }
        };

        info!("Threshold value loaded: {}", config.threshold);
        config
    }

    /// Target address of the OSC receiver, `host:port`
    pub fn osc_target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(BridgeError::InvalidConfig(format!(
                "Threshold must be a positive number, got {}",
                self.threshold
            )));
        }

        if self.host.is_empty() {
            return Err(BridgeError::InvalidConfig("Host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(BridgeError::InvalidConfig("Port must be between 1 and 65535".to_string()));
        }

        Ok(())
    }
}

/// First usable `Threshold=<float>` line, ignoring every other line
fn scan_threshold(contents: &str) -> Option<f32> {
    contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| key.trim() == "Threshold")
        .filter_map(|(_, value)| value.trim().parse::<f32>().ok())
        .find(|t| t.is_finite() && *t > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, 0.75);
        assert_eq!(config.mode, ShapingPolicy::Analog);
        assert_eq!(config.osc_target(), "127.0.0.1:9000");
        assert!(config.device_name.is_empty());
    }

    #[test]
    fn test_missing_file_is_created_with_default_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_PATH);

        let config = Config::load_or_create(&path);

        assert_eq!(config.threshold, 0.75);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Threshold=0.75"));

        // The created file parses back to the same threshold
        assert_eq!(Config::load(&path).unwrap().threshold, 0.75);
    }

    #[test]
    fn test_threshold_loaded_from_file() {
        let file = write_config("Threshold=0.5\n");
        let config = Config::load_or_create(file.path());
        assert_eq!(config.threshold, 0.5);
    }

    #[test]
    fn test_integer_threshold_accepted() {
        let file = write_config("Threshold=1\n");
        assert_eq!(Config::load(file.path()).unwrap().threshold, 1.0);
    }

    #[test]
    fn test_unparsable_threshold_falls_back_without_rewriting() {
        let file = write_config("Threshold=abc\n");

        assert!(Config::load(file.path()).is_err());
        let config = Config::load_or_create(file.path());
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);

        // Malformed file is left as the user wrote it
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "Threshold=abc\n");
    }

    #[test]
    fn test_threshold_survives_stray_note_line() {
        let file = write_config(
            "Threshold=0.5\nYou can edit the Activation-threshold within this file.\n",
        );

        assert!(Config::load(file.path()).is_err());
        assert_eq!(Config::load_or_create(file.path()).threshold, 0.5);
    }

    #[test]
    fn test_threshold_survives_bad_mode() {
        let file = write_config("Threshold=0.5\nMode=\"turbo\"\nPort=9002\n");

        let config = Config::load_or_create(file.path());
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.mode, ShapingPolicy::Analog);
        assert_eq!(config.port, 9002);
    }

    #[test]
    fn test_leading_dot_threshold_accepted() {
        let file = write_config("Threshold=.5\n");
        assert_eq!(Config::load_or_create(file.path()).threshold, 0.5);
    }

    #[test]
    fn test_recover_skips_unusable_keys() {
        let config = Config::recover(
            "Threshold=0.6\nMode=\"digital\"\nHost=\"\"\nPort=70000\nDeviceName=\"Joy-Con (L)\"\n",
        );

        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.mode, ShapingPolicy::Digital);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.device_name, "Joy-Con (L)");
    }

    #[test]
    fn test_first_usable_threshold_line_wins() {
        assert_eq!(Config::recover("Threshold=abc\nThreshold=0.6\n").threshold, 0.6);
        assert_eq!(Config::recover(" Threshold = 0.4 \nThreshold=0.9\n").threshold, 0.4);
    }

    #[test]
    fn test_recover_ignores_non_positive_threshold_lines() {
        assert_eq!(Config::recover("Threshold=0\n").threshold, DEFAULT_THRESHOLD);
        assert_eq!(Config::recover("Threshold=-1\nnote\n").threshold, DEFAULT_THRESHOLD);
        assert_eq!(Config::recover("Threshold=inf\n").threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let file = write_config("this is not a config file");
        assert_eq!(Config::load_or_create(file.path()), Config::default());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let file = write_config("Threshold=0\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(BridgeError::InvalidConfig(_))
        ));
        assert_eq!(Config::load_or_create(file.path()).threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let file = write_config("Threshold=-0.5\n");
        assert_eq!(Config::load_or_create(file.path()).threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let file = write_config("Threshold=inf\n");
        assert!(Config::load(file.path()).is_err());

        let file = write_config("Threshold=nan\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        assert_eq!(Config::load(file.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_optional_keys() {
        let file = write_config(
            "Threshold=0.6\nMode=\"digital\"\nHost=\"192.168.1.20\"\nPort=9001\nDeviceName=\"Joy-Con (L)\"\n",
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.mode, ShapingPolicy::Digital);
        assert_eq!(config.osc_target(), "192.168.1.20:9001");
        assert_eq!(config.device_name, "Joy-Con (L)");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let file = write_config("Mode=\"turbo\"\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = Config::default();
        config.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_threshold(), 0.75);
        assert_eq!(default_host(), "127.0.0.1");
        assert_eq!(default_port(), 9000);
        assert_eq!(DEFAULT_CONFIG_CONTENTS.trim(), "Threshold=0.75");
    }
}
