//! Configuration file support for c863.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (C863_*)
//! 3. An explicit `--config <PATH>` file, which replaces the file search below
//! 4. Local config file (./c863.toml)
//! 5. Global config file (~/.config/c863/config.toml)

use c863::{LineConfig, TransceiverConfig};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local configuration file name.
const LOCAL_CONFIG: &str = "c863.toml";

/// Serial line settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineSection {
    /// Baud rate.
    pub baud: Option<u32>,
    /// Per-read idle timeout in milliseconds.
    pub idle_timeout_ms: Option<u64>,
}

/// Reply polling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransceiverSection {
    /// Poll attempts per command.
    pub retries: Option<u32>,
    /// Sleep before each poll in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Deadline for a single read in milliseconds.
    pub watchdog_timeout_ms: Option<u64>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Serial line configuration.
    #[serde(default)]
    pub line: LineSection,
    /// Reply polling configuration.
    #[serde(default)]
    pub transceiver: TransceiverSection,
}

impl Config {
    /// Load configuration from the global and local files.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_from_file(&global_path) {
                debug!("Loaded global config from {}", global_path.display());
                config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        if let Some(local_config) = Self::load_from_file(Path::new(LOCAL_CONFIG)) {
            debug!("Loaded local config from {LOCAL_CONFIG}");
            config.merge(local_config);
        }

        config
    }

    /// Load configuration from a specific file path (--config flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Could not load config from {}, using defaults",
                path.display()
            );
            Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    None
                },
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "c863").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one; set values in `other` win.
    fn merge(&mut self, other: Self) {
        if other.line.baud.is_some() {
            self.line.baud = other.line.baud;
        }
        if other.line.idle_timeout_ms.is_some() {
            self.line.idle_timeout_ms = other.line.idle_timeout_ms;
        }

        if other.transceiver.retries.is_some() {
            self.transceiver.retries = other.transceiver.retries;
        }
        if other.transceiver.poll_interval_ms.is_some() {
            self.transceiver.poll_interval_ms = other.transceiver.poll_interval_ms;
        }
        if other.transceiver.watchdog_timeout_ms.is_some() {
            self.transceiver.watchdog_timeout_ms = other.transceiver.watchdog_timeout_ms;
        }
    }

    /// Line configuration, with `baud` from the command line taking priority.
    pub fn line_config(&self, baud: Option<u32>) -> LineConfig {
        let mut line = LineConfig::default();
        if let Some(baud) = baud.or(self.line.baud) {
            line.baud_rate = baud;
        }
        if let Some(ms) = self.line.idle_timeout_ms {
            line.idle_timeout = Duration::from_millis(ms);
        }
        line
    }

    /// Transceiver timing, falling back to the library defaults.
    pub fn transceiver_config(&self) -> TransceiverConfig {
        let mut transceiver = TransceiverConfig::default();
        if let Some(retries) = self.transceiver.retries {
            transceiver.retries = retries;
        }
        if let Some(ms) = self.transceiver.poll_interval_ms {
            transceiver.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.transceiver.watchdog_timeout_ms {
            transceiver.watchdog_timeout = Duration::from_millis(ms);
        }
        transceiver
    }
}
