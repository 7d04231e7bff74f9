use crate::error::config::ConfigError;
use crate::error::link::LinkError;
use crate::link::{Endpoint, LineTerminator, MonitorSettings};
use crate::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// What the Enter key sends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SendMode {
    /// The text typed by the user, after input validation.
    #[default]
    TextInput,
    /// Always [`InputConfig::fixed_string`].
    FixedString,
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Link timing in milliseconds, mirrored into [`MonitorSettings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkConfig {
    #[serde(default)]
    pub terminator: LineTerminator,
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
    #[serde(default = "default_reconnect_retry_ms")]
    pub reconnect_retry_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_suspend_poll_ms")]
    pub suspend_poll_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            terminator: LineTerminator::default(),
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            reconnect_retry_ms: default_reconnect_retry_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            suspend_poll_ms: default_suspend_poll_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default)]
    pub send_mode: SendMode,
    #[serde(default = "default_fixed_string")]
    pub fixed_string: String,
    #[serde(default = "default_reset_string")]
    pub reset_string: String,
    #[serde(default = "default_reset_enabled")]
    pub reset_enabled: bool,
    /// Second quick-send string, off by default.
    #[serde(default)]
    pub space_string: String,
    #[serde(default)]
    pub space_enabled: bool,
    /// Typed text must contain this, when set.
    #[serde(default)]
    pub required_substring: Option<String>,
    /// Typed text must be exactly this long, when set.
    #[serde(default)]
    pub required_length: Option<usize>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            send_mode: SendMode::default(),
            fixed_string: default_fixed_string(),
            reset_string: default_reset_string(),
            reset_enabled: default_reset_enabled(),
            space_string: String::new(),
            space_enabled: false,
            required_substring: None,
            required_length: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub input: InputConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            link: LinkConfig::default(),
            input: InputConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}
fn default_probe_interval_ms() -> u64 {
    1000
}
fn default_probe_timeout_ms() -> u64 {
    300
}
fn default_reconnect_backoff_ms() -> u64 {
    2000
}
fn default_reconnect_retry_ms() -> u64 {
    1000
}
fn default_read_timeout_ms() -> u64 {
    100
}
fn default_suspend_poll_ms() -> u64 {
    2000
}
fn default_fixed_string() -> String {
    "CHECK".to_string()
}
fn default_reset_string() -> String {
    "RESET".to_string()
}
fn default_reset_enabled() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BridgeConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Load config, writing the defaults first when no file exists yet.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) and [`save`](Self::save).
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        if config_dir.join(CONFIG_FILE_NAME).exists() {
            return Self::load(config_dir);
        }

        let config = Self::default();
        config.save(config_dir)?;
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// Uses temp file + rename so a crash never leaves a truncated file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if let Err(e) = self.endpoint() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: e.to_string(),
            });
        }

        let timings = [
            ("probe_interval_ms", self.link.probe_interval_ms),
            ("probe_timeout_ms", self.link.probe_timeout_ms),
            ("reconnect_backoff_ms", self.link.reconnect_backoff_ms),
            ("reconnect_retry_ms", self.link.reconnect_retry_ms),
            ("read_timeout_ms", self.link.read_timeout_ms),
            ("suspend_poll_ms", self.link.suspend_poll_ms),
        ];

        if let Some((name, _)) = timings.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("{name} must be greater than zero"),
            });
        }

        if self.input.send_mode == SendMode::FixedString && self.input.fixed_string.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "fixed_string cannot be empty in FixedString mode".to_string(),
            });
        }

        Ok(())
    }

    /// Server endpoint described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Endpoint`] for a blank host or port 0.
    pub fn endpoint(&self) -> Result<Endpoint, LinkError> {
        Endpoint::new(self.server.host.clone(), self.server.port)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings::new()
            .terminator(self.link.terminator)
            .probe_interval(Duration::from_millis(self.link.probe_interval_ms))
            .probe_timeout(Duration::from_millis(self.link.probe_timeout_ms))
            .reconnect_backoff(Duration::from_millis(self.link.reconnect_backoff_ms))
            .reconnect_retry_delay(Duration::from_millis(self.link.reconnect_retry_ms))
            .read_timeout(Duration::from_millis(self.link.read_timeout_ms))
            .suspend_poll(Duration::from_millis(self.link.suspend_poll_ms))
    }
}
