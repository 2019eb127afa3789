//! Application configuration loaded once at startup from a TOML file.

use anyhow::{bail, Context, Result};
use midihue_control::color::DEFAULT_BITS_PER_CHANNEL;
use midihue_control::effect::{default_mapping, BindingConfig, LightConfig};
use midihue_control::hue::stream::{SessionSettings, STREAM_PORT};
use midihue_control::hue::{HueConfig, DEFAULT_TICK_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location used when `--config` is not given
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("midihue")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hue: HueConfig,
    pub stream: StreamConfig,
    pub log: LogConfig,
    pub midi: MidiConfig,
    pub lights: Vec<LightConfig>,
    pub bindings: Vec<BindingConfig>,
}

impl AppConfig {
    /// Load from `path`, or from the default location if it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields the built-in configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream.tick_interval_ms == 0 {
            bail!("stream.tick_interval_ms must be greater than zero");
        }
        if self.stream.handshake_attempts == 0 {
            bail!("stream.handshake_attempts must be at least 1");
        }
        if self.lights.is_empty() != self.bindings.is_empty() {
            bail!("[[lights]] and [[bindings]] must be configured together");
        }
        Ok(())
    }

    /// Configured lights and bindings, or the built-in mapping when neither
    /// is configured.
    pub fn mapping(&self) -> (Vec<LightConfig>, Vec<BindingConfig>) {
        if self.lights.is_empty() && self.bindings.is_empty() {
            default_mapping()
        } else {
            (self.lights.clone(), self.bindings.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub tick_interval_ms: u64,
    pub handshake_attempts: u32,
    pub handshake_timeout_ms: u64,
    pub bits_per_channel: u8,
    pub port: u16,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            handshake_attempts: 3,
            handshake_timeout_ms: 1000,
            bits_per_channel: DEFAULT_BITS_PER_CHANNEL,
            port: STREAM_PORT,
        }
    }
}

impl StreamConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            handshake_attempts: self.handshake_attempts,
            attempt_timeout: Duration::from_millis(self.handshake_timeout_ms),
            port: self.port,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring of the input port name; first available port when unset
    pub input_name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level (trace/debug/info/warn/error); `RUST_LOG` overrides
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("midihue")
                .join("logs"),
        }
    }
}

impl LogConfig {
    /// Configured level, falling back to INFO if it does not parse
    pub fn parse_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }

    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir.join("midihue.log")
    }

    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}
