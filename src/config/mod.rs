//! Configuration management for tcptune.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::advisor::AdvisorConfig;
use crate::error::{Error, Result};
use crate::tuning::DefaultPolicy;
use crate::types::{NetworkInput, DEFAULT_BANDWIDTH_MBPS, DEFAULT_RTT_MS};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Link profile used when no input is given on the command line.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Calculation settings.
    #[serde(default)]
    pub tuning: TuningConfig,

    /// Advisory service configuration.
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        NetworkInput::new(self.profile.bandwidth_mbps, self.profile.rtt_ms)
            .map_err(|e| Error::InvalidConfig(format!("profile: {e}")))?;

        if self.advisor.timeout.is_zero() {
            return Err(Error::InvalidConfig("advisor timeout must be positive".into()));
        }

        if self.advisor.max_words == 0 {
            return Err(Error::InvalidConfig("advisor max_words must be positive".into()));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::InvalidConfig(format!(
                "unknown log format: {}",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Get default config path.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("io", "tcptune", "tcptune").map_or_else(
            || PathBuf::from("tcptune.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }

    /// Create example configuration.
    pub fn example() -> Self {
        Self {
            profile: ProfileConfig {
                bandwidth_mbps: 10_000.0,
                rtt_ms: 80.0,
            },
            advisor: AdvisorConfig {
                api_key: Some("<your API key>".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Default link profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Bandwidth in Mbps.
    #[serde(default = "default_bandwidth")]
    pub bandwidth_mbps: f64,

    /// Round-trip time in ms.
    #[serde(default = "default_rtt")]
    pub rtt_ms: f64,
}

fn default_bandwidth() -> f64 {
    DEFAULT_BANDWIDTH_MBPS
}
fn default_rtt() -> f64 {
    DEFAULT_RTT_MS
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            bandwidth_mbps: default_bandwidth(),
            rtt_ms: default_rtt(),
        }
    }
}

impl ProfileConfig {
    pub fn input(&self) -> NetworkInput {
        NetworkInput::unchecked(self.bandwidth_mbps, self.rtt_ms)
    }
}

/// Calculation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningConfig {
    /// How the middle value of each buffer triple is chosen.
    #[serde(default)]
    pub default_policy: DefaultPolicy,

    /// Decimal places for human-readable sizes.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_decimals() -> usize {
    2
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            default_policy: DefaultPolicy::default(),
            decimals: default_decimals(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable colored output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_color() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: default_color(),
        }
    }
}

/// Initialize logging. Output goes to stderr so stdout stays pipeable.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    }

    Ok(())
}
