//! Configuration file support
//!
//! Loads filter and logging configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::FilterConfig;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Filter settings
    #[serde(default)]
    pub filter: FilterSettings,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Colon-delimited option string, applied first
    pub options: Option<String>,
    /// Wrap frames in IEC 61937 bursts
    pub spdif: Option<bool>,
    /// Bit rate in bps (values below 1000 are kbps)
    pub bit_rate: Option<u32>,
    /// Minimum input channel count to encode
    pub min_channels: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Some("pretty".to_string()),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            filter: FilterSettings {
                options: None,
                spdif: Some(false),
                bit_rate: None,
                min_channels: Some(crate::config::DEFAULT_MIN_CHANNELS),
            },
            logging: Some(LoggingSettings::default()),
        }
    }

    /// Convert to FilterConfig
    ///
    /// Explicit keys override whatever the `options` string set.
    pub fn filter_config(&self) -> FilterConfig {
        let mut config = self
            .filter
            .options
            .as_deref()
            .map(FilterConfig::parse_options)
            .unwrap_or_default();
        if let Some(spdif) = self.filter.spdif {
            config.spdif = spdif;
        }
        if let Some(bit_rate) = self.filter.bit_rate {
            config.bit_rate = match bit_rate {
                0 => None,
                b if b < 1000 => Some(b * 1000),
                b => Some(b),
            };
        }
        if let Some(min) = self.filter.min_channels.filter(|&m| m > 0) {
            config.min_channels = min;
        }
        config
    }

    pub fn logging_settings(&self) -> LoggingSettings {
        self.logging.clone().unwrap_or_default()
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
