//! Filter configuration

use serde::{Deserialize, Serialize};

/// Default channel threshold below which the filter detaches
pub const DEFAULT_MIN_CHANNELS: u16 = 5;

/// Options fixed at attach time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Wrap every encoded frame in an IEC 61937 burst
    pub spdif: bool,

    /// Bit rate override in bps; `None` picks the per-channel default
    pub bit_rate: Option<u32>,

    /// Inputs with fewer channels pass through unencoded
    pub min_channels: u16,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            spdif: false,
            bit_rate: None,
            min_channels: DEFAULT_MIN_CHANNELS,
        }
    }
}

impl FilterConfig {
    /// Parse `"<spdif>:<bit_rate>:<min_channels>"`.
    ///
    /// Fields are read left to right and reading stops at the first field
    /// that is missing or not an integer. Missing or zero fields keep their
    /// defaults. Bit rates below 1000 are taken as kbps.
    pub fn parse_options(options: &str) -> Self {
        let mut fields = [0i64; 3];
        for (slot, field) in fields.iter_mut().zip(options.split(':')) {
            match field.trim().parse::<i64>() {
                Ok(v) => *slot = v,
                Err(_) => break,
            }
        }
        let [spdif, bit_rate, min_channels] = fields;

        let bit_rate = if bit_rate < 1000 {
            bit_rate.saturating_mul(1000)
        } else {
            bit_rate
        };
        let bit_rate = match u32::try_from(bit_rate) {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(bit_rate, "ignoring out-of-range bit rate option");
                None
            }
        };

        let min_channels = match u16::try_from(min_channels) {
            Ok(0) | Err(_) => DEFAULT_MIN_CHANNELS,
            Ok(v) => v,
        };

        let config = Self {
            spdif: spdif != 0,
            bit_rate,
            min_channels,
        };
        tracing::debug!(
            options,
            spdif = config.spdif,
            bit_rate = ?config.bit_rate,
            min_channels = config.min_channels,
            "parsed filter options"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert!(!config.spdif);
        assert_eq!(config.bit_rate, None);
        assert_eq!(config.min_channels, 5);
    }

    #[test]
    fn test_parse_full() {
        let config = FilterConfig::parse_options("1:448000:2");
        assert!(config.spdif);
        assert_eq!(config.bit_rate, Some(448_000));
        assert_eq!(config.min_channels, 2);
    }

    #[test]
    fn test_parse_kbps() {
        let config = FilterConfig::parse_options("0:384");
        assert!(!config.spdif);
        assert_eq!(config.bit_rate, Some(384_000));
        assert_eq!(config.min_channels, 5);
    }

    #[test]
    fn test_parse_empty_and_zero() {
        assert_eq!(FilterConfig::parse_options(""), FilterConfig::default());
        assert_eq!(FilterConfig::parse_options("0:0:0"), FilterConfig::default());
    }

    #[test]
    fn test_parse_stops_at_garbage() {
        let config = FilterConfig::parse_options("1:abc:3");
        assert!(config.spdif);
        assert_eq!(config.bit_rate, None);
        assert_eq!(config.min_channels, 5);
    }

    #[test]
    fn test_parse_negative_bit_rate() {
        let config = FilterConfig::parse_options("1:-5");
        assert_eq!(config.bit_rate, None);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = FilterConfig::parse_options("1:640");
        let text = toml::to_string_pretty(&config).unwrap();
        let back: FilterConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
