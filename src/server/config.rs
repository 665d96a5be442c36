//! Comet extension configuration

use std::time::Duration;

/// Default per-request idle timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default request body cap
pub const DEFAULT_MAX_REQUEST_BODY: usize = 64 * 1024;

/// Configuration options for the comet extension
#[derive(Debug, Clone)]
pub struct CometConfig {
    /// How long a request waits for an event before replying empty-handed
    pub timeout: Duration,

    /// Cap on concurrently live channels (None = unbounded)
    pub max_virtual_channels: Option<usize>,

    /// Request body size cap; larger bodies are rejected
    pub max_request_body: usize,
}

impl Default for CometConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_virtual_channels: None,
            max_request_body: DEFAULT_MAX_REQUEST_BODY,
        }
    }
}

impl CometConfig {
    /// Set the idle timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the live-channel cap
    pub fn max_virtual_channels(mut self, max: Option<usize>) -> Self {
        self.max_virtual_channels = max;
        self
    }

    /// Set the request body cap
    pub fn max_request_body(mut self, max: usize) -> Self {
        self.max_request_body = max;
        self
    }

    /// Build a configuration from the host's `comet` element attributes
    ///
    /// Recognized attributes: `timeout` (float seconds) and
    /// `max_virtual_channels` (empty string = unbounded, otherwise a
    /// non-negative integer). Anything else refuses startup.
    pub fn from_attributes<'a, I>(attrs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (name, value) in attrs {
            match name {
                "timeout" => {
                    let secs: f64 = value.parse().map_err(|_| invalid(name, value))?;
                    if !secs.is_finite() || secs < 0.0 {
                        return Err(invalid(name, value));
                    }
                    config.timeout = Duration::from_secs_f64(secs);
                }
                "max_virtual_channels" => {
                    config.max_virtual_channels = if value.is_empty() {
                        None
                    } else {
                        Some(value.parse().map_err(|_| invalid(name, value))?)
                    };
                }
                other => return Err(ConfigError::UnknownAttribute(other.to_string())),
            }
        }
        Ok(config)
    }
}

fn invalid(attribute: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

/// Error type for configuration parsing
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Attribute name is not recognized
    UnknownAttribute(String),
    /// Attribute value failed to parse
    InvalidValue { attribute: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownAttribute(name) => {
                write!(f, "Unknown comet attribute: {}", name)
            }
            ConfigError::InvalidValue { attribute, value } => {
                write!(f, "Invalid value for comet attribute {}: {:?}", attribute, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CometConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.max_virtual_channels, None);
        assert_eq!(config.max_request_body, 64 * 1024);
    }

    #[test]
    fn test_builder_chaining() {
        let config = CometConfig::default()
            .timeout(Duration::from_millis(500))
            .max_virtual_channels(Some(10))
            .max_request_body(1024);

        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.max_virtual_channels, Some(10));
        assert_eq!(config.max_request_body, 1024);
    }

    #[test]
    fn test_from_attributes_empty() {
        let config = CometConfig::from_attributes([]).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_virtual_channels, None);
    }

    #[test]
    fn test_from_attributes_timeout_float() {
        let config = CometConfig::from_attributes([("timeout", "12.5")]).unwrap();
        assert_eq!(config.timeout, Duration::from_secs_f64(12.5));
    }

    #[test]
    fn test_from_attributes_unbounded_channels() {
        let config = CometConfig::from_attributes([("max_virtual_channels", "")]).unwrap();
        assert_eq!(config.max_virtual_channels, None);
    }

    #[test]
    fn test_from_attributes_bounded_channels() {
        let config = CometConfig::from_attributes([("max_virtual_channels", "100")]).unwrap();
        assert_eq!(config.max_virtual_channels, Some(100));
    }

    #[test]
    fn test_from_attributes_both() {
        let config =
            CometConfig::from_attributes([("timeout", "5"), ("max_virtual_channels", "2")])
                .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_virtual_channels, Some(2));
    }

    #[test]
    fn test_from_attributes_malformed_timeout() {
        assert!(matches!(
            CometConfig::from_attributes([("timeout", "soon")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            CometConfig::from_attributes([("timeout", "-1")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_attributes_malformed_channel_cap() {
        assert!(matches!(
            CometConfig::from_attributes([("max_virtual_channels", "lots")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_attributes_unknown_attribute() {
        assert!(matches!(
            CometConfig::from_attributes([("tiemout", "20")]),
            Err(ConfigError::UnknownAttribute(name)) if name == "tiemout"
        ));
    }
}
