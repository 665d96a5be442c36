//! Crate-level error type
//!
//! Registry and configuration errors have their own scoped enums; this type
//! is what the request path and embedding hosts see.

use crate::registry::RegistryError;
use crate::server::config::ConfigError;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the comet request path
#[derive(Debug)]
pub enum Error {
    /// Request body exceeded the configured size cap
    InputTooLarge { limit: usize, actual: usize },
    /// Request was structurally invalid (undecodable form body)
    BadRequest,
    /// Registry operation failed
    Registry(RegistryError),
    /// Configuration was rejected
    Config(ConfigError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InputTooLarge { limit, actual } => {
                write!(f, "Request body too large: {} bytes (limit {})", actual, limit)
            }
            Error::BadRequest => write!(f, "Empty or incorrect registration"),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registry(e) => Some(e),
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}
