//! Registry error types

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// The live-channel cap has been reached
    TooManyChannels { limit: usize },
    /// No live channel exists for the given id
    UnknownChannel(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::TooManyChannels { limit } => {
                write!(f, "Too many virtual channels (limit {})", limit)
            }
            RegistryError::UnknownChannel(id) => write!(f, "Unknown channel: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}
