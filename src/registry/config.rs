//! Registry configuration

/// Configuration for the channel registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Cap on concurrently live channels (None = unbounded)
    pub max_virtual_channels: Option<usize>,

    /// Per-channel broadcast queue depth
    ///
    /// Events queued beyond this between a waiter's subscription and its
    /// first poll are dropped oldest-first (broadcast lag semantics).
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_virtual_channels: None,
            event_capacity: 32,
        }
    }
}

impl RegistryConfig {
    /// Set the live-channel cap
    pub fn max_virtual_channels(mut self, max: Option<usize>) -> Self {
        self.max_virtual_channels = max;
        self
    }

    /// Set the per-channel broadcast queue depth
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}
