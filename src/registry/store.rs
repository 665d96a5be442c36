//! Channel registry implementation
//!
//! The process-wide directory of live virtual channels. The registry holds
//! only weak references: when the application drops its last [`Channel`]
//! handle, the channel's drop hook removes the entry and releases its slot
//! under the live-channel cap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;

use super::channel::{Channel, ChannelShared};
use super::config::RegistryConfig;
use super::error::RegistryError;
use super::event::ChannelEvent;
use super::id::ChannelId;

/// Mutable registry state, shared with every channel's drop hook
pub(super) struct RegistryState {
    pub(super) channels: HashMap<ChannelId, Weak<ChannelShared>>,
    pub(super) live: usize,
}

/// Process-wide directory of live virtual channels
///
/// All operations are non-blocking: the map sits behind a plain mutex whose
/// critical sections are a few map operations, so `create`/`find` are safe
/// to call from any context, including synchronous producer code.
pub struct ChannelRegistry {
    state: Arc<Mutex<RegistryState>>,
    config: RegistryConfig,
}

impl ChannelRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState {
                channels: HashMap::new(),
                live: 0,
            })),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a new virtual channel
    ///
    /// Allocates a fresh unguessable id, inserts the channel, and returns
    /// the owning handle. The cap check and the insertion are one critical
    /// section, so concurrent creates cannot overshoot the limit.
    pub fn create(&self) -> Result<Channel, RegistryError> {
        let mut state = self.state.lock().unwrap();

        if let Some(limit) = self.config.max_virtual_channels {
            if state.live >= limit {
                tracing::warn!(limit = limit, "Channel creation rejected: cap reached");
                return Err(RegistryError::TooManyChannels { limit });
            }
        }

        // 128-bit ids make collisions with live entries all but impossible;
        // the loop is the cheap guarantee.
        let mut id = ChannelId::generate();
        while state.channels.contains_key(id.as_str()) {
            id = ChannelId::generate();
        }

        let shared = Arc::new(ChannelShared::new(
            id.clone(),
            self.config.event_capacity,
            Arc::downgrade(&self.state),
        ));
        state.channels.insert(id.clone(), Arc::downgrade(&shared));
        state.live += 1;

        tracing::info!(channel = %id, live = state.live, "Channel created");

        Ok(Channel { shared })
    }

    /// Create a channel fed by a pre-existing event source
    ///
    /// Events received on `source` are forwarded into the channel's
    /// broadcast until the source closes or the channel is reclaimed. Must
    /// be called from within a Tokio runtime.
    pub fn create_from_source(
        &self,
        mut source: mpsc::UnboundedReceiver<ChannelEvent>,
    ) -> Result<Channel, RegistryError> {
        let channel = self.create()?;

        // The forwarder holds only a weak reference so it cannot keep the
        // channel alive after the application drops its handle.
        let weak = Arc::downgrade(&channel.shared);
        tokio::spawn(async move {
            while let Some(event) = source.recv().await {
                let Some(shared) = weak.upgrade() else { break };
                shared.publish(event);
            }
        });

        Ok(channel)
    }

    /// Look up a live channel by id
    ///
    /// Fails with `UnknownChannel` if the id was never issued or the
    /// channel has been reclaimed.
    pub fn find(&self, id: &str) -> Result<Channel, RegistryError> {
        let state = self.state.lock().unwrap();
        state
            .channels
            .get(id)
            .and_then(Weak::upgrade)
            .map(|shared| Channel { shared })
            .ok_or_else(|| RegistryError::UnknownChannel(id.to_string()))
    }

    /// Number of currently live channels
    pub fn live_channels(&self) -> usize {
        self.state.lock().unwrap().live
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
