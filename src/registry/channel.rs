//! Virtual channel implementation
//!
//! A [`Channel`] is one pub/sub endpoint: producers publish events into it,
//! waiting HTTP requests subscribe to its broadcast, and delivery outcomes
//! flow back to the producer on a separate queue. The handle is a
//! reference-counted clone; when the application drops its last handle the
//! channel unregisters itself from the registry.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};

use super::event::{ChannelEvent, DeliveryResult, Outcome};
use super::id::ChannelId;
use super::store::RegistryState;

/// Handle to a virtual channel
///
/// Cloning is cheap and shares the underlying channel. Waiters hold clones
/// for the duration of their wait, so a channel stays findable until the
/// last in-flight request subscribed to it has exited.
#[derive(Clone)]
pub struct Channel {
    pub(super) shared: Arc<ChannelShared>,
}

/// Shared state behind every handle to one channel
pub(super) struct ChannelShared {
    id: ChannelId,
    events_tx: broadcast::Sender<ChannelEvent>,
    outcomes_tx: mpsc::UnboundedSender<Outcome>,
    outcomes_rx: Mutex<Option<mpsc::UnboundedReceiver<Outcome>>>,
    listeners: AtomicI64,
    registry: Weak<Mutex<RegistryState>>,
}

impl ChannelShared {
    pub(super) fn new(
        id: ChannelId,
        event_capacity: usize,
        registry: Weak<Mutex<RegistryState>>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(event_capacity);
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Self {
            id,
            events_tx,
            outcomes_tx,
            outcomes_rx: Mutex::new(Some(outcomes_rx)),
            listeners: AtomicI64::new(0),
            registry,
        }
    }

    /// Publish an event to all currently subscribed waiters
    ///
    /// Returns the number of receivers, or 0 if nobody is waiting.
    pub(super) fn publish(&self, event: ChannelEvent) -> usize {
        self.events_tx.send(event).unwrap_or(0)
    }
}

impl Drop for ChannelShared {
    fn drop(&mut self) {
        // Last external handle is gone: unregister and release the cap slot.
        if let Some(state) = self.registry.upgrade() {
            let mut state = state.lock().unwrap();
            state.channels.remove(self.id.as_str());
            state.live = state.live.saturating_sub(1);
            tracing::debug!(channel = %self.id, live = state.live, "Channel reclaimed");
        }
    }
}

impl Channel {
    /// The channel's id
    pub fn id(&self) -> &ChannelId {
        &self.shared.id
    }

    /// Subscribe to the channel's event stream
    ///
    /// The receiver only sees events published after this call.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.shared.events_tx.subscribe()
    }

    /// Publish an event
    ///
    /// Returns the number of waiters that received it, or 0 if none were
    /// subscribed (the event is then dropped, matching broadcast semantics).
    pub fn send(&self, payload: impl Into<Bytes>, tag: Option<i64>) -> usize {
        self.shared.publish(ChannelEvent {
            payload: payload.into(),
            tag,
        })
    }

    /// Publish a pre-built event
    pub fn send_event(&self, event: ChannelEvent) -> usize {
        self.shared.publish(event)
    }

    /// Emit one item on the outcomes stream
    pub fn report_outcome(&self, result: DeliveryResult, tag: i64) {
        let _ = self.shared.outcomes_tx.send(Outcome { result, tag });
    }

    /// Take the outcomes receiver
    ///
    /// The outcomes stream has a single consumer (the channel's owner);
    /// returns `None` on every call after the first.
    pub fn take_outcomes(&self) -> Option<mpsc::UnboundedReceiver<Outcome>> {
        self.shared.outcomes_rx.lock().unwrap().take()
    }

    /// Atomically adjust the waiting-request count; `delta` may be negative
    ///
    /// Returns the updated count.
    pub fn add_listeners(&self, delta: i64) -> i64 {
        self.shared.listeners.fetch_add(delta, Ordering::Relaxed) + delta
    }

    /// Current number of HTTP requests waiting on this channel
    ///
    /// Producers may use this to skip publishing when nobody is listening.
    pub fn listeners(&self) -> i64 {
        self.shared.listeners.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.shared.id)
            .field("listeners", &self.listeners())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_channel() -> Channel {
        Channel {
            shared: Arc::new(ChannelShared::new(
                ChannelId::generate(),
                32,
                Weak::new(),
            )),
        }
    }

    #[tokio::test]
    async fn test_subscribe_then_send() {
        let channel = test_channel();
        let mut rx = channel.subscribe_events();

        let receivers = channel.send("hello", Some(7));
        assert_eq!(receivers, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.payload, Bytes::from_static(b"hello"));
        assert_eq!(event.tag, Some(7));
    }

    #[test]
    fn test_send_without_subscribers() {
        let channel = test_channel();
        assert_eq!(channel.send("dropped", None), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let channel = test_channel();
        let mut a = channel.subscribe_events();
        let mut b = channel.subscribe_events();

        assert_eq!(channel.send("y", Some(1)), 2);

        assert_eq!(a.recv().await.unwrap().payload, Bytes::from_static(b"y"));
        assert_eq!(b.recv().await.unwrap().payload, Bytes::from_static(b"y"));
    }

    #[test]
    fn test_listener_accounting() {
        let channel = test_channel();
        assert_eq!(channel.listeners(), 0);
        assert_eq!(channel.add_listeners(1), 1);
        assert_eq!(channel.add_listeners(2), 3);
        assert_eq!(channel.add_listeners(-3), 0);
    }

    #[tokio::test]
    async fn test_outcome_stream() {
        let channel = test_channel();
        let mut outcomes = channel.take_outcomes().unwrap();

        channel.report_outcome(DeliveryResult::Delivered, 7);
        channel.report_outcome(DeliveryResult::Failed, 8);

        assert_eq!(outcomes.recv().await.unwrap(), Outcome::delivered(7));
        assert_eq!(outcomes.recv().await.unwrap(), Outcome::failed(8));
    }

    #[test]
    fn test_outcomes_taken_once() {
        let channel = test_channel();
        assert!(channel.take_outcomes().is_some());
        assert!(channel.take_outcomes().is_none());
    }
}
