//! The merged wait over a set of subscribed channels
//!
//! Each request that names live channels becomes a waiter: it subscribes to
//! every channel's broadcast, fans the subscriptions into a single queue,
//! and races the first arrival against the configured timeout. The full
//! batch available at the winning instant is returned, newest first.
//!
//! Listener accounting is RAII: counts are incremented as subscriptions are
//! taken and decremented when the wait ends, including when the waiter's
//! future is dropped because the client went away.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::registry::{Channel, ChannelEvent};

/// Window after the winning event during which in-flight simultaneous
/// events are still collected into the batch.
const MERGE_SETTLE: Duration = Duration::from_millis(5);

/// Holds one listener slot on a channel for the guard's lifetime
pub struct ListenerGuard {
    channel: Channel,
}

impl ListenerGuard {
    /// Increment the channel's listener count until dropped
    pub fn new(channel: Channel) -> Self {
        channel.add_listeners(1);
        Self { channel }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.channel.add_listeners(-1);
    }
}

/// Aborts the fan-in forwarder tasks when the wait ends
///
/// Dropping this deregisters every subscription the wait took out, so a
/// timed-out or cancelled waiter leaves nothing parked on the channel.
struct Forwarders(Vec<tokio::task::JoinHandle<()>>);

impl Drop for Forwarders {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Block until any of `channels` publishes, or until `timeout` elapses
///
/// Returns the accumulated batch of events observed at the winning instant
/// (newest first), or an empty batch on timeout. Only events published
/// after this call subscribes are visible. Listener counts on every channel
/// are incremented for the duration of the wait and are decremented before
/// the function returns.
pub async fn wait_any(channels: Vec<Channel>, timeout: Duration) -> Vec<(Channel, ChannelEvent)> {
    let deadline = Instant::now() + timeout;
    let (fanin_tx, mut fanin_rx) = mpsc::unbounded_channel::<(usize, ChannelEvent)>();

    let mut guards = Vec::with_capacity(channels.len());
    let mut forwarders = Forwarders(Vec::with_capacity(channels.len()));
    for (index, channel) in channels.iter().enumerate() {
        let mut events = channel.subscribe_events();
        guards.push(ListenerGuard::new(channel.clone()));

        // The forwarder owns only the subscription, never a channel handle,
        // so it cannot delay channel reclamation.
        let tx = fanin_tx.clone();
        forwarders.0.push(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if tx.send((index, event)).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Waiter lagged behind publisher");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }
    drop(fanin_tx);

    let mut batch = Vec::new();
    match tokio::time::timeout_at(deadline, fanin_rx.recv()).await {
        Ok(Some(first)) => {
            batch.push(first);
            // Pick up events published in the same instant that are still
            // in flight through the fan-in.
            loop {
                match tokio::time::timeout(MERGE_SETTLE, fanin_rx.recv()).await {
                    Ok(Some(event)) => batch.push(event),
                    Ok(None) | Err(_) => break,
                }
            }
        }
        Ok(None) => {
            // Cannot happen while we hold the subscriptions; treated as a
            // quiet wait all the same.
            tokio::time::sleep_until(deadline).await;
        }
        Err(_) => {}
    }

    tracing::debug!(
        channels = channels.len(),
        events = batch.len(),
        "Wait finished"
    );

    // Deregister the subscriptions and decrement listener counts before the
    // caller can touch the response.
    drop(forwarders);
    drop(guards);

    // The legacy merger accumulated by prepending: newest event first.
    batch.reverse();
    batch
        .into_iter()
        .map(|(index, event)| (channels[index].clone(), event))
        .collect()
}
