//! Event and outcome types for virtual channels
//!
//! Producers publish [`ChannelEvent`]s; the endpoint reports a
//! [`Outcome`] back for every tagged event it actually transmitted.

use bytes::Bytes;

/// An event published to a virtual channel
///
/// Cheap to clone: the payload is reference-counted, so broadcasting to many
/// waiters never copies the data.
#[derive(Debug, Clone)]
pub struct ChannelEvent {
    /// Message payload, percent-encoded into the response body on delivery
    pub payload: Bytes,
    /// Optional correlator the producer uses to match delivery outcomes
    pub tag: Option<i64>,
}

impl ChannelEvent {
    /// Create an event with a delivery-tracking tag
    pub fn tagged(payload: impl Into<Bytes>, tag: i64) -> Self {
        Self {
            payload: payload.into(),
            tag: Some(tag),
        }
    }

    /// Create an event without delivery tracking
    pub fn untagged(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            tag: None,
        }
    }
}

/// Result of transmitting a tagged event to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The host finished writing the response body containing the event
    Delivered,
    /// The response was discarded before transmission completed
    Failed,
}

/// One item on a channel's outcomes stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the event reached the client
    pub result: DeliveryResult,
    /// Tag of the event this outcome refers to
    pub tag: i64,
}

impl Outcome {
    pub fn delivered(tag: i64) -> Self {
        Self {
            result: DeliveryResult::Delivered,
            tag,
        }
    }

    pub fn failed(tag: i64) -> Self {
        Self {
            result: DeliveryResult::Failed,
            tag,
        }
    }
}
