//! Response encoding and delivery tracking
//!
//! The response body is a newline-separated list of `id:payload` items for
//! delivered events and `id:ENDED_CHANNEL` notices for dead ids. When both
//! sections are present they are joined by a single `:`, a quirk the
//! deployed client base depends on, kept byte-exact.
//!
//! The encoder returns a [`DeliveryBody`]: the body doubles as the delivery
//! finalizer, reporting a `Delivered` outcome for every tagged event once
//! the host has consumed it and a `Failed` outcome if it is discarded
//! before transmission completed.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::Frame;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};

use crate::codec::constants::{ENDED_SENTINEL, FIELD_SEPARATOR};
use crate::registry::{Channel, ChannelEvent, DeliveryResult};

/// Percent-encode a payload for the response body
///
/// Space encodes as `%20`, never `+`.
fn encode_payload(payload: &[u8]) -> String {
    percent_encode(payload, NON_ALPHANUMERIC).to_string()
}

fn ended_section(ended: &[String]) -> String {
    ended
        .iter()
        .map(|id| format!("{}{}{}", id, FIELD_SEPARATOR, ENDED_SENTINEL))
        .collect::<Vec<_>>()
        .join("\n")
}

fn events_section(events: &[(Channel, ChannelEvent)]) -> String {
    events
        .iter()
        .map(|(channel, event)| {
            format!(
                "{}{}{}",
                channel.id(),
                FIELD_SEPARATOR,
                encode_payload(&event.payload)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encode a response body
///
/// `events = None` is the timeout path: only ENDED notices (possibly none)
/// appear. With events present, every tagged event is registered for
/// outcome reporting on the returned body.
pub fn encode_response(
    ended: &[String],
    events: Option<Vec<(Channel, ChannelEvent)>>,
) -> DeliveryBody {
    match events {
        None => DeliveryBody::new(ended_section(ended), Vec::new()),
        Some(events) => {
            let body = if ended.is_empty() {
                events_section(&events)
            } else {
                // Legacy framing: the two sections share a field separator.
                format!(
                    "{}{}{}",
                    ended_section(ended),
                    FIELD_SEPARATOR,
                    events_section(&events)
                )
            };
            let pending = events
                .into_iter()
                .filter_map(|(channel, event)| event.tag.map(|tag| (channel, tag)))
                .collect();
            DeliveryBody::new(body, pending)
        }
    }
}

/// Response body that reports delivery outcomes
///
/// Yields the encoded payload as a single frame. Polling the body to its
/// end reports `Delivered` for every tagged event it carries; dropping it
/// earlier reports `Failed`. Either way each tag reports exactly once.
pub struct DeliveryBody {
    chunk: Option<Bytes>,
    payload: Bytes,
    pending: Vec<(Channel, i64)>,
    finished: bool,
}

impl DeliveryBody {
    fn new(body: String, pending: Vec<(Channel, i64)>) -> Self {
        let payload = Bytes::from(body);
        let chunk = if payload.is_empty() {
            None
        } else {
            Some(payload.clone())
        };
        Self {
            chunk,
            payload,
            pending,
            finished: false,
        }
    }

    /// A plain text body with no delivery tracking (error responses)
    pub(crate) fn text(body: impl Into<String>) -> Self {
        Self::new(body.into(), Vec::new())
    }

    /// The full encoded payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Report the transmission result for every pending tagged event
    ///
    /// Idempotent: only the first call (or the drop hook) reports. Hosts
    /// that do not stream the body call this directly once the write
    /// finished or failed.
    pub fn finish(&mut self, result: DeliveryResult) {
        if self.finished {
            return;
        }
        self.finished = true;
        for (channel, tag) in self.pending.drain(..) {
            tracing::debug!(channel = %channel.id(), tag = tag, result = ?result, "Delivery outcome");
            channel.report_outcome(result, tag);
        }
    }
}

impl http_body::Body for DeliveryBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<std::result::Result<Frame<Bytes>, Infallible>>> {
        let this = self.get_mut();
        match this.chunk.take() {
            Some(chunk) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            None => {
                // The host has read everything we had.
                this.finish(DeliveryResult::Delivered);
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for DeliveryBody {
    fn drop(&mut self) {
        self.finish(DeliveryResult::Failed);
    }
}
