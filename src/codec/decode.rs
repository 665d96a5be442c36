//! Subscription request decoding
//!
//! The request body is URL-form-encoded; every occurrence of the
//! `registration` parameter carries a newline-separated list of channel ids.
//! Ids that resolve to a live channel become `active`, the rest become
//! `ended`. All other parameters are ignored.

use url::form_urlencoded;

use crate::codec::constants::{CHANNEL_SEPARATOR, REGISTRATION_PARAM};
use crate::error::{Error, Result};
use crate::registry::{Channel, ChannelRegistry};

/// A decoded subscription request
#[derive(Debug, Default)]
pub struct Subscription {
    /// Ids that resolved to a live channel, in the caller's order
    pub active: Vec<Channel>,
    /// Ids with no live channel, in the caller's order
    pub ended: Vec<String>,
}

impl Subscription {
    /// True when the request named no ids at all
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.ended.is_empty()
    }
}

/// Decode a subscription request body against the registry
///
/// An absent or empty body yields an empty subscription. A body over
/// `max_body` bytes fails with `InputTooLarge`; form data that does not
/// decode to valid UTF-8 fails with `BadRequest`.
pub fn decode_request(
    registry: &ChannelRegistry,
    body: &[u8],
    max_body: usize,
) -> Result<Subscription> {
    if body.len() > max_body {
        return Err(Error::InputTooLarge {
            limit: max_body,
            actual: body.len(),
        });
    }

    let mut subscription = Subscription::default();

    for (name, value) in form_urlencoded::parse(body) {
        // form_urlencoded substitutes U+FFFD for undecodable sequences.
        if name.contains('\u{FFFD}') || value.contains('\u{FFFD}') {
            return Err(Error::BadRequest);
        }
        if name != REGISTRATION_PARAM {
            continue;
        }
        for id in value.split(CHANNEL_SEPARATOR).filter(|id| !id.is_empty()) {
            match registry.find(id) {
                Ok(channel) => subscription.active.push(channel),
                Err(_) => subscription.ended.push(id.to_string()),
            }
        }
    }

    tracing::debug!(
        active = subscription.active.len(),
        ended = subscription.ended.len(),
        "Subscription decoded"
    );

    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 64 * 1024;

    #[test]
    fn test_empty_body() {
        let registry = ChannelRegistry::new();
        let sub = decode_request(&registry, b"", MAX).unwrap();
        assert!(sub.is_empty());
    }

    #[test]
    fn test_unknown_id_becomes_ended() {
        let registry = ChannelRegistry::new();
        let sub = decode_request(&registry, b"registration=abc", MAX).unwrap();
        assert!(sub.active.is_empty());
        assert_eq!(sub.ended, vec!["abc"]);
    }

    #[test]
    fn test_live_id_becomes_active() {
        let registry = ChannelRegistry::new();
        let channel = registry.create().unwrap();
        let body = format!("registration={}", channel.id());

        let sub = decode_request(&registry, body.as_bytes(), MAX).unwrap();
        assert_eq!(sub.active.len(), 1);
        assert_eq!(sub.active[0].id(), channel.id());
        assert!(sub.ended.is_empty());
    }

    #[test]
    fn test_newline_separated_list() {
        let registry = ChannelRegistry::new();
        let channel = registry.create().unwrap();
        // %0A is the encoded newline separator.
        let body = format!("registration={}%0AZ", channel.id());

        let sub = decode_request(&registry, body.as_bytes(), MAX).unwrap();
        assert_eq!(sub.active.len(), 1);
        assert_eq!(sub.ended, vec!["Z"]);
    }

    #[test]
    fn test_multiple_parameters_concatenate_in_order() {
        let registry = ChannelRegistry::new();
        let sub = decode_request(&registry, b"registration=a&registration=b%0Ac", MAX).unwrap();
        assert_eq!(sub.ended, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_other_parameters_ignored() {
        let registry = ChannelRegistry::new();
        let sub = decode_request(&registry, b"foo=1&registration=x&bar=2", MAX).unwrap();
        assert_eq!(sub.ended, vec!["x"]);
    }

    #[test]
    fn test_trailing_newline_ignored() {
        let registry = ChannelRegistry::new();
        let sub = decode_request(&registry, b"registration=x%0A", MAX).unwrap();
        assert_eq!(sub.ended, vec!["x"]);
    }

    #[test]
    fn test_oversize_body() {
        let registry = ChannelRegistry::new();
        let result = decode_request(&registry, b"registration=abc", 4);
        assert!(matches!(
            result,
            Err(Error::InputTooLarge { limit: 4, actual: 16 })
        ));
    }

    #[test]
    fn test_undecodable_body() {
        let registry = ChannelRegistry::new();
        let result = decode_request(&registry, b"registration=%FF%FE", MAX);
        assert!(matches!(result, Err(Error::BadRequest)));
    }

    #[test]
    fn test_reclaimed_channel_becomes_ended() {
        let registry = ChannelRegistry::new();
        let channel = registry.create().unwrap();
        let body = format!("registration={}", channel.id());
        drop(channel);

        let sub = decode_request(&registry, body.as_bytes(), MAX).unwrap();
        assert!(sub.active.is_empty());
        assert_eq!(sub.ended.len(), 1);
    }
}
