//! The comet HTTP extension
//!
//! Per request: decode the subscription, reply immediately when nothing can
//! be waited on, otherwise block on the subscribed channels until the first
//! publication or the idle timeout, then frame the response. Requests whose
//! content-type is not the comet marker are yielded back to the host
//! untouched.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::constants::{
    BAD_REGISTRATION_BODY, COMET_CONTENT_TYPE, RESPONSE_CONTENT_TYPE,
};
use crate::codec::decode::Subscription;
use crate::codec::{decode_request, encode_response, DeliveryBody};
use crate::error::Error;
use crate::registry::{ChannelRegistry, RegistryConfig};
use crate::server::config::CometConfig;
use crate::session::wait_any;
use crate::stats::CometStats;

/// Name the extension registers under with the host
pub const EXTENSION_NAME: &str = "comet";

/// A comet request as seen from the host
///
/// The host has already parsed the HTTP envelope; the extension only needs
/// the content-type and the (size-capped) body.
#[derive(Debug, Clone)]
pub struct CometRequest {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl CometRequest {
    pub fn new(content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }
}

/// Result bundle handed back to the host
///
/// The body is streamed; transmitting it to its end triggers the delivery
/// outcomes for the events it carries. `content_length` is always `None`:
/// comet responses are sent without a fixed length.
pub struct CometResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub content_length: Option<u64>,
    pub body: DeliveryBody,
}

impl CometResponse {
    fn ok(body: DeliveryBody) -> Self {
        Self {
            status: 200,
            content_type: RESPONSE_CONTENT_TYPE,
            content_length: None,
            body,
        }
    }

    fn bad_request() -> Self {
        Self {
            status: 400,
            content_type: RESPONSE_CONTENT_TYPE,
            content_length: None,
            body: DeliveryBody::text(BAD_REGISTRATION_BODY),
        }
    }

    fn too_large() -> Self {
        Self {
            status: 413,
            content_type: RESPONSE_CONTENT_TYPE,
            content_length: None,
            body: DeliveryBody::text("Request body too large"),
        }
    }
}

/// The comet endpoint: channel registry plus wait/notify request handling
pub struct CometExtension {
    registry: Arc<ChannelRegistry>,
    config: CometConfig,
    stats: Arc<CometStats>,
}

impl CometExtension {
    /// Create an extension with the given configuration
    pub fn new(config: CometConfig) -> Self {
        let registry = ChannelRegistry::with_config(
            RegistryConfig::default().max_virtual_channels(config.max_virtual_channels),
        );
        tracing::info!(
            timeout_secs = config.timeout.as_secs_f64(),
            max_virtual_channels = ?config.max_virtual_channels,
            "Comet extension ready"
        );
        Self {
            registry: Arc::new(registry),
            config,
            stats: Arc::new(CometStats::new()),
        }
    }

    /// The channel registry producers create channels in
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// The extension configuration
    pub fn config(&self) -> &CometConfig {
        &self.config
    }

    /// Process counters
    pub fn stats(&self) -> &Arc<CometStats> {
        &self.stats
    }

    /// Whether a content-type marks a comet request
    ///
    /// Matches on the type/subtype pair only; parameters are allowed.
    pub fn accepts(content_type: Option<&str>) -> bool {
        content_type
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .is_some_and(|mime| mime.eq_ignore_ascii_case(COMET_CONTENT_TYPE))
    }

    /// Handle one request
    ///
    /// Returns `None` for requests that are not comet requests, so the host
    /// can pass them to the next extension unchanged.
    pub async fn handle(&self, request: CometRequest) -> Option<CometResponse> {
        if !Self::accepts(request.content_type.as_deref()) {
            return None;
        }
        self.stats.record_request();

        let decoded = decode_request(&self.registry, &request.body, self.config.max_request_body);
        let Subscription { active, ended } = match decoded {
            Ok(subscription) => subscription,
            Err(Error::InputTooLarge { limit, actual }) => {
                tracing::warn!(limit = limit, actual = actual, "Comet body over limit");
                return Some(CometResponse::too_large());
            }
            Err(_) => {
                tracing::debug!("Undecodable comet body");
                return Some(CometResponse::bad_request());
            }
        };

        if active.is_empty() && ended.is_empty() {
            tracing::debug!("Empty registration");
            return Some(CometResponse::bad_request());
        }

        self.stats.record_ended_notices(ended.len() as u64);

        if active.is_empty() {
            // Nothing to wait on: answer the dead ids right away.
            return Some(CometResponse::ok(encode_response(&ended, None)));
        }

        self.stats.record_wait();
        let batch = wait_any(active, self.config.timeout).await;

        let events = if batch.is_empty() {
            self.stats.record_timeout();
            None
        } else {
            self.stats.record_events(batch.len() as u64);
            Some(batch)
        };

        Some(CometResponse::ok(encode_response(&ended, events)))
    }
}

mod host {
    //! Axum adapter
    //!
    //! Mounts the extension as a fallback route so the content-type gate,
    //! not the path, decides whether a request is a comet request. This
    //! lets the endpoint intercept any URL, as deployed clients expect.

    use axum::body::Body;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::Router;
    use bytes::Bytes;
    use std::sync::Arc;

    use super::{CometExtension, CometRequest};

    impl CometExtension {
        /// Serve the extension on every path of an axum router
        ///
        /// Non-comet requests answer 404, which a composing host can treat
        /// as "yielded" by merging its own routes over this router.
        pub fn router(self: Arc<Self>) -> Router {
            Router::new().fallback(comet_endpoint).with_state(self)
        }
    }

    async fn comet_endpoint(
        State(extension): State<Arc<CometExtension>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match extension.handle(CometRequest { content_type, body }).await {
            Some(response) => {
                let status =
                    StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status,
                    [(header::CONTENT_TYPE, response.content_type)],
                    Body::new(response.body),
                )
                    .into_response()
            }
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
