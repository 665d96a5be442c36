//! comet-rs: a server-side Comet endpoint
//!
//! Pushes messages to browser clients over plain request/response HTTP by
//! holding client POSTs open until data arrives or a timeout elapses.
//! Application code creates *virtual channels* in a process-wide registry
//! and publishes events into them; clients POST a newline-separated list of
//! channel ids under the `registration` form parameter and receive the
//! first publication on any of those channels as `id:payload` lines
//! (`id:ENDED_CHANNEL` for ids that are no longer live).
//!
//! # Quick start
//!
//! ```no_run
//! use comet_rs::{CometConfig, CometExtension};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let extension = Arc::new(CometExtension::new(CometConfig::default()));
//!
//! // Producer side: create a channel, hand its id to the client, publish.
//! let channel = extension.registry().create()?;
//! println!("subscribe to {}", channel.id());
//! channel.send("hello world", Some(7));
//!
//! // Host side: serve the extension over HTTP.
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, extension.router()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Delivery outcomes for tagged events arrive on the channel's outcomes
//! stream once the response carrying them has been transmitted (or has
//! failed); see [`Channel::take_outcomes`].

pub mod codec;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use registry::{
    Channel, ChannelEvent, ChannelId, ChannelRegistry, DeliveryResult, Outcome, RegistryConfig,
    RegistryError,
};
pub use server::{CometConfig, CometExtension, CometRequest, CometResponse, EXTENSION_NAME};
pub use stats::{CometStats, StatsSnapshot};
