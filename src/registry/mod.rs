//! Channel registry for comet pub/sub routing
//!
//! The registry manages live virtual channels and routes published events to
//! the HTTP requests currently waiting on them. Fan-out uses
//! `tokio::sync::broadcast`; delivery outcomes flow back to the producer on
//! a per-channel queue.
//!
//! # Architecture
//!
//! ```text
//!                        ChannelRegistry
//!                 ┌────────────────────────────┐
//!                 │ channels: HashMap<Id,      │
//!                 │   Weak<ChannelShared {     │
//!                 │     events: broadcast::Tx, │
//!                 │     outcomes: mpsc::Tx,    │
//!                 │     listeners: AtomicI64,  │
//!                 │   }>                       │
//!                 │ >                          │
//!                 └─────────────┬──────────────┘
//!                               │
//!          ┌────────────────────┼────────────────────┐
//!          │                    │                    │
//!          ▼                    ▼                    ▼
//!     [Producer]            [Waiter]             [Waiter]
//!     channel.send()        events.recv()        events.recv()
//!          ▲                    │                    │
//!          └── outcomes.recv() ◄┴── response body finalizer
//! ```
//!
//! # Weak Retention
//!
//! The registry never keeps a channel alive. The map stores weak references;
//! the owning [`Channel`] handle lives with the application, and its drop
//! hook removes the registry entry, so `find` succeeds exactly as long as
//! the application still holds the channel.

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod store;

pub use channel::Channel;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use event::{ChannelEvent, DeliveryResult, Outcome};
pub use id::ChannelId;
pub use store::ChannelRegistry;
