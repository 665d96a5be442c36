//! Per-request waiter sessions
//!
//! A comet request that names live channels turns into a waiter: a blocked
//! HTTP handler subscribed to those channels until the first publication or
//! the idle timeout.

pub mod waiter;

pub use waiter::{wait_any, ListenerGuard};
