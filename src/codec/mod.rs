//! Wire codec for comet requests and responses
//!
//! Decoding resolves the POSTed `registration` id list against the channel
//! registry; encoding produces the framed response body together with its
//! delivery-outcome finalizer.

pub mod constants;
pub mod decode;
pub mod encode;

pub use decode::{decode_request, Subscription};
pub use encode::{encode_response, DeliveryBody};
