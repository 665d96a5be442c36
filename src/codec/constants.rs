//! Wire-level constants
//!
//! These values are fixed by the protocol; clients parse them byte-exactly.

/// Separates items in the request id list and the response body
pub const CHANNEL_SEPARATOR: char = '\n';

/// Separates a channel id from its payload or sentinel
pub const FIELD_SEPARATOR: char = ':';

/// Sentinel payload for ids that are not (or no longer) live channels
pub const ENDED_SENTINEL: &str = "ENDED_CHANNEL";

/// Form parameter carrying the newline-separated channel-id list
pub const REGISTRATION_PARAM: &str = "registration";

/// Content-type that marks a request as a comet request
pub const COMET_CONTENT_TYPE: &str = "application/x-ocsigen-comet";

/// Content-type of every comet response
pub const RESPONSE_CONTENT_TYPE: &str = "text/html";

/// Body of the 400 response for an empty or undecodable registration
pub const BAD_REGISTRATION_BODY: &str = "Empty or incorrect registration";
