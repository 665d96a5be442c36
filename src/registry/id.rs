//! Channel identifiers
//!
//! Channel ids are handed to browser clients and are the only capability
//! needed to listen on a channel, so they must be unguessable: 16 bytes from
//! the OS CSPRNG, hex-encoded to 32 characters (128 bits of entropy).

use rand::rngs::OsRng;
use rand::RngCore;

/// Unique identifier for a virtual channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Generate a fresh id from the OS CSPRNG
    pub(crate) fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        ChannelId(hex_encode(&bytes))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for ChannelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
