//! Upstream translation clients
//!
//! This crate provides the wire-protocol adapters for the three upstream
//! families the relay talks to: credentialed DeepL API accounts, peer
//! DeepLX relays, and the Google Translate web endpoint used as a
//! last-resort fallback. Each adapter normalizes its upstream's response
//! shape into a [`Translation`] or a typed [`ClientError`].

pub mod deepl;
pub mod deeplx;
pub mod error;
pub mod google;

pub use deepl::DeepLClient;
pub use deeplx::DeepLxClient;
pub use error::ClientError;
pub use google::GoogleClient;

/// Normalized successful translation from any upstream family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Primary translated text.
    pub data: String,
    /// Alternative renderings, possibly empty.
    pub alternatives: Vec<String>,
}
