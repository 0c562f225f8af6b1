//! Shared request types

use serde::Deserialize;

/// Upstream family. Credentialed DeepL API keys and peer DeepLX relay
/// URLs are pooled separately and speak different wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Credentialed DeepL account (API key).
    Account,
    /// Peer DeepLX relay (HTTP endpoint).
    Endpoint,
}

impl Family {
    /// Log-friendly field name, matching the roster vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Account => "key",
            Family::Endpoint => "url",
        }
    }
}

/// One inbound translation request. Created per call, discarded after
/// the response is written.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub tag_handling: Option<String>,
}
