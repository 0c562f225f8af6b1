//! DeepL API client for credentialed accounts

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Translation;
use crate::error::ClientError;

/// Base URL for paid-tier API keys.
const PRO_API_URL: &str = "https://api.deepl.com/v2/translate";
/// Base URL for free-tier API keys (suffixed `:fx`).
const FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// Marker DeepL appends to free-tier keys.
const FREE_KEY_SUFFIX: &str = ":fx";

/// Per-call timeout for all upstream requests.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    #[serde(default)]
    #[allow(dead_code)]
    detected_source_lang: String,
    text: String,
}

/// DeepL API client. One instance serves any number of API keys; the key
/// is supplied per call so the pool can rotate credentials freely.
pub struct DeepLClient {
    client: Client,
}

impl DeepLClient {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Base URL an API key routes to. Keys suffixed `:fx` are free-tier
    /// and must use the api-free host; the protocol is otherwise identical.
    fn endpoint_for(key: &str) -> &'static str {
        if key.ends_with(FREE_KEY_SUFFIX) {
            FREE_API_URL
        } else {
            PRO_API_URL
        }
    }

    /// Translate `text` using the given API key.
    pub async fn translate(
        &self,
        key: &str,
        text: &str,
        target_lang: &str,
        tag_handling: Option<&str>,
    ) -> Result<Translation, ClientError> {
        let request = DeepLRequest {
            text: [text],
            target_lang,
            tag_handling,
        };

        let response = self
            .client
            .post(Self::endpoint_for(key))
            .header("Authorization", format!("DeepL-Auth-Key {}", key))
            .json(&request)
            .send()
            .await?;

        let body = response.text().await?;

        // DeepL serves an HTML error page when a key is rate limited,
        // which would otherwise surface as a JSON decode failure.
        if body.contains("<title>429 Too Many Requests") {
            return Err(ClientError::TooManyRequests);
        }

        let parsed: DeepLResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if parsed.translations.is_empty() {
            if parsed.message == "Quota Exceeded" {
                return Err(ClientError::QuotaExceeded);
            }
            debug!(message = %parsed.message, "deepl returned no translations");
            return Err(ClientError::Empty(parsed.message));
        }

        let text = parsed.translations[0].text.clone();
        Ok(Translation {
            alternatives: vec![text.clone()],
            data: text,
        })
    }
}
