//! Peer DeepLX relay client

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::Translation;
use crate::deepl::UPSTREAM_TIMEOUT;
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: &'a str,
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DeepLxResponse {
    code: i64,
    #[serde(default)]
    #[allow(dead_code)]
    id: i64,
    #[serde(default)]
    data: String,
    #[serde(default)]
    alternatives: Vec<String>,
}

/// Client for peer relays speaking the DeepLX protocol (the same shape
/// this service exposes to its own callers).
pub struct DeepLxClient {
    client: Client,
}

impl DeepLxClient {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Translate `text` through the peer relay at `url`.
    ///
    /// A transport-level non-200 and an embedded `code != 200` are both
    /// failures; the peer signals rejection through either channel.
    pub async fn translate(
        &self,
        url: &str,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        tag_handling: Option<&str>,
    ) -> Result<Translation, ClientError> {
        let request = DeepLxRequest {
            text,
            source_lang,
            target_lang,
            tag_handling,
        };

        let response = self.client.post(url).json(&request).send().await?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let parsed: DeepLxResponse = response.json().await?;

        if parsed.code != 200 {
            return Err(ClientError::Rejected(parsed.code));
        }

        Ok(Translation {
            data: parsed.data,
            alternatives: parsed.alternatives,
        })
    }
}
