//! Google Translate fallback client
//!
//! Uses the undocumented `translate_a/single` web endpoint. The response
//! is a nested JSON array rather than an object, so it is decoded through
//! `serde_json::Value`.

use reqwest::Client;
use serde_json::Value;

use crate::deepl::UPSTREAM_TIMEOUT;
use crate::error::ClientError;

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Fallback translation client, used only when the primary upstreams
/// produce output that fails the completeness check.
pub struct GoogleClient {
    client: Client,
}

impl GoogleClient {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Translate `text` from `source_lang` (or auto-detect when empty)
    /// to `target_lang`. Returns the joined translated segments.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ClientError> {
        let source = if source_lang.is_empty() {
            "auto"
        } else {
            source_lang
        };

        let response = self
            .client
            .get(GOOGLE_TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if body.contains("<title>Error 400 (Bad Request)") {
            return Err(ClientError::Status(400));
        }
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let parsed: Value = body
            .parse::<Value>()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Self::join_segments(&parsed)
    }

    /// The first element of the response is an array of segments, each an
    /// array whose first element is the translated text for that segment.
    fn join_segments(parsed: &Value) -> Result<String, ClientError> {
        let segments = parsed
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::InvalidResponse("missing segment array".to_string()))?;

        let mut out = String::new();
        for segment in segments {
            if let Some(translated) = segment.get(0).and_then(Value::as_str) {
                out.push_str(translated);
            }
        }

        if out.is_empty() {
            return Err(ClientError::Empty("no translated segments".to_string()));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_translated_segments() {
        let parsed = json!([
            [["你好，", "Hello, ", null], ["世界", "world", null]],
            null,
            "en"
        ]);
        assert_eq!(GoogleClient::join_segments(&parsed).unwrap(), "你好，世界");
    }

    #[test]
    fn rejects_shapeless_response() {
        let parsed = json!({ "error": "nope" });
        assert!(GoogleClient::join_segments(&parsed).is_err());
    }
}
