//! Upstream adapter seam
//!
//! The dispatch engine, prober, and refresher all reach upstreams
//! through the [`Adapter`] trait so tests can substitute deterministic
//! implementations. [`LiveAdapter`] is the production implementation
//! wrapping the wire clients from `relay-client`.

use async_trait::async_trait;
use relay_client::{ClientError, DeepLClient, DeepLxClient, GoogleClient, Translation};

use crate::types::{Family, TranslateRequest};

/// The closed set of upstream calls the core makes: one normalized
/// `translate` per family, plus the last-resort fallback translation.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Translate through the given upstream. `upstream` is an API key
    /// for the account family and a URL for the endpoint family. Any
    /// transport error, rejection, or empty result is an `Err`.
    async fn translate(
        &self,
        family: Family,
        upstream: &str,
        request: &TranslateRequest,
    ) -> Result<Translation, ClientError>;

    /// Fallback translation via the generic web service. Used only when
    /// completeness verification rejects the primary result.
    async fn fallback(&self, request: &TranslateRequest) -> Result<String, ClientError>;
}

/// Production adapter over the real HTTP clients.
pub struct LiveAdapter {
    deepl: DeepLClient,
    deeplx: DeepLxClient,
    google: GoogleClient,
}

impl LiveAdapter {
    pub fn new() -> Result<Self, ClientError> {
        Ok(Self {
            deepl: DeepLClient::new()?,
            deeplx: DeepLxClient::new()?,
            google: GoogleClient::new()?,
        })
    }
}

#[async_trait]
impl Adapter for LiveAdapter {
    async fn translate(
        &self,
        family: Family,
        upstream: &str,
        request: &TranslateRequest,
    ) -> Result<Translation, ClientError> {
        match family {
            Family::Account => {
                self.deepl
                    .translate(
                        upstream,
                        &request.text,
                        &request.target_lang,
                        request.tag_handling.as_deref(),
                    )
                    .await
            }
            Family::Endpoint => {
                self.deeplx
                    .translate(
                        upstream,
                        &request.text,
                        &request.source_lang,
                        &request.target_lang,
                        request.tag_handling.as_deref(),
                    )
                    .await
            }
        }
    }

    async fn fallback(&self, request: &TranslateRequest) -> Result<String, ClientError> {
        self.google
            .translate(&request.text, &request.source_lang, &request.target_lang)
            .await
    }
}
