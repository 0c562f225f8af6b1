//! Upstream liveness probing

use std::sync::Arc;

use relay_client::ClientError;
use tracing::debug;

use crate::adapter::Adapter;
use crate::types::{Family, TranslateRequest};

/// Classifies an upstream as alive or dead with one minimal test
/// translation. Probing never raises: a single bad upstream must not
/// abort the refresh fan-out, so every failure collapses to `false`.
pub struct Prober {
    adapter: Arc<dyn Adapter>,
}

impl Prober {
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self { adapter }
    }

    fn probe_request() -> TranslateRequest {
        TranslateRequest {
            text: "test".to_string(),
            source_lang: "en".to_string(),
            target_lang: "zh".to_string(),
            tag_handling: None,
        }
    }

    /// One test translation through the matching adapter. Alive iff the
    /// call yields a usable translation.
    pub async fn probe(&self, family: Family, upstream: &str) -> bool {
        let request = Self::probe_request();

        match self.adapter.translate(family, upstream, &request).await {
            Ok(_) => true,
            Err(error) => {
                match (&error, family) {
                    (ClientError::QuotaExceeded, _) => {
                        debug!(upstream, "deepl key has quota exceeded");
                    }
                    (ClientError::TooManyRequests, _) => {
                        debug!(upstream, "deepl key has too many requests");
                    }
                    (_, Family::Account) => {
                        debug!(upstream, error = %error, "deepl key is unavailable");
                    }
                    (_, Family::Endpoint) => {
                        debug!(upstream, error = %error, "deeplx url is unavailable");
                    }
                }
                false
            }
        }
    }
}
