//! Request dispatch and failover
//!
//! Per incoming request the engine picks a family and a member from a
//! fresh pool snapshot, invokes the matching adapter, and on failure
//! evicts the failed upstream and retries. Retries continue until an
//! upstream succeeds or the pool is exhausted and an on-demand refresh
//! yields nothing; there is deliberately no retry cap, since each
//! failed attempt shrinks the pool. When completeness verification is
//! enabled, output with no Han characters escalates first to a forced
//! account-family retry and then to the Google fallback.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use rand::Rng;
use regex::Regex;
use relay_client::Translation;
use tracing::{debug, warn};

use crate::adapter::Adapter;
use crate::error::CoreError;
use crate::pool::{PoolSnapshot, UpstreamPool};
use crate::refresh::PoolRefresher;
use crate::types::{Family, TranslateRequest};

/// Target-script completeness heuristic: a translation into Chinese
/// that contains no Han character is a silently-untranslated
/// passthrough from the upstream.
fn contains_han(text: &str) -> bool {
    static HAN: OnceLock<Regex> = OnceLock::new();
    HAN.get_or_init(|| Regex::new(r"\p{Han}").unwrap())
        .is_match(text)
}

pub struct DispatchEngine {
    pool: Arc<UpstreamPool>,
    refresher: Arc<PoolRefresher>,
    adapter: Arc<dyn Adapter>,
    verify_completeness: bool,
}

impl DispatchEngine {
    pub fn new(
        pool: Arc<UpstreamPool>,
        refresher: Arc<PoolRefresher>,
        adapter: Arc<dyn Adapter>,
        verify_completeness: bool,
    ) -> Self {
        Self {
            pool,
            refresher,
            adapter,
            verify_completeness,
        }
    }

    /// Translate one request, failing over across upstreams as needed.
    pub async fn translate(&self, request: &TranslateRequest) -> Result<Translation, CoreError> {
        let started = Instant::now();
        // One-shot override set by the completeness check; consumed by
        // the single retry it triggers.
        let mut force_account = false;
        let mut forced_once = false;

        loop {
            self.ensure_pool_populated().await?;

            let snapshot = self.pool.snapshot();
            if snapshot.is_empty() {
                // Concurrent evictions drained the pool between the
                // populated check and the snapshot; refresh again.
                continue;
            }

            let family = Self::select_family(&snapshot, force_account);
            force_account = false;

            let upstream = Self::select_upstream(&snapshot, family).to_string();

            let mut translation = match self.adapter.translate(family, &upstream, request).await {
                Ok(translation) => translation,
                Err(error) => {
                    // A concurrent caller may have evicted it already;
                    // that is not an error.
                    if self.pool.evict(family, &upstream) {
                        warn!(
                            family = family.as_str(),
                            upstream = %upstream,
                            error = %error,
                            text = %request.text,
                            latency = ?started.elapsed(),
                            "removed unavailable upstream, retranslating"
                        );
                    }
                    continue;
                }
            };

            if self.verify_completeness && !contains_han(&translation.data) {
                // The output, not the upstream, is suspect here; nothing
                // is evicted on this path.
                if family == Family::Endpoint
                    && !forced_once
                    && !self.pool.snapshot().keys.is_empty()
                {
                    debug!(
                        text = %translation.data,
                        url = %upstream,
                        latency = ?started.elapsed(),
                        "detected missing translation, forcing account upstream"
                    );
                    force_account = true;
                    forced_once = true;
                    continue;
                }

                debug!(
                    text = %translation.data,
                    latency = ?started.elapsed(),
                    "missing translation from primary upstreams, trying fallback"
                );

                match self.adapter.fallback(request).await {
                    Ok(text) => translation.data = text,
                    Err(error) => {
                        // Non-fatal: degrade to the best primary result.
                        warn!(
                            error = %error,
                            latency = ?started.elapsed(),
                            "fallback translation failed"
                        );
                    }
                }
            }

            debug!(
                text = %translation.data,
                family = family.as_str(),
                upstream = %upstream,
                latency = ?started.elapsed(),
                "translation served"
            );

            return Ok(translation);
        }
    }

    /// Trigger a synchronous refresh when both alive sets are empty.
    /// `AlreadyRefreshing` propagates so the caller can report the
    /// service as busy rather than waiting on someone else's cycle.
    async fn ensure_pool_populated(&self) -> Result<(), CoreError> {
        if !self.pool.is_empty() {
            return Ok(());
        }

        debug!("no available keys and urls, start rechecking");
        self.refresher.refresh().await?;

        if self.pool.is_empty() {
            return Err(CoreError::NoUpstreams);
        }
        Ok(())
    }

    /// Family choice. A forced account override applies only while the
    /// account set is still populated; availability is re-checked here
    /// rather than trusted from when the override was set.
    fn select_family(snapshot: &PoolSnapshot, force_account: bool) -> Family {
        if force_account && !snapshot.keys.is_empty() {
            return Family::Account;
        }

        if !snapshot.keys.is_empty() && !snapshot.urls.is_empty() {
            if rand::thread_rng().gen_range(0..2) == 0 {
                Family::Account
            } else {
                Family::Endpoint
            }
        } else if snapshot.keys.is_empty() {
            Family::Endpoint
        } else {
            Family::Account
        }
    }

    /// Uniform random member of the chosen family's alive set. The
    /// snapshot is taken fresh each attempt, so an evicted upstream is
    /// never reselected from a stale list.
    fn select_upstream(snapshot: &PoolSnapshot, family: Family) -> &str {
        let set = match family {
            Family::Account => &snapshot.keys,
            Family::Endpoint => &snapshot.urls,
        };
        &set[rand::thread_rng().gen_range(0..set.len())]
    }
}
