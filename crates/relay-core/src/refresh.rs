//! Pool refresh cycle
//!
//! One refresh re-reads the roster file, fans out a liveness probe per
//! configured upstream, waits for all probes, then atomically replaces
//! the pool's alive sets with the survivors. Only one refresh runs at a
//! time; a contending caller fails fast with `AlreadyRefreshing` rather
//! than queueing.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tracing::info;

use crate::adapter::Adapter;
use crate::error::CoreError;
use crate::pool::UpstreamPool;
use crate::probe::Prober;
use crate::roster::Roster;
use crate::types::Family;

/// Outcome of one completed refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total_keys: usize,
    pub alive_keys: usize,
    pub total_urls: usize,
    pub alive_urls: usize,
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all keys count:{}, available keys count:{}, all urls count:{}, available urls count:{}",
            self.total_keys, self.alive_keys, self.total_urls, self.alive_urls
        )
    }
}

/// Clears the in-progress flag on every exit path, including probe and
/// roster-read failures.
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Re-probes the full configured upstream list and commits the result
/// to the pool.
pub struct PoolRefresher {
    pool: Arc<UpstreamPool>,
    prober: Prober,
    roster_path: PathBuf,
    in_progress: AtomicBool,
}

impl PoolRefresher {
    pub fn new(pool: Arc<UpstreamPool>, adapter: Arc<dyn Adapter>, roster_path: PathBuf) -> Self {
        Self {
            pool,
            prober: Prober::new(adapter),
            roster_path,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Run one full refresh cycle. Fails immediately with
    /// `AlreadyRefreshing` when another refresh is in flight; the
    /// check-and-set is a single compare-exchange so two callers can
    /// never both win.
    pub async fn refresh(&self) -> Result<RefreshSummary, CoreError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::AlreadyRefreshing);
        }
        let _guard = InProgressGuard(&self.in_progress);

        let roster = Roster::load(&self.roster_path)?;

        // Fan out one probe per upstream; join_all is the completion
        // barrier before the new sets are committed.
        let key_probes = roster
            .keys
            .iter()
            .map(|key| async move { self.prober.probe(Family::Account, key).await });
        let url_probes = roster
            .urls
            .iter()
            .map(|url| async move { self.prober.probe(Family::Endpoint, url).await });

        let (key_results, url_results) =
            futures::join!(join_all(key_probes), join_all(url_probes));

        let alive_keys: Vec<String> = roster
            .keys
            .iter()
            .zip(key_results)
            .filter(|(_, alive)| *alive)
            .map(|(key, _)| key.clone())
            .collect();
        let alive_urls: Vec<String> = roster
            .urls
            .iter()
            .zip(url_results)
            .filter(|(_, alive)| *alive)
            .map(|(url, _)| url.clone())
            .collect();

        let summary = RefreshSummary {
            total_keys: roster.keys.len(),
            alive_keys: alive_keys.len(),
            total_urls: roster.urls.len(),
            alive_urls: alive_urls.len(),
        };

        self.pool.replace(alive_keys, alive_urls);

        info!(
            all_keys = summary.total_keys,
            available_keys = summary.alive_keys,
            all_urls = summary.total_urls,
            available_urls = summary.alive_urls,
            "available check"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_client::{ClientError, Translation};
    use std::io::Write;
    use std::time::Duration;

    use crate::types::TranslateRequest;

    /// Adapter whose probes succeed only for upstreams in the alive
    /// list, optionally after a delay.
    struct ScriptedAdapter {
        alive: Vec<String>,
        delay: Duration,
    }

    #[async_trait]
    impl Adapter for ScriptedAdapter {
        async fn translate(
            &self,
            _family: Family,
            upstream: &str,
            _request: &TranslateRequest,
        ) -> Result<Translation, ClientError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.alive.iter().any(|v| v == upstream) {
                Ok(Translation {
                    data: "测试".to_string(),
                    alternatives: vec![],
                })
            } else {
                Err(ClientError::Empty(String::new()))
            }
        }

        async fn fallback(&self, _request: &TranslateRequest) -> Result<String, ClientError> {
            unreachable!("refresh never falls back");
        }
    }

    fn roster_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn refresher(contents: &str, adapter: ScriptedAdapter) -> (Arc<PoolRefresher>, Arc<UpstreamPool>, tempfile::NamedTempFile) {
        let file = roster_file(contents);
        let pool = Arc::new(UpstreamPool::new());
        let refresher = Arc::new(PoolRefresher::new(
            pool.clone(),
            Arc::new(adapter),
            file.path().to_path_buf(),
        ));
        (refresher, pool, file)
    }

    #[tokio::test]
    async fn refresh_keeps_only_probe_survivors() {
        let (refresher, pool, _file) = refresher(
            "key-a\nkey-b\nhttp://relay-a\nhttp://relay-b\n",
            ScriptedAdapter {
                alive: vec!["key-b".to_string(), "http://relay-a".to_string()],
                delay: Duration::ZERO,
            },
        );

        let summary = refresher.refresh().await.unwrap();
        assert_eq!(
            summary,
            RefreshSummary {
                total_keys: 2,
                alive_keys: 1,
                total_urls: 2,
                alive_urls: 1,
            }
        );

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.keys, vec!["key-b"]);
        assert_eq!(snapshot.urls, vec!["http://relay-a"]);
    }

    #[tokio::test]
    async fn concurrent_refreshes_only_one_proceeds() {
        let (refresher, pool, _file) = refresher(
            "key-a\n",
            ScriptedAdapter {
                alive: vec!["key-a".to_string()],
                delay: Duration::from_millis(50),
            },
        );

        let (first, second) = tokio::join!(refresher.refresh(), async {
            // Give the first refresh time to take the flag.
            tokio::time::sleep(Duration::from_millis(10)).await;
            refresher.refresh().await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(CoreError::AlreadyRefreshing)));
        assert_eq!(pool.counts(), (1, 0));
    }

    #[tokio::test]
    async fn missing_roster_clears_flag_for_next_refresh() {
        let pool = Arc::new(UpstreamPool::new());
        pool.replace(vec!["stale-key".to_string()], vec![]);
        let refresher = PoolRefresher::new(
            pool.clone(),
            Arc::new(ScriptedAdapter {
                alive: vec![],
                delay: Duration::ZERO,
            }),
            PathBuf::from("/nonexistent/apis.txt"),
        );

        let first = refresher.refresh().await;
        assert!(matches!(first, Err(CoreError::ConfigUnavailable(_))));
        // Previous pool contents are retained on a failed refresh.
        assert_eq!(pool.counts(), (1, 0));
        // The in-progress flag was cleared on the error path.
        let second = refresher.refresh().await;
        assert!(matches!(second, Err(CoreError::ConfigUnavailable(_))));
    }

    #[tokio::test]
    async fn refresh_summary_formats_like_check_alive_body() {
        let summary = RefreshSummary {
            total_keys: 3,
            alive_keys: 2,
            total_urls: 1,
            alive_urls: 0,
        };
        assert_eq!(
            summary.to_string(),
            "all keys count:3, available keys count:2, all urls count:1, available urls count:0"
        );
    }
}
