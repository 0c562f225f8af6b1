//! Upstream pool
//!
//! Process-wide shared state holding the currently-alive upstreams, one
//! set per family. Any number of snapshot readers may proceed together;
//! a mutation (eviction or full replace) excludes readers and other
//! mutations. An upstream appears in at most one set, at most once:
//! the roster classifies each token into exactly one family, and the
//! refresher replaces both sets wholesale.

use parking_lot::RwLock;

use crate::types::Family;

#[derive(Debug, Default)]
struct AliveSets {
    keys: Vec<String>,
    urls: Vec<String>,
}

/// A read-consistent view of both alive sets.
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pub keys: Vec<String>,
    pub urls: Vec<String>,
}

impl PoolSnapshot {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.urls.is_empty()
    }
}

/// The set of currently-usable upstreams. Created empty; populated by
/// the first refresh; shrinks monotonically between refreshes as the
/// dispatch engine evicts confirmed failures.
#[derive(Debug, Default)]
pub struct UpstreamPool {
    inner: RwLock<AliveSets>,
}

impl UpstreamPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent snapshot of both alive sets.
    pub fn snapshot(&self) -> PoolSnapshot {
        let sets = self.inner.read();
        PoolSnapshot {
            keys: sets.keys.clone(),
            urls: sets.urls.clone(),
        }
    }

    /// Whether both alive sets are empty.
    pub fn is_empty(&self) -> bool {
        let sets = self.inner.read();
        sets.keys.is_empty() && sets.urls.is_empty()
    }

    /// Alive counts, `(keys, urls)`.
    pub fn counts(&self) -> (usize, usize) {
        let sets = self.inner.read();
        (sets.keys.len(), sets.urls.len())
    }

    /// Remove `upstream` from its family's alive set if still present.
    /// Idempotent: returns false when a concurrent caller already evicted
    /// it or a refresh replaced the set. Order within a set does not
    /// matter, so removal swaps with the last element.
    pub fn evict(&self, family: Family, upstream: &str) -> bool {
        let mut sets = self.inner.write();
        let set = match family {
            Family::Account => &mut sets.keys,
            Family::Endpoint => &mut sets.urls,
        };

        match set.iter().position(|v| v == upstream) {
            Some(index) => {
                set.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Atomically overwrite both alive sets with a fresh probe result.
    /// Only the pool refresher calls this.
    pub fn replace(&self, keys: Vec<String>, urls: Vec<String>) {
        let mut sets = self.inner.write();
        sets.keys = keys;
        sets.urls = urls;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_pool() -> UpstreamPool {
        let pool = UpstreamPool::new();
        pool.replace(
            vec!["key-a".to_string(), "key-b".to_string()],
            vec!["http://relay-a".to_string()],
        );
        pool
    }

    #[test]
    fn snapshot_reflects_replace() {
        let pool = populated_pool();
        let snapshot = pool.snapshot();
        assert_eq!(snapshot.keys, vec!["key-a", "key-b"]);
        assert_eq!(snapshot.urls, vec!["http://relay-a"]);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn evict_is_idempotent() {
        let pool = populated_pool();
        assert!(pool.evict(Family::Account, "key-a"));
        assert!(!pool.evict(Family::Account, "key-a"));
        assert_eq!(pool.counts(), (1, 1));
    }

    #[test]
    fn evict_respects_family() {
        let pool = populated_pool();
        assert!(!pool.evict(Family::Endpoint, "key-a"));
        assert!(pool.evict(Family::Account, "key-a"));
    }

    #[test]
    fn replace_restores_evicted_members() {
        let pool = populated_pool();
        pool.evict(Family::Account, "key-a");
        pool.evict(Family::Endpoint, "http://relay-a");
        pool.replace(vec!["key-a".to_string()], vec![]);
        let snapshot = pool.snapshot();
        assert_eq!(snapshot.keys, vec!["key-a"]);
        assert!(snapshot.urls.is_empty());
    }

    #[test]
    fn empty_pool_reports_empty() {
        let pool = UpstreamPool::new();
        assert!(pool.is_empty());
        assert!(pool.snapshot().is_empty());
        assert_eq!(pool.counts(), (0, 0));
    }
}
