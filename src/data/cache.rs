use std::time::{Duration, Instant};

use super::loader::{load, LoadOutcome};
use super::resolver::IndustryResolver;
use crate::config::DashboardConfig;

/// Time-bounded memo of the last successful load.
///
/// The table inside is an `Arc`, so handing the outcome to readers is a
/// pointer copy; a reload builds a fresh table and replaces the entry.
/// Failed loads are returned but not kept.
#[derive(Debug)]
pub struct DatasetCache {
    ttl: Duration,
    entry: Option<CachedLoad>,
}

#[derive(Debug)]
struct CachedLoad {
    loaded_at: Instant,
    outcome: LoadOutcome,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether a cached entry exists and is younger than the TTL at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.entry
            .as_ref()
            .map(|e| now.saturating_duration_since(e.loaded_at) < self.ttl)
            .unwrap_or(false)
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    /// Drop the cached entry so the next request reads the files again.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn get_or_load(
        &mut self,
        config: &DashboardConfig,
        resolver: &IndustryResolver,
    ) -> LoadOutcome {
        self.get_or_load_with(Instant::now(), || load(config, resolver))
    }

    /// Return the cached outcome if fresh at `now`, otherwise run `loader`.
    pub fn get_or_load_with(
        &mut self,
        now: Instant,
        loader: impl FnOnce() -> LoadOutcome,
    ) -> LoadOutcome {
        if self.is_fresh_at(now) {
            if let Some(entry) = &self.entry {
                log::debug!("reusing dataset loaded {:?} ago", now - entry.loaded_at);
                return entry.outcome.clone();
            }
        }

        let outcome = loader();
        self.entry = if outcome.is_loaded() {
            Some(CachedLoad {
                loaded_at: now,
                outcome: outcome.clone(),
            })
        } else {
            None
        };
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use super::*;
    use crate::data::model::UnifiedTable;

    fn loaded() -> LoadOutcome {
        LoadOutcome {
            table: Some(Arc::new(UnifiedTable::default())),
            status: "Data loaded: 0 records".into(),
            warnings: Vec::new(),
            error_category: None,
        }
    }

    fn failed() -> LoadOutcome {
        LoadOutcome {
            table: None,
            status: "missing".into(),
            warnings: Vec::new(),
            error_category: Some("PrimaryMissing"),
        }
    }

    #[test]
    fn fresh_entry_is_reused_and_shares_the_table() {
        let mut cache = DatasetCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);
        let start = Instant::now();

        let first = cache.get_or_load_with(start, || {
            calls.set(calls.get() + 1);
            loaded()
        });
        let second = cache.get_or_load_with(start + Duration::from_secs(30), || {
            calls.set(calls.get() + 1);
            loaded()
        });

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(
            first.table.as_ref().unwrap(),
            second.table.as_ref().unwrap()
        ));
    }

    #[test]
    fn expired_entry_is_reloaded() {
        let mut cache = DatasetCache::new(Duration::from_secs(60));
        let start = Instant::now();
        cache.get_or_load_with(start, loaded);
        assert!(!cache.is_fresh_at(start + Duration::from_secs(60)));

        let calls = Cell::new(0);
        cache.get_or_load_with(start + Duration::from_secs(61), || {
            calls.set(calls.get() + 1);
            loaded()
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = DatasetCache::new(Duration::from_secs(60));
        let start = Instant::now();
        let outcome = cache.get_or_load_with(start, failed);
        assert!(!outcome.is_loaded());
        assert!(!cache.is_fresh_at(start));

        cache.get_or_load_with(start, loaded);
        assert!(cache.is_fresh_at(start));
        cache.invalidate();
        assert!(!cache.is_fresh_at(start));
    }
}
