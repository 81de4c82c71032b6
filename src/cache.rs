use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Last probe verdict for one uri.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub status: bool,
    pub observed_at: Instant,
}

impl CacheEntry {
    pub fn new(status: bool) -> Self {
        Self {
            status,
            observed_at: Instant::now(),
        }
    }

    /// Fresh while strictly younger than `ttl`, so a zero ttl is never fresh.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.observed_at.elapsed() < ttl
    }
}

/// Uri -> last verdict. Keys are the caller's text as given, not normalized.
///
/// Every access takes the lock for the duration of a single map operation
/// only; entries are replaced as whole values so a reader never sees a
/// half-written one.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_fresh(&self, uri: &str, ttl: Duration) -> Option<bool> {
        self.lock()
            .get(uri)
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.status)
    }

    pub fn get(&self, uri: &str) -> Option<CacheEntry> {
        self.lock().get(uri).copied()
    }

    pub fn insert(&self, uri: &str, status: bool) -> CacheEntry {
        let entry = CacheEntry::new(status);
        self.lock().insert(uri.to_string(), entry);
        entry
    }

    pub fn remove(&self, uri: &str) -> Option<CacheEntry> {
        self.lock().remove(uri)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the guard cannot leave a partial entry behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn zero_ttl_is_never_fresh() {
        let entry = CacheEntry::new(true);
        assert!(!entry.is_fresh(Duration::ZERO));
        assert!(entry.is_fresh(Duration::from_secs(300)));
    }

    #[test]
    fn freshness_is_judged_by_the_callers_ttl() {
        let cache = StatusCache::new();
        cache.insert("http://a.test", true);
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get_fresh("http://a.test", Duration::from_millis(10)), None);
        assert_eq!(cache.get_fresh("http://a.test", Duration::from_secs(60)), Some(true));
        // The stale verdict is still stored, only not served.
        assert!(cache.get("http://a.test").is_some());
    }

    #[test]
    fn keys_are_not_normalized() {
        let cache = StatusCache::new();
        cache.insert("http://a.test", false);
        assert_eq!(cache.get_fresh("http://a.test/", Duration::from_secs(60)), None);
        assert_eq!(cache.get_fresh("HTTP://a.test", Duration::from_secs(60)), None);
    }

    #[test]
    fn insert_overwrites_previous_entry() {
        let cache = StatusCache::new();
        let first = cache.insert("http://a.test", true);
        let second = cache.insert("http://a.test", false);

        assert!(second.observed_at >= first.observed_at);
        assert_eq!(cache.get("http://a.test"), Some(second));
    }

    #[test]
    fn remove_and_clear() {
        let cache = StatusCache::new();
        cache.insert("http://a.test", true);
        cache.insert("http://b.test", true);

        assert!(cache.remove("http://a.test").is_some());
        assert!(cache.remove("http://a.test").is_none());
        assert!(cache.get("http://b.test").is_some());

        cache.clear();
        assert!(cache.get("http://b.test").is_none());
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let cache = std::sync::Arc::new(StatusCache::new());
        cache.insert("http://a.test", true);

        let c = cache.clone();
        let _ = thread::spawn(move || {
            let _guard = c.entries.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert_eq!(cache.get_fresh("http://a.test", Duration::from_secs(60)), Some(true));
    }
}
