use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};
use tracing::debug;

/// How many pages are kept at most
pub const MAX_ENTRIES: usize = 300;

/// Keeps rendered pages around for a little while.
///
/// Nothing invalidates an entry before it expires, except `clear`.
pub struct PageCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> PageCache {
        PageCache::with_capacity(ttl, MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> PageCache {
        PageCache {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key of a page: a prefix naming the view, and the requested page number
    pub fn key(prefix: &str, page: i64) -> String {
        format!("{}:{}", prefix, page)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some((stored, body)) if stored.elapsed() < self.ttl => {
                debug!("cache hit for {}", key);
                Some(body.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a page. Expired pages are dropped first, then the oldest ones
    /// if the cache is still full.
    pub fn insert(&self, key: String, body: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, (stored, _)| stored.elapsed() < ttl);
        while entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, (stored, _))| *stored)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(oldest) => entries.remove(&oldest),
                None => break,
            };
        }
        entries.insert(key, (Instant::now(), body));
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn serves_stale_pages_until_cleared() {
        let cache = PageCache::new(Duration::from_secs(20));
        let key = PageCache::key("index_page", 1);
        cache.insert(key.clone(), "render 1".to_owned());
        assert_eq!(cache.get(&key), Some("render 1".to_owned()));
        assert_eq!(cache.get(&key), Some("render 1".to_owned()));
        cache.clear();
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn pages_are_cached_separately() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.insert(PageCache::key("index_page", 1), "one".to_owned());
        cache.insert(PageCache::key("index_page", 2), "two".to_owned());
        assert_eq!(cache.get("index_page:1"), Some("one".to_owned()));
        assert_eq!(cache.get("index_page:2"), Some("two".to_owned()));
        assert_eq!(cache.get("index_page:3"), None);
    }

    #[test]
    fn entries_expire() {
        let cache = PageCache::new(Duration::from_millis(50));
        cache.insert("k".to_owned(), "v".to_owned());
        assert_eq!(cache.get("k"), Some("v".to_owned()));
        sleep(Duration::from_millis(80));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_insert() {
        let cache = PageCache::new(Duration::from_millis(20));
        for i in 0..250 {
            cache.insert(PageCache::key("index_page", i), "page".to_owned());
        }
        assert_eq!(cache.len(), 250);
        sleep(Duration::from_millis(50));
        cache.insert(PageCache::key("index_page", 1), "fresh".to_owned());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn oldest_entries_make_room() {
        let cache = PageCache::with_capacity(Duration::from_secs(20), 3);
        for i in 1..=3 {
            cache.insert(PageCache::key("index_page", i), i.to_string());
            sleep(Duration::from_millis(2));
        }
        cache.insert(PageCache::key("index_page", 4), "4".to_owned());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("index_page:1"), None);
        assert_eq!(cache.get("index_page:4"), Some("4".to_owned()));

        // replacing an entry doesn't evict anything
        cache.insert(PageCache::key("index_page", 4), "four".to_owned());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("index_page:2"), Some("2".to_owned()));
    }

    #[test]
    fn never_grows_past_capacity() {
        let cache = PageCache::with_capacity(Duration::from_secs(20), 10);
        for i in 0..1000 {
            cache.insert(PageCache::key("index_page", i), "page".to_owned());
        }
        assert_eq!(cache.len(), 10);
    }
}
