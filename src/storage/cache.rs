use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;

/// Default time-to-live for cached responses: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Cache entry with expiration tracking.
///
/// An entry whose `expires_at` has passed is logically absent; reads evict
/// it rather than returning it.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: SystemTime,
    pub expires_at: SystemTime,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            value,
            stored_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }

    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.stored_at)
            .unwrap_or_default()
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}

/// Deterministic cache key for a logical API request: endpoint kind plus
/// normalized parameters plus page. Identical effective parameters always
/// produce identical keys. Parameter values are form-encoded so a value
/// containing the separator cannot collide with a different parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn top_headlines(country: &str, lang: &str, page: usize) -> Self {
        Self::build(
            "top-headlines",
            &[("country", country), ("lang", lang), ("page", &page.to_string())],
        )
    }

    pub fn category(category: &str, country: &str, lang: &str, page: usize) -> Self {
        Self::build(
            "category",
            &[
                ("topic", category),
                ("country", country),
                ("lang", lang),
                ("page", &page.to_string()),
            ],
        )
    }

    pub fn search(query: &str, lang: &str, page: usize) -> Self {
        Self::build(
            "search",
            &[("q", query), ("lang", lang), ("page", &page.to_string())],
        )
    }

    fn build(endpoint: &str, params: &[(&str, &str)]) -> Self {
        let mut encoded = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in params {
            encoded.append_pair(name, value);
        }
        Self(format!("{}?{}", endpoint, encoded.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory TTL cache for API responses.
///
/// Eviction is lazy: expired entries are removed when `get` or `has`
/// touches them, never by a background sweep. No read ever returns an
/// expired value.
#[derive(Clone)]
pub struct ResponseCache<T> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<T>>>>,
    stats: Arc<RwLock<CacheStats>>,
    default_ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            default_ttl,
        }
    }

    /// Store a value under `key` with the default TTL, overwriting any
    /// prior entry. Always succeeds.
    pub fn set(&self, key: CacheKey, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with a custom TTL.
    pub fn set_with_ttl(&self, key: CacheKey, value: T, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        entries.insert(key, entry);
        stats.total_entries = entries.len();
    }

    /// Get a value if present and unexpired; evicts a stale entry as a
    /// side effect.
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                stats.record_expiration();
                stats.record_miss();
                stats.total_entries = entries.len();
                return None;
            }

            stats.record_hit();
            Some(entry.value.clone())
        } else {
            stats.record_miss();
            None
        }
    }

    /// Presence check with the same expiry semantics as `get`, including
    /// eviction of stale entries.
    pub fn has(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                stats.record_expiration();
                stats.total_entries = entries.len();
                return false;
            }
            true
        } else {
            false
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        entries.clear();
        stats.total_entries = 0;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache: ResponseCache<String> = ResponseCache::default();
        let key = CacheKey::top_headlines("us", "en", 1);

        cache.set(key.clone(), "payload".to_string());
        assert_eq!(cache.get(&key), Some("payload".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache: ResponseCache<String> = ResponseCache::default();
        let key = CacheKey::search("rust", "en", 1);

        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache: ResponseCache<String> = ResponseCache::default();
        let key = CacheKey::top_headlines("us", "en", 1);

        cache.set(key.clone(), "old".to_string());
        cache.set(key.clone(), "new".to_string());

        assert_eq!(cache.get(&key), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expiry_evicts_lazily() {
        let cache: ResponseCache<String> = ResponseCache::default();
        let key = CacheKey::top_headlines("us", "en", 1);

        cache.set_with_ttl(key.clone(), "payload".to_string(), Duration::from_millis(10));
        assert_eq!(cache.get(&key), Some("payload".to_string()));

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_has_agrees_with_get() {
        let cache: ResponseCache<String> = ResponseCache::default();
        let key = CacheKey::category("technology", "us", "en", 1);

        assert!(!cache.has(&key));

        cache.set_with_ttl(key.clone(), "payload".to_string(), Duration::from_millis(10));
        assert!(cache.has(&key));

        std::thread::sleep(Duration::from_millis(20));

        // has() evicts on staleness just like get()
        assert!(!cache.has(&key));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn test_clear() {
        let cache: ResponseCache<String> = ResponseCache::default();
        cache.set(CacheKey::top_headlines("us", "en", 1), "a".to_string());
        cache.set(CacheKey::top_headlines("us", "en", 2), "b".to_string());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_do_not_collide_across_endpoints() {
        let headlines = CacheKey::top_headlines("us", "en", 1);
        let category = CacheKey::category("us", "en", "1", 1);
        let search = CacheKey::search("us-en", "1", 1);

        assert_ne!(headlines, category);
        assert_ne!(headlines, search);
        assert_ne!(category, search);
    }

    #[test]
    fn test_separator_in_value_cannot_collide() {
        // "a-b"/"en" and "a"/"b-en" must map to distinct keys.
        assert_ne!(
            CacheKey::search("a-b", "en", 1),
            CacheKey::search("a", "b-en", 1)
        );
    }

    #[test]
    fn test_identical_params_produce_identical_keys() {
        assert_eq!(
            CacheKey::search("bitcoin", "en", 2),
            CacheKey::search("bitcoin", "en", 2)
        );
        assert_ne!(
            CacheKey::search("bitcoin", "en", 2),
            CacheKey::search("bitcoin", "en", 3)
        );
    }

    #[test]
    fn test_entry_invariant() {
        let entry = CacheEntry::new("v", Duration::from_secs(60));
        assert!(entry.expires_at > entry.stored_at);
        assert!(!entry.is_expired());
    }
}
