pub mod cache;
pub mod recent;

pub use cache::{CacheEntry, CacheKey, CacheStats, ResponseCache, DEFAULT_TTL};
pub use recent::{
    FileStore, KeyValueStore, MemoryStore, RecentSearches, MAX_RECENT_SEARCHES,
    RECENT_SEARCHES_KEY,
};
