use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::CredentialRotator;
use crate::config::Config;
use crate::error::Result;
use crate::news::category;
use crate::news::fetcher::{Endpoint, NewsFetcher};
use crate::news::validator::Validator;
use crate::news::NewsBatch;
use crate::storage::{CacheKey, CacheStats, ResponseCache};

/// Data-access facade for the news portal: probes the response cache,
/// falls back to the rotating fetcher, validates the payload, and caches
/// the validated result.
///
/// Every operation returns an empty [`NewsBatch`] instead of propagating
/// a failure past the data-access boundary; the underlying cause is
/// logged.
pub struct NewsService {
    fetcher: NewsFetcher,
    cache: ResponseCache<NewsBatch>,
    validator: Validator,
    page_size: usize,
}

impl NewsService {
    pub fn new(fetcher: NewsFetcher) -> Self {
        Self {
            fetcher,
            cache: ResponseCache::default(),
            validator: Validator::new(),
            page_size: 10,
        }
    }

    /// Build a service from configuration: rotator from the configured
    /// key list, fetcher against the configured base URL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let rotator = CredentialRotator::new(config.api.api_keys.clone())?;
        let fetcher = NewsFetcher::new(config.api.base_url.clone(), rotator)
            .with_timeout(Duration::from_secs(config.api.timeout))
            .with_user_agent(config.api.user_agent.clone());

        Ok(Self {
            fetcher,
            cache: ResponseCache::new(Duration::from_secs(config.cache.ttl_secs)),
            validator: Validator::new(),
            page_size: config.defaults.page_size,
        })
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ResponseCache::new(ttl);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Top headlines for a country/language.
    pub async fn top_headlines(&self, country: &str, lang: &str, page: usize) -> NewsBatch {
        let key = CacheKey::top_headlines(country, lang, page);
        let endpoint = Endpoint::TopHeadlines {
            country: country.to_string(),
            lang: lang.to_string(),
            page,
        };
        self.fetch_cached(key, endpoint).await
    }

    /// Headlines filtered to a topic. Unrecognized categories normalize
    /// to the default topic before any network call.
    pub async fn category_news(
        &self,
        category: &str,
        country: &str,
        lang: &str,
        page: usize,
    ) -> NewsBatch {
        let topic = category::normalize(category);
        let key = CacheKey::category(topic, country, lang, page);
        let endpoint = Endpoint::Category {
            topic: topic.to_string(),
            country: country.to_string(),
            lang: lang.to_string(),
            page,
        };
        self.fetch_cached(key, endpoint).await
    }

    /// Free-text search. The query is sanitized first; a blank or
    /// markup-only query returns an empty batch without touching the
    /// network.
    pub async fn search(&self, query: &str, lang: &str, page: usize) -> NewsBatch {
        let sanitized = self.validator.sanitize_text(query);
        if sanitized.is_empty() {
            debug!("Rejecting empty search query before network call");
            return NewsBatch::empty();
        }

        let key = CacheKey::search(&sanitized, lang, page);
        let endpoint = Endpoint::Search {
            query: sanitized,
            lang: lang.to_string(),
            page,
        };
        self.fetch_cached(key, endpoint).await
    }

    /// Fetch several categories concurrently, e.g. for a trending
    /// sidebar. Results are paired with the normalized topic names.
    pub async fn category_news_multi(
        &self,
        categories: &[&str],
        country: &str,
        lang: &str,
    ) -> Vec<(String, NewsBatch)> {
        let futures = categories.iter().map(|cat| {
            let topic = category::normalize(cat).to_string();
            async move {
                let batch = self.category_news(&topic, country, lang, 1).await;
                (topic, batch)
            }
        });

        futures::future::join_all(futures).await
    }

    /// Pagination end-detection heuristic: a batch smaller than the page
    /// size signals no further pages. The upstream API supplies no total
    /// count we can trust, so this is an approximation by design.
    pub fn has_more_pages(&self, batch: &NewsBatch) -> bool {
        batch.articles.len() >= self.page_size
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch_cached(&self, key: CacheKey, endpoint: Endpoint) -> NewsBatch {
        if let Some(batch) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return batch;
        }

        match self.fetcher.fetch(&endpoint).await {
            Ok(raw) => {
                let articles = self.validator.validate_articles(&raw.articles);
                let batch = NewsBatch::new(articles);
                self.cache.set(key, batch.clone());
                batch
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", key, e);
                NewsBatch::empty()
            }
        }
    }
}
