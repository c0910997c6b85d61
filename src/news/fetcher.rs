use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::CredentialRotator;
use crate::error::{Error, Result};
use crate::news::RawResponse;

/// A logical API request before any credential is attached.
#[derive(Debug, Clone)]
pub enum Endpoint {
    TopHeadlines {
        country: String,
        lang: String,
        page: usize,
    },
    Category {
        topic: String,
        country: String,
        lang: String,
        page: usize,
    },
    Search {
        query: String,
        lang: String,
        page: usize,
    },
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::TopHeadlines { .. } | Endpoint::Category { .. } => "top-headlines",
            Endpoint::Search { .. } => "search",
        }
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::TopHeadlines {
                country,
                lang,
                page,
            } => vec![
                ("country", country.clone()),
                ("lang", lang.clone()),
                ("page", page.to_string()),
            ],
            Endpoint::Category {
                topic,
                country,
                lang,
                page,
            } => vec![
                ("topic", topic.clone()),
                ("country", country.clone()),
                ("lang", lang.clone()),
                ("page", page.to_string()),
            ],
            Endpoint::Search { query, lang, page } => vec![
                ("q", query.clone()),
                ("lang", lang.clone()),
                ("page", page.to_string()),
            ],
        }
    }
}

/// HTTP fetcher that retries rate-limited requests across a rotating set
/// of API credentials.
///
/// The rotator is injected and may be shared: its cursor position persists
/// across calls, so a request that exhausted some credentials leaves later
/// requests starting past them.
#[derive(Debug, Clone)]
pub struct NewsFetcher {
    client: Client,
    base_url: String,
    rotator: CredentialRotator,
    user_agent: String,
}

impl NewsFetcher {
    pub fn new(base_url: impl Into<String>, rotator: CredentialRotator) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            rotator,
            user_agent: format!("newsdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn rotator(&self) -> &CredentialRotator {
        &self.rotator
    }

    /// Issue a request, rotating to the next credential on 429/403 or any
    /// other failure, until every credential has been tried once.
    ///
    /// A 2xx response returns immediately without advancing the cursor.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<RawResponse> {
        let attempts = self.rotator.len();
        let mut last_error: Option<Error> = None;

        for attempt in 1..=attempts {
            let token = self.rotator.current();
            let url = self.request_url(endpoint, &token)?;
            debug!(
                "Fetching {} (attempt {}/{})",
                endpoint.path(),
                attempt,
                attempts
            );

            match self
                .client
                .get(url)
                .header("User-Agent", &self.user_agent)
                .header("Accept", "application/json")
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<RawResponse>().await.map_err(|e| {
                            Error::HttpError(format!("Failed to decode response body: {}", e))
                        });
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
                        warn!(
                            "Credential rejected with HTTP {} on attempt {}/{}, rotating",
                            status.as_u16(),
                            attempt,
                            attempts
                        );
                        last_error = Some(Error::RateLimited(format!(
                            "HTTP {} for {}",
                            status.as_u16(),
                            endpoint.path()
                        )));
                    } else {
                        warn!(
                            "HTTP {} on attempt {}/{}, rotating",
                            status.as_u16(),
                            attempt,
                            attempts
                        );
                        last_error = Some(Error::HttpError(format!(
                            "HTTP {} for {}: {}",
                            status.as_u16(),
                            endpoint.path(),
                            status.canonical_reason().unwrap_or("Unknown error")
                        )));
                    }
                }
                Err(e) => {
                    warn!("Request failed on attempt {}/{}: {}", attempt, attempts, e);
                    last_error = Some(Error::HttpError(format!("Request failed: {}", e)));
                }
            }

            self.rotator.advance();
        }

        let cause = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(Error::CredentialsExhausted(format!(
            "All {} credentials failed for {}: {}",
            attempts,
            endpoint.path(),
            cause
        )))
    }

    fn request_url(&self, endpoint: &Endpoint, token: &str) -> Result<url::Url> {
        let mut params = endpoint.query_params();
        params.push(("token", token.to_string()));

        let base = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.path()
        );
        url::Url::parse_with_params(&base, &params)
            .map_err(|e| Error::InvalidUrl(format!("Invalid request URL: {}", e)))
    }
}
