use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newsdesk::auth::CredentialRotator;
use newsdesk::news::fetcher::NewsFetcher;
use newsdesk::news::service::NewsService;

const HEADLINES_BODY: &str = r#"{
    "totalArticles": 3,
    "articles": [
        {
            "title": "<script>alert(1)</script>Markets rally",
            "description": "<p>Stocks climbed on <b>Friday</b></p>",
            "content": "Full text",
            "url": "https://news.example.com/markets",
            "image": "https://news.example.com/markets.jpg",
            "publishedAt": "2024-03-15T10:00:00Z",
            "source": {"name": "Example Wire", "url": "https://news.example.com"}
        },
        {
            "title": "Missing URL gets dropped",
            "description": "no url field"
        },
        {
            "title": "Broken image survives",
            "url": "https://news.example.com/second",
            "image": "not a url",
            "source": {"name": "Example Wire", "url": "::bad::"}
        }
    ]
}"#;

fn service_for(server: &MockServer, keys: &[&str]) -> NewsService {
    let rotator = CredentialRotator::new(keys.iter().map(|k| k.to_string()).collect()).unwrap();
    NewsService::new(NewsFetcher::new(server.uri(), rotator))
}

#[tokio::test]
async fn second_identical_request_hits_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "us"))
        .and(query_param("lang", "en"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);

    let first = service.top_headlines("us", "en", 1).await;
    let second = service.top_headlines("us", "en", 1).await;

    assert_eq!(first.total_articles, second.total_articles);
    assert_eq!(first.articles, second.articles);

    let stats = service.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn different_page_is_a_different_cache_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);

    service.top_headlines("us", "en", 1).await;
    service.top_headlines("us", "en", 2).await;
}

#[tokio::test]
async fn expired_entry_refetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]).with_cache_ttl(Duration::from_millis(10));

    service.top_headlines("us", "en", 1).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let batch = service.top_headlines("us", "en", 1).await;

    assert!(!batch.is_empty());
}

#[tokio::test]
async fn validation_runs_before_caching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);
    let batch = service.top_headlines("us", "en", 1).await;

    // Three raw records, one without a URL: two survive.
    assert_eq!(batch.total_articles, 2);

    let first = &batch.articles[0];
    assert_eq!(first.title, "Markets rally");
    assert_eq!(first.description, "Stocks climbed on Friday");

    let second = &batch.articles[1];
    assert_eq!(second.title, "Broken image survives");
    assert_eq!(second.image, "");
    assert_eq!(second.source.url, "");
}

#[tokio::test]
async fn rotation_tries_each_credential_once_then_returns_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["a", "b", "c"]);
    let batch = service.top_headlines("us", "en", 1).await;

    // Exhaustion surfaces as the uniform empty-batch failure signal.
    assert!(batch.is_empty());
}

#[tokio::test]
async fn rate_limited_key_is_skipped_for_later_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("token", "limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("token", "working"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["limited", "working"]);

    let first = service.top_headlines("us", "en", 1).await;
    assert!(!first.is_empty());

    // The cursor stayed on the working key, so an uncached request goes
    // straight to it without burning an attempt on the limited one.
    let second = service.top_headlines("us", "en", 2).await;
    assert!(!second.is_empty());
}

#[tokio::test]
async fn blank_search_never_reaches_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);

    assert!(service.search("   ", "en", 1).await.is_empty());
    assert!(service.search("<i></i>", "en", 1).await.is_empty());
}

#[tokio::test]
async fn search_sanitizes_query_before_requesting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);
    let batch = service.search("<b>bitcoin</b>", "en", 1).await;

    assert!(!batch.is_empty());
}

#[tokio::test]
async fn unrecognized_category_normalizes_to_general() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("topic", "general"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);
    let batch = service.category_news("foo", "us", "en", 1).await;

    assert!(!batch.is_empty());
}

#[tokio::test]
async fn wholly_malformed_batch_yields_empty_list_not_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"articles": [{"title": 1}, {"description": "no title"}]}"#,
        ))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);
    let batch = service.top_headlines("us", "en", 1).await;

    assert!(batch.is_empty());
    assert_eq!(batch.total_articles, 0);
}

#[tokio::test]
async fn concurrent_category_fetches_pair_results_with_topics() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HEADLINES_BODY))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server, &["key"]);
    let results = service
        .category_news_multi(&["technology", "sports"], "us", "en")
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "technology");
    assert_eq!(results[1].0, "sports");
    assert!(results.iter().all(|(_, batch)| !batch.is_empty()));
}
