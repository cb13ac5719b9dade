//! HTTP adapter for the remote News API

use async_trait::async_trait;
use newsdesk_domain::{FetchError, NewsSource, RawArticle};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// News API client over HTTP
pub struct HttpNewsSource {
    client: Client,
    base_url: String,
}

impl HttpNewsSource {
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;

        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "unexpected status {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        // Misconfigured gateways serve HTML error pages with a 200 status.
        if looks_like_html(&body) {
            return Err(FetchError::Contract(
                "HTML document disguised as a JSON response".to_string(),
            ));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Contract(e.to_string()))
    }
}

#[derive(Deserialize)]
struct NewsListResponse {
    news: Vec<RawArticle>,
}

#[derive(Deserialize)]
struct ArticleResponse {
    article: RawArticle,
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    async fn all_news(&self) -> Result<Vec<RawArticle>, FetchError> {
        tracing::debug!("fetching all news");
        let response: NewsListResponse = self
            .get_json(format!("{}/news/lists", self.base_url))
            .await?;
        Ok(response.news)
    }

    async fn category_news(&self, category: &str) -> Result<Vec<RawArticle>, FetchError> {
        tracing::debug!(category, "fetching category news");
        let response: NewsListResponse = self
            .get_json(format!("{}/news/{}/lists", self.base_url, category))
            .await?;
        Ok(response.news)
    }

    async fn news_detail(&self, category: &str, id: &str) -> Result<RawArticle, FetchError> {
        tracing::debug!(category, id, "fetching article detail");
        let response: ArticleResponse = self
            .get_json(format!("{}/news/{}/{}", self.base_url, category, id))
            .await?;
        Ok(response.article)
    }
}

fn map_request_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(error.to_string())
    }
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(15).collect();
    let head = head.to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= 120 {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(120).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_all_news_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "news": [
                    {
                        "id": "n1",
                        "title": "First headline",
                        "publishedAt": "2024-01-15T12:00:00Z",
                        "imageUrl": "https://cdn.example.com/n1.jpg"
                    },
                    {
                        "id": 2,
                        "title": "Second headline"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let articles = source.all_news().await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id.as_deref(), Some("n1"));
        assert_eq!(articles[1].id.as_deref(), Some("2"));
        assert_eq!(
            articles[0].image_url.as_deref(),
            Some("https://cdn.example.com/n1.jpg")
        );
    }

    #[tokio::test]
    async fn test_category_news_hits_category_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/technology/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "news": [{"id": "t1", "title": "Tech story"}]
            })))
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let articles = source.category_news("technology").await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("Tech story"));
    }

    #[tokio::test]
    async fn test_news_detail_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/science/s9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "article": {
                    "id": "s9",
                    "title": "Deep dive",
                    "content": "Full body text"
                }
            })))
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let article = source.news_detail("science", "s9").await.unwrap();

        assert_eq!(article.id.as_deref(), Some("s9"));
        assert_eq!(article.content.as_deref(), Some("Full body text"));
    }

    #[tokio::test]
    async fn test_html_body_is_a_contract_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/lists"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html><html><body>maintenance</body></html>"),
            )
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let result = source.all_news().await;

        assert!(matches!(result, Err(FetchError::Contract(_))));
    }

    #[tokio::test]
    async fn test_missing_envelope_is_a_contract_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/lists"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let result = source.all_news().await;

        assert!(matches!(result, Err(FetchError::Contract(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_a_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/business/lists"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::new(mock_server.uri());
        let result = source.category_news("business").await;

        match result {
            Err(FetchError::Transport(message)) => assert!(message.contains("500")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/news/lists"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"news": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let source = HttpNewsSource::with_timeout(mock_server.uri(), Duration::from_millis(50));
        let result = source.all_news().await;

        assert!(matches!(result, Err(FetchError::Timeout)));
    }
}
