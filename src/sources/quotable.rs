//! Quote source backed by the Quotable REST API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{check_status, Quote, QuoteSource};
use crate::error::ProducerError;

#[derive(Debug, Clone)]
pub struct QuotableClient {
    base_url: String,
    client: reqwest::Client,
}

impl QuotableClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl QuoteSource for QuotableClient {
    async fn fetch_quote(&self, tag: Option<&str>) -> Result<Quote, ProducerError> {
        let url = format!("{}/quotes/random", self.base_url);
        let mut request = self.client.get(&url).query(&[("limit", "1")]);
        if let Some(tag) = tag {
            request = request.query(&[("tags", tag)]);
        }

        debug!(?tag, "requesting quote");
        let response = check_status("quote api", request.send().await?)?;
        let quotes: Vec<Quote> = response.json().await?;

        quotes
            .into_iter()
            .find(|quote| !quote.content.trim().is_empty())
            .ok_or_else(|| match tag {
                Some(tag) => ProducerError::Upstream(format!("no quote tagged '{tag}'")),
                None => ProducerError::Upstream("quote api returned no quotes".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_tagged_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes/random"))
            .and(query_param("tags", "hustle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "_id": "abc",
                "content": "Work in silence, let the results make the noise.",
                "author": "Frank Ocean",
                "tags": ["hustle", "work"],
                "length": 48
            }])))
            .mount(&server)
            .await;

        let client = QuotableClient::new(server.uri(), Duration::from_secs(5));
        let quote = client.fetch_quote(Some("hustle")).await.unwrap();

        assert_eq!(quote.author, "Frank Ocean");
        assert_eq!(quote.tags, vec!["hustle", "work"]);
    }

    #[tokio::test]
    async fn test_empty_result_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quotes/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = QuotableClient::new(server.uri(), Duration::from_secs(5));
        let err = client.fetch_quote(Some("zzz")).await.unwrap_err();

        assert!(matches!(err, ProducerError::Upstream(ref msg) if msg.contains("zzz")));
    }

    #[tokio::test]
    async fn test_bad_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = QuotableClient::new(server.uri(), Duration::from_secs(5));
        let err = client.fetch_quote(None).await.unwrap_err();

        assert!(matches!(err, ProducerError::Upstream(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = QuotableClient::new(server.uri(), Duration::from_millis(100));
        let err = client.fetch_quote(None).await.unwrap_err();

        assert!(matches!(err, ProducerError::NetworkTimeout(_)));
    }
}
