//! Background photo sources.
//!
//! Unsplash is used when an access key is configured; Picsum needs no key and
//! maps the keywords onto a deterministic seed.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{check_status, ImageSource};
use crate::error::ProducerError;

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn download(
    service: &str,
    request: reqwest::RequestBuilder,
) -> Result<Vec<u8>, ProducerError> {
    let response = check_status(service, request.send().await?)?;
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ProducerError::Upstream(format!("{service} returned an empty body")));
    }
    Ok(bytes.to_vec())
}

// == Unsplash ==
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    access_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    raw: String,
}

impl UnsplashClient {
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout),
        }
    }
}

#[async_trait]
impl ImageSource for UnsplashClient {
    async fn fetch_image(
        &self,
        keywords: &[String],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ProducerError> {
        let query = keywords.join(",");
        debug!(%query, "searching unsplash");

        let response = self
            .client
            .get(format!("{}/photos/random", self.base_url))
            .query(&[("query", query.as_str()), ("orientation", "squarish")])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await?;
        let photo: UnsplashPhoto = check_status("unsplash", response)?.json().await?;

        // The raw URL accepts imgix sizing parameters
        let request = self.client.get(&photo.urls.raw).query(&[
            ("w", width.to_string()),
            ("h", height.to_string()),
            ("fit", "crop".to_string()),
        ]);
        download("unsplash download", request).await
    }
}

// == Picsum ==
#[derive(Debug, Clone)]
pub struct PicsumClient {
    base_url: String,
    client: reqwest::Client,
}

impl PicsumClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout),
        }
    }

    /// Same keywords, same photo.
    fn seed(keywords: &[String]) -> String {
        let seed: Vec<String> = keywords
            .iter()
            .map(|k| {
                k.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|k| !k.is_empty())
            .collect();

        if seed.is_empty() {
            "quote".to_string()
        } else {
            seed.join("-")
        }
    }
}

#[async_trait]
impl ImageSource for PicsumClient {
    async fn fetch_image(
        &self,
        keywords: &[String],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ProducerError> {
        let url = format!(
            "{}/seed/{}/{}/{}",
            self.base_url,
            Self::seed(keywords),
            width,
            height
        );
        debug!(%url, "fetching picsum photo");
        download("picsum", self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unsplash_search_then_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/random"))
            .and(query_param("query", "city,night"))
            .and(header("Authorization", "Client-ID key123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "p1",
                "urls": {"raw": format!("{}/raw/p1", server.uri())}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/p1"))
            .and(query_param("w", "64"))
            .and(query_param("fit", "crop"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let client = UnsplashClient::new(server.uri(), "key123", Duration::from_secs(5));
        let bytes = client
            .fetch_image(&keywords(&["city", "night"]), 64, 64)
            .await
            .unwrap();

        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unsplash_rate_limit_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = UnsplashClient::new(server.uri(), "key", Duration::from_secs(5));
        let err = client.fetch_image(&keywords(&["sea"]), 8, 8).await.unwrap_err();

        assert!(matches!(err, ProducerError::Upstream(ref msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_picsum_uses_keyword_seed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seed/neon-city/32/48"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 4]))
            .mount(&server)
            .await;

        let client = PicsumClient::new(server.uri(), Duration::from_secs(5));
        let bytes = client
            .fetch_image(&keywords(&["Neon", "city!"]), 32, 48)
            .await
            .unwrap();

        assert_eq!(bytes.len(), 4);
    }

    #[tokio::test]
    async fn test_picsum_empty_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = PicsumClient::new(server.uri(), Duration::from_secs(5));
        let err = client.fetch_image(&[], 8, 8).await.unwrap_err();

        assert!(matches!(err, ProducerError::Upstream(_)));
    }

    #[test]
    fn test_seed_falls_back_for_empty_keywords() {
        assert_eq!(PicsumClient::seed(&[]), "quote");
        assert_eq!(PicsumClient::seed(&keywords(&["??"])), "quote");
        assert_eq!(PicsumClient::seed(&keywords(&["Deep", "Focus"])), "deep-focus");
    }
}
