//! API client for the Dog CEO REST API.
//!
//! This module provides the `ApiClient` struct for fetching the breed
//! taxonomy and random breed images.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::api::STATUS_SUCCESS;
use crate::models::{Breed, BreedsResponse, ImageResponse, ImagesResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the public Dog CEO API
pub const DEFAULT_BASE_URL: &str = "https://dog.ceo/api";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for dog.ceo.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a different base URL (mirrors, mock servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    fn ensure_success(status: &str) -> Result<()> {
        if status == STATUS_SUCCESS {
            Ok(())
        } else {
            Err(ApiError::unexpected_status(status).into())
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch every breed with its sub-breeds
    pub async fn fetch_all_breeds(&self) -> Result<Vec<Breed>> {
        let response: BreedsResponse = self.get("/breeds/list/all").await?;
        Self::ensure_success(&response.status)?;

        let breeds = response
            .into_breeds()
            .context("Failed to parse breed list")?;
        debug!(count = breeds.len(), "Fetched breed list");
        Ok(breeds)
    }

    /// Fetch a random image of any breed
    pub async fn fetch_random_image(&self) -> Result<String> {
        let response: ImageResponse = self.get("/breeds/image/random").await?;
        Self::ensure_success(&response.status)?;
        Ok(response.message)
    }

    /// Fetch a random image for a breed
    pub async fn fetch_random_breed_image(&self, breed: &str) -> Result<String> {
        let path = format!("/breed/{}/images/random", breed);
        let response: ImageResponse = self.get(&path).await?;
        Self::ensure_success(&response.status)?;
        Ok(response.message)
    }

    /// Fetch a random image scoped to a breed and one of its sub-breeds
    pub async fn fetch_random_sub_breed_image(&self, breed: &str, sub_breed: &str) -> Result<String> {
        let path = format!("/breed/{}/{}/images/random", breed, sub_breed);
        let response: ImageResponse = self.get(&path).await?;
        Self::ensure_success(&response.status)?;
        Ok(response.message)
    }

    /// Fetch every image URL the API has for a breed
    pub async fn fetch_breed_images(&self, breed: &str) -> Result<Vec<String>> {
        let path = format!("/breed/{}/images", breed);
        let response: ImagesResponse = self.get(&path).await?;
        Self::ensure_success(&response.status)?;
        debug!(breed = breed, count = response.message.len(), "Fetched breed images");
        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(server.uri()).expect("client should build")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::with_base_url("http://localhost:1234/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/api");
    }

    #[tokio::test]
    async fn test_fetch_all_breeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {
                    "beagle": [],
                    "bulldog": ["english", "french"],
                    "terrier": ["scottish", "yorkshire"]
                },
                "status": "success"
            })))
            .mount(&server)
            .await;

        let breeds = client_for(&server).await.fetch_all_breeds().await.unwrap();
        assert_eq!(breeds.len(), 3);
        assert_eq!(breeds[0], Breed::new("beagle"));
        assert_eq!(breeds[1].name, "bulldog");
        assert_eq!(breeds[1].sub_breeds, vec!["english", "french"]);
        assert_eq!(breeds[2].sub_breeds, vec!["scottish", "yorkshire"]);
    }

    #[tokio::test]
    async fn test_fetch_breed_and_sub_breed_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/hound/images/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/hound-basset/1.jpg",
                "status": "success"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/breed/hound/afghan/images/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/hound-afghan/2.jpg",
                "status": "success"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(
            client.fetch_random_breed_image("hound").await.unwrap(),
            "https://images.dog.ceo/breeds/hound-basset/1.jpg"
        );
        assert_eq!(
            client.fetch_random_sub_breed_image("hound", "afghan").await.unwrap(),
            "https://images.dog.ceo/breeds/hound-afghan/2.jpg"
        );
    }

    #[tokio::test]
    async fn test_fetch_random_image_and_breed_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/image/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/pug/3.jpg",
                "status": "success"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/breed/pug/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": ["https://images.dog.ceo/breeds/pug/1.jpg", "https://images.dog.ceo/breeds/pug/2.jpg"],
                "status": "success"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.fetch_random_image().await.unwrap().ends_with("pug/3.jpg"));
        assert_eq!(client.fetch_breed_images("pug").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_not_found_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/unicorn/images/random"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "status": "error",
                "message": "Breed not found (main breed does not exist)",
                "code": 404
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch_random_breed_image("unicorn")
            .await
            .unwrap_err();
        let api_err = err.downcast_ref::<ApiError>().expect("should be an ApiError");
        assert!(matches!(api_err, ApiError::NotFound(body) if body.contains("Breed not found")));
    }

    #[tokio::test]
    async fn test_non_success_status_field_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/image/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "",
                "status": "error"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_random_image().await.unwrap_err();
        assert!(err.to_string().contains("status \"error\""));
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_all_breeds().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON response"));
        // The decode failure stays in the chain under the context
        assert!(format!("{:#}", err).contains("error decoding response body"));
    }
}
