//! HTTP client for the property-management reviews API.
//!
//! Wraps `reqwest` with bearer-token auth, request/connect timeouts, and
//! typed response deserialization. The upstream wraps review rows in a
//! `{ "status": ..., "result": [...] }` envelope; a non-2xx HTTP status is
//! a fetch failure.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::FetchError;
use crate::types::{ApiReviewsResponse, RawReview};

/// Client for the upstream reviews endpoint.
///
/// The base URL comes from configuration, so tests point it at a
/// wiremock server.
pub struct ReviewsClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl ReviewsClient {
    /// Creates a new client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(api_key: &str, base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("revboard/0.1 (review-dashboard)")
            .build()?;

        // Normalise: the base URL must end with exactly one slash so that
        // Url::join appends the endpoint instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FetchError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches the raw review rows for an account, newest-first.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Http`] on network failure, timeout, or non-2xx
    ///   HTTP status.
    /// - [`FetchError::Deserialize`] if the body does not match the
    ///   expected envelope.
    pub async fn fetch_reviews(
        &self,
        account_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<RawReview>, FetchError> {
        let url = self.build_url(account_id, limit)?;

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let envelope: ApiReviewsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        Ok(envelope.result)
    }

    /// Builds the reviews URL with properly percent-encoded query
    /// parameters.
    fn build_url(&self, account_id: i64, limit: Option<usize>) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join("reviews")
            .map_err(|e| FetchError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("accountId", &account_id.to_string());
            pairs.append_pair("orderBy", "submittedAt");
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }
}
