//! HTTP client for the Steam Community host
//!
//! Provides one entry point, [`CommunityHttpClient::get`], that:
//! - builds the URL from path segments against the configured host
//! - waits on the shared [`HostPacer`] before every attempt
//! - retries transient failures per [`RetryPolicy`]
//! - reads the whole body under the client's timeouts

use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::retry::{fetch_with_retry, RetryPolicy};
use super::{FetcherError, FetcherResult, HttpResponse};
use crate::collector::config::{
    CollectorConfig, HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS, USER_AGENT,
};
use crate::collector::rate_limit::HostPacer;

/// Build the shared reqwest client with explicit timeouts
///
/// Both a connect timeout and an overall timeout are set so no request can
/// hang; a timed out attempt is retried like any other network failure.
pub fn build_http_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> FetcherResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| FetcherError::NetworkError(format!("failed to build HTTP client: {e}")))
}

/// Paced, retrying HTTP client bound to one host
#[derive(Clone)]
pub struct CommunityHttpClient {
    client: Arc<Client>,
    base_url: Url,
    pacer: Arc<HostPacer>,
    retry: RetryPolicy,
}

impl CommunityHttpClient {
    /// Create a client from shared parts
    ///
    /// # Arguments
    /// * `client` - Shared reqwest client
    /// * `base_url` - Host root, e.g. `https://steamcommunity.com`
    /// * `pacer` - Pacer shared by every worker talking to this host
    /// * `retry` - Backoff policy
    pub fn new(
        client: Arc<Client>,
        base_url: &str,
        pacer: Arc<HostPacer>,
        retry: RetryPolicy,
    ) -> FetcherResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FetcherError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetcherError::InvalidUrl(format!(
                "{base_url}: not a hierarchical URL"
            )));
        }

        Ok(Self {
            client,
            base_url,
            pacer,
            retry,
        })
    }

    /// Create a client with a fresh reqwest client and pacer from configuration
    pub fn from_config(config: &CollectorConfig) -> FetcherResult<Self> {
        let client = build_http_client(config.connect_timeout, config.request_timeout)?;
        Self::new(
            Arc::new(client),
            &config.base_url,
            Arc::new(HostPacer::new(config.base_delay)),
            RetryPolicy::with_max_attempts(config.max_attempts),
        )
    }

    /// Client for a local test server: default timeouts, no pacing, fast retries
    pub fn unpaced(base_url: &str, max_attempts: u32) -> FetcherResult<Self> {
        let client = build_http_client(
            Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
        )?;
        Self::new(
            Arc::new(client),
            base_url,
            Arc::new(HostPacer::unpaced()),
            RetryPolicy::immediate(max_attempts),
        )
    }

    /// Host root this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared pacer
    pub fn pacer(&self) -> &Arc<HostPacer> {
        &self.pacer
    }

    /// The retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build `base/segment/segment?query`
    ///
    /// Segments are percent-encoded, so vanity names cannot escape the path.
    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> FetcherResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetcherError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Paced, retried GET
    ///
    /// Any status is returned as a response (after retries for transient
    /// ones); only transport failures surviving every attempt are errors.
    pub async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> FetcherResult<HttpResponse> {
        let url = self.url(segments, query)?;
        let endpoint = url.to_string();
        debug!(url = %endpoint, "GET");

        fetch_with_retry(&self.retry, &endpoint, move || self.send_once(url.clone())).await
    }

    async fn send_once(&self, url: Url) -> FetcherResult<HttpResponse> {
        self.pacer.wait().await;

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetcherError {
    if err.is_timeout() {
        FetcherError::Timeout(err.to_string())
    } else {
        FetcherError::NetworkError(err.to_string())
    }
}
