use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use stash_core::{Cursor, Identity, ListingPage, PageRequest, Submission};
use stash_logging::{stash_debug, stash_warn};
use url::Url;

use crate::{FailureKind, FetchError, IdentityError, SyncEvent};

const RATELIMIT_RESET: &str = "x-ratelimit-reset";
const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub api_base_url: String,
    pub user_agent: String,
    /// Items per page; the platform caps this at 100.
    pub page_limit: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Wait used when a 429 names no duration.
    pub default_retry_after: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://oauth.reddit.com".to_string(),
            user_agent: concat!("stash/", env!("CARGO_PKG_VERSION")).to_string(),
            page_limit: 100,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 8 * 1024 * 1024,
            default_retry_after: Duration::from_secs(60),
        }
    }
}

pub trait UpdateSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

pub struct ChannelUpdateSink {
    tx: std::sync::mpsc::Sender<SyncEvent>,
}

impl ChannelUpdateSink {
    pub fn new(tx: std::sync::mpsc::Sender<SyncEvent>) -> Self {
        Self { tx }
    }
}

impl UpdateSink for ChannelUpdateSink {
    fn emit(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}

/// One page of the saved listing. Never retries; rate limits are reported.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ListingPage, FetchError>;
}

#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self) -> Result<Identity, IdentityError>;
}

#[derive(Deserialize)]
struct ListingEnvelope {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    after: Option<String>,
    dist: Option<usize>,
    #[serde(default)]
    children: Vec<Submission>,
}

#[derive(Deserialize)]
struct MeResponse {
    name: String,
}

/// Talks to the platform's OAuth API with a bearer credential obtained elsewhere.
#[derive(Debug, Clone)]
pub struct RedditClient {
    settings: SyncSettings,
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

impl RedditClient {
    pub fn new(settings: SyncSettings, token: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = Url::parse(&settings.api_base_url)
            .map_err(|err| FetchError::failed(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::failed(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be a base url"),
            ));
        }
        let client = Self::build_client(&settings)?;
        Ok(Self {
            settings,
            base_url,
            token: token.into(),
            client,
        })
    }

    fn build_client(settings: &SyncSettings) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::failed(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejected cannot-be-a-base urls, so this is always Ok.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn saved_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint(&["user", request.username.as_str(), "saved"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("limit", &self.settings.page_limit.clamp(1, 100).to_string())
                .append_pair("raw_json", "1");
            if let Some(after) = &request.after {
                query.append_pair("after", after.as_str());
            }
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        stash_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after_secs(response.headers())
                .unwrap_or_else(|| self.settings.default_retry_after.as_secs());
            return Err(FetchError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(FetchError::failed(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if header_secs(response.headers(), RATELIMIT_REMAINING) == Some(0) {
            stash_warn!("rate limit budget exhausted; next request may be throttled");
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::failed(FailureKind::Decode, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::failed(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl PageFetcher for RedditClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ListingPage, FetchError> {
        let envelope: ListingEnvelope = self.get_json(self.saved_url(request)).await?;
        let ListingData {
            after,
            dist,
            children,
        } = envelope.data;
        Ok(ListingPage {
            count: dist.unwrap_or(children.len()),
            submissions: children,
            after: after.filter(|token| !token.is_empty()).map(Cursor::new),
        })
    }
}

#[async_trait::async_trait]
impl IdentityResolver for RedditClient {
    async fn resolve_identity(&self) -> Result<Identity, IdentityError> {
        let me: MeResponse = self
            .get_json(self.endpoint(&["api", "v1", "me"]))
            .await
            .map_err(IdentityError)?;
        Ok(Identity { name: me.name })
    }
}

/// Seconds to wait from `Retry-After`, falling back to `X-Ratelimit-Reset`.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    header_secs(headers, RETRY_AFTER.as_str()).or_else(|| header_secs(headers, RATELIMIT_RESET))
}

fn header_secs(headers: &HeaderMap, name: &str) -> Option<u64> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    let secs: f64 = value.parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| secs.ceil() as u64)
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::failed(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::failed(FailureKind::Decode, err.to_string());
    }
    FetchError::failed(FailureKind::Network, err.to_string())
}
