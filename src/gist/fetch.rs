// src/gist/fetch.rs
// =============================================================================
// The HTTP side of the library: a small client that knows the Gist API's
// URL layout and how to turn a response into text or a decoded envelope.
//
// Endpoints (all relative to the configured base URL):
//   api/v1/json/{id}              metadata for one gist
//   api/v1/json/gists/{username}  listing of a user's public gists
//   raw/{id}/{filename}           raw content of one file
//   {id}, {id}.js, {id}.json      derived page / embed / json URLs
//
// Rust concepts:
// - Builder pattern: ClientBuilder collects options, build() validates them
// - Clone: reqwest::Client is reference counted, so cloning is cheap and
//   every Gist can carry its own handle
// - DeserializeOwned: lets get_json() decode into any serde type
// =============================================================================

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{GistError, RemoteReason};

/// Where the original service lived.
pub const DEFAULT_BASE_URL: &str = "http://gist.github.com";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for a [`GistClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("gistapi/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Builds a [`GistClient`] from a [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Validates the base URL and creates the underlying HTTP client.
    pub fn build(self) -> Result<GistClient, GistError> {
        GistClient::from_config(self.config)
    }
}

/// Handle used for every request to the Gist API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct GistClient {
    http: Client,
    base: Url,
}

impl GistClient {
    /// A client pointed at [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self, GistError> {
        Self::from_config(ClientConfig::default())
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, GistError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            GistError::InvalidInput(format!("base url '{}': {}", config.base_url, e))
        })?;

        // We build every endpoint by appending path segments, which is
        // impossible for URLs like `mailto:` or `data:`.
        if base.cannot_be_a_base() {
            return Err(GistError::InvalidInput(format!(
                "base url '{}' cannot have paths appended",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| GistError::InvalidInput(format!("http client: {}", e)))?;

        Ok(Self { http, base })
    }

    /// The base URL every endpoint hangs off.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // Appends path segments to the base URL, percent-encoding each one.
    // Empty trailing segments are dropped first so "http://host/" and
    // "http://host" behave the same.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn page_url(&self, id: &str) -> String {
        self.endpoint(&[id]).to_string()
    }

    pub(crate) fn embed_url(&self, id: &str) -> String {
        self.endpoint(&[format!("{}.js", id).as_str()]).to_string()
    }

    pub(crate) fn json_url(&self, id: &str) -> String {
        self.endpoint(&[format!("{}.json", id).as_str()]).to_string()
    }

    pub(crate) fn metadata_url(&self, id: &str) -> Url {
        self.endpoint(&["api", "v1", "json", id])
    }

    pub(crate) fn user_listing_url(&self, username: &str) -> Url {
        self.endpoint(&["api", "v1", "json", "gists", username])
    }

    pub(crate) fn raw_file_url(&self, id: &str, filename: &str) -> Url {
        self.endpoint(&["raw", id, filename])
    }

    // Fetches a URL and returns its body as text.
    //
    // Any non-2xx status is an error; we never try to read a body from a
    // failed response.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, GistError> {
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| GistError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GistError::remote(url.as_str(), RemoteReason::Status(status)));
        }

        response
            .text()
            .await
            .map_err(|e| GistError::from_reqwest(url.as_str(), e))
    }

    // Fetches a URL and decodes the body as JSON into `T`.
    //
    // We read the body as text first and hand it to serde_json ourselves,
    // so a bad body is always a Decode error and never a reqwest one.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GistError> {
        let body = self.get_text(url.clone()).await?;
        serde_json::from_str(&body).map_err(|e| GistError::decode(url.as_str(), e))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why path_segments_mut() instead of format!()?
//    - Filenames can contain spaces, '#', '?' and other characters that
//      would break a URL built with format!
//    - extend() percent-encodes each segment for us
//
// 2. Why does endpoint() not return a Result?
//    - path_segments_mut() only fails for "cannot be a base" URLs
//    - from_config() already rejected those, so the if-let always matches
//
// 3. What is concat!/env!?
//    - Compile-time macros: env!("CARGO_PKG_VERSION") is the version from
//      Cargo.toml, concat! glues string literals together
// -----------------------------------------------------------------------------
