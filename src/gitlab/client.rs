use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{PipewatchError, Result};

/// Items requested per page when walking a paginated endpoint.
pub(super) const PAGE_SIZE: u64 = 100;

/// Hard stop for pagination. The `x-next-page` header is the authoritative
/// termination signal; the cap bounds the walk against a server that keeps
/// advertising further pages.
pub(super) const MAX_PAGES: u64 = 1000;

/// All time-filtered queries look back this many days.
pub(super) const LOOKBACK_DAYS: i64 = 14;

/// GitLab server version, fetched once at client construction.
#[derive(Debug, Clone)]
pub struct ServerVersion {
    pub raw: String,
    pub major: u32,
}

/// REST client for the GitLab v4 API.
///
/// Wraps a shared `reqwest::Client` carrying the `PRIVATE-TOKEN` header and
/// an explicit per-request timeout. Fetch failures inside pagination and
/// single-resource lookups are logged and degrade to empty results so one
/// bad sub-fetch never aborts a whole dashboard refresh.
pub struct GitLabClient {
    client: reqwest::Client,
    api_url: String,
    version: Option<ServerVersion>,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Deserialize)]
struct NamedResource {
    name: String,
}

impl GitLabClient {
    /// Creates a client and probes the server version.
    ///
    /// # Arguments
    ///
    /// * `api_url` - API base URL including the version prefix
    ///   (e.g. <https://gitlab.com/api/v4>)
    /// * `token` - Optional private token
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or token is malformed or the HTTP
    /// client cannot be built. An unreachable `/version` endpoint is not an
    /// error; the version stays unknown and test-report fetching is skipped.
    pub async fn new(api_url: &str, token: Option<Token>, timeout: Duration) -> Result<Self> {
        Url::parse(api_url)
            .map_err(|e| PipewatchError::Config(format!("Invalid API base URL: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &token {
            let value = HeaderValue::from_str(token.as_str())
                .map_err(|e| PipewatchError::Config(format!("Invalid token: {e}")))?;
            headers.insert("PRIVATE-TOKEN", value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pipewatch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PipewatchError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut instance = Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            version: None,
        };
        instance.version = instance.fetch_version().await;

        Ok(instance)
    }

    pub fn version(&self) -> Option<&ServerVersion> {
        self.version.as_ref()
    }

    async fn fetch_version(&self) -> Option<ServerVersion> {
        let response: VersionResponse = self.get_json("/version").await?;
        let major = match response.version.split('.').next().and_then(|m| m.parse().ok()) {
            Some(major) => major,
            None => {
                warn!("Unparseable GitLab version: {}", response.version);
                return None;
            }
        };
        debug!("GitLab server version: {}", response.version);
        Some(ServerVersion {
            raw: response.version,
            major,
        })
    }

    /// Start of the look-back window, formatted for `updated_after`/`since`
    /// query parameters.
    pub(super) fn horizon() -> String {
        let horizon: DateTime<Utc> = Utc::now() - chrono::Duration::days(LOOKBACK_DAYS);
        horizon.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Fetches a single page of a list endpoint.
    ///
    /// Appends `page`/`per_page` to the endpoint, preserving any query
    /// string already present. Returns the decoded items plus the parsed
    /// `x-next-page` header; a missing, empty, or unparseable header comes
    /// back as `None`. Non-200 responses and decode failures are logged and
    /// yield no items.
    pub(super) async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        page: u64,
        per_page: u64,
    ) -> (Vec<T>, Option<u64>) {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}{}page={}&per_page={}",
            self.api_url, endpoint, separator, page, per_page
        );
        debug!("GitLab request: {url}");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("{endpoint}: {e}");
                return (Vec::new(), None);
            }
        };

        let next_page = response
            .headers()
            .get("x-next-page")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{endpoint}: status {status}: {body}");
            return (Vec::new(), None);
        }

        match response.json::<Vec<T>>().await {
            Ok(items) => (items, next_page),
            Err(e) => {
                error!("{endpoint}: failed to decode response: {e}");
                (Vec::new(), None)
            }
        }
    }

    /// Fetches every page of a list endpoint, concatenating items in page
    /// order.
    ///
    /// The walk stops when the server's `x-next-page` header is absent,
    /// empty, or does not advance past the current page, and unconditionally
    /// at [`MAX_PAGES`].
    pub(super) async fn get_all_pages<T: DeserializeOwned>(&self, endpoint: &str) -> Vec<T> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let (mut page_items, next_page) = self.get_page(endpoint, page, PAGE_SIZE).await;
            items.append(&mut page_items);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }

            if page > MAX_PAGES {
                warn!("{endpoint}: giving up pagination after {MAX_PAGES} pages");
                break;
            }
        }

        items
    }

    /// Issues one GET and decodes the body, turning non-200 responses into
    /// [`PipewatchError::Api`].
    async fn get_checked<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PipewatchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetches a single resource, logging failures and returning `None`
    /// instead of raising. Dashboard refreshes must keep going when one
    /// sub-fetch fails.
    pub(super) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Option<T> {
        let url = format!("{}{}", self.api_url, endpoint);
        debug!("GitLab request: {url}");

        match self.get_checked(&url).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!("{endpoint}: {e}");
                None
            }
        }
    }

    /// Group display name; empty when the lookup fails so callers can always
    /// render something.
    pub async fn group_name(&self, group_id: u64) -> String {
        self.get_json::<NamedResource>(&format!("/groups/{group_id}"))
            .await
            .map(|resource| resource.name)
            .unwrap_or_default()
    }

    /// Project display name; empty when the lookup fails.
    pub async fn project_name(&self, project_id: u64) -> String {
        self.get_json::<NamedResource>(&format!("/projects/{project_id}"))
            .await
            .map(|resource| resource.name)
            .unwrap_or_default()
    }
}
