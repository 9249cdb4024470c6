pub mod query;
pub mod summary;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::settings::Settings;

/// Query-string parameters for one action API request.
pub type QueryParams = BTreeMap<String, String>;

/// The two upstream wiki endpoints the pipeline reads from.
///
/// Both methods return the decoded JSON body; shaping it into typed records
/// happens in [`summary`] and [`query`] so fakes only need to hand back JSON.
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// One-shot REST page summary for `title`.
    async fn summary(&self, title: &str) -> FetchResult<Value>;

    /// One page of a MediaWiki action API query.
    async fn query(&self, params: &QueryParams) -> FetchResult<Value>;
}

/// reqwest-backed [`WikiApi`] against a live MediaWiki installation.
pub struct HttpWikiApi {
    client: reqwest::Client,
    summary_endpoint: Url,
    action_api: String,
    summary_timeout: Duration,
    query_timeout: Duration,
}

impl HttpWikiApi {
    pub fn new(settings: &Settings) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;

        let endpoint = settings.summary_endpoint();
        let summary_endpoint = Url::parse(&endpoint).map_err(|source| FetchError::InvalidUrl {
            url: endpoint.clone(),
            source,
        })?;

        Ok(Self {
            client,
            summary_endpoint,
            action_api: settings.action_api(),
            summary_timeout: settings.summary_timeout(),
            query_timeout: settings.query_timeout(),
        })
    }

    /// Summary URL with `title` escaped as a single path segment (`/` becomes `%2F`).
    fn summary_url(&self, title: &str) -> FetchResult<Url> {
        let mut url = self.summary_endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.summary_endpoint.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }

    async fn get_json(&self, request: reqwest::RequestBuilder, url: &str) -> FetchResult<Value> {
        let response = request.send().await.map_err(|e| FetchError::http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::http(url, e))?;
        serde_json::from_str(&body).map_err(|e| FetchError::parse(url, e))
    }
}

#[async_trait]
impl WikiApi for HttpWikiApi {
    async fn summary(&self, title: &str) -> FetchResult<Value> {
        let url = self.summary_url(title)?;
        debug!(url = %url, "Fetching page summary");
        let request = self.client.get(url.clone()).timeout(self.summary_timeout);
        self.get_json(request, url.as_str()).await
    }

    async fn query(&self, params: &QueryParams) -> FetchResult<Value> {
        debug!(api = %self.action_api, ?params, "Querying action API");
        let request = self
            .client
            .get(&self.action_api)
            .query(params)
            .timeout(self.query_timeout);
        self.get_json(request, &self.action_api).await
    }
}
