use serde::Deserialize;
use tracing::info;

use super::WikiApi;
use crate::error::{FetchError, FetchResult};

/// Short description of a page, as returned by the REST summary endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    /// Resolved title (after redirects); seeds the list queries.
    pub title: String,
    pub extract: String,
    /// The endpoint's `type` field (`standard`, `disambiguation`, ...).
    pub content_type: Option<String>,
    pub canonical_url: Option<String>,
}

#[derive(Deserialize)]
struct RawSummary {
    title: Option<String>,
    extract: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

/// Fetch the summary for `title`. Single attempt, no retry.
pub async fn fetch_summary<A: WikiApi + ?Sized>(api: &A, title: &str) -> FetchResult<PageSummary> {
    let value = api.summary(title).await?;
    let summary = parse_summary(title, value)?;
    info!(
        requested = %title,
        resolved = %summary.title,
        extract_len = summary.extract.chars().count(),
        "Fetched summary"
    );
    Ok(summary)
}

fn parse_summary(requested: &str, value: serde_json::Value) -> FetchResult<PageSummary> {
    let raw: RawSummary = serde_json::from_value(value)
        .map_err(|e| FetchError::parse(format!("summary of '{}'", requested), e))?;

    Ok(PageSummary {
        title: raw
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| requested.to_string()),
        extract: raw.extract.unwrap_or_default(),
        content_type: raw.kind,
        canonical_url: raw
            .content_urls
            .and_then(|c| c.desktop)
            .and_then(|d| d.page),
    })
}
