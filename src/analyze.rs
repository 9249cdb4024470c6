use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::classify::{self, ContentType};
use crate::error::FetchResult;
use crate::explain::{self, LinkCounts};
use crate::probe::{probe_all, HttpLinkProbe, LinkChecker};
use crate::settings::Settings;
use crate::wiki::summary::fetch_summary;
use crate::wiki::{query, HttpWikiApi, WikiApi};

/// Everything known about one article after a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub title: String,
    pub url: Option<String>,
    pub ai_content_risk: f64,
    pub broken_links_count: usize,
    pub broken_external_links: Vec<String>,
    pub content_type: ContentType,
    pub total_links_internal: usize,
    pub total_links_external: usize,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
    pub categories: Vec<String>,
    pub is_living: bool,
    pub is_dead: bool,
    pub death_year: Option<i32>,
    pub birth_year: Option<i32>,
    pub is_stub: bool,
    pub ai_explanation: String,
    /// List properties whose query failed and were reported as empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partial_failures: Vec<String>,
}

pub struct Analyzer<A = HttpWikiApi, P = HttpLinkProbe> {
    api: A,
    probe: P,
    probe_sample_size: usize,
    link_cap: usize,
}

impl Analyzer {
    /// Analyzer talking to the live wiki and probing links over HTTP.
    pub fn from_settings(settings: &Settings) -> FetchResult<Self> {
        Ok(Self::new(
            HttpWikiApi::new(settings)?,
            HttpLinkProbe::new(settings)?,
            settings,
        ))
    }
}

impl<A: WikiApi, P: LinkChecker> Analyzer<A, P> {
    pub fn new(api: A, probe: P, settings: &Settings) -> Self {
        Self {
            api,
            probe,
            probe_sample_size: settings.probe_sample_size,
            link_cap: settings.link_cap,
        }
    }

    /// Run the full pipeline for `title`.
    ///
    /// Only a failed summary fetch is an error. A failed list query leaves its
    /// field empty and is named in `partial_failures`.
    pub async fn analyze(&self, title: &str) -> FetchResult<AnalysisResult> {
        let summary = fetch_summary(&self.api, title).await?;
        let page_title = summary.title.as_str();

        let (links, extlinks, categories) = tokio::join!(
            query::fetch_internal_links(&self.api, page_title),
            query::fetch_external_links(&self.api, page_title),
            query::fetch_categories(&self.api, page_title),
        );

        let mut partial_failures = Vec::new();
        let links = or_empty(links, query::LINKS.name, &mut partial_failures);
        let ext_urls = or_empty(extlinks, query::EXTLINKS.name, &mut partial_failures);
        let categories = or_empty(categories, query::CATEGORIES.name, &mut partial_failures);

        let classification = classify::classify(&summary, &categories);

        let sample: Vec<String> = ext_urls.iter().take(self.probe_sample_size).cloned().collect();
        let broken_external_links: Vec<String> = probe_all(&self.probe, &sample)
            .await
            .into_iter()
            .filter(|r| r.is_broken)
            .map(|r| r.url)
            .collect();
        for url in &broken_external_links {
            warn!(title = %summary.title, url = %url, "Broken external link");
        }

        let ai_explanation = explain::compose(
            &classification,
            LinkCounts {
                internal: links.len(),
                external: ext_urls.len(),
                broken: broken_external_links.len(),
            },
        );

        info!(
            title = %summary.title,
            internal = links.len(),
            external = ext_urls.len(),
            categories = categories.len(),
            broken = broken_external_links.len(),
            ai_risk = classification.ai_risk,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            internal_links: unique_internal(&links, self.link_cap),
            external_links: unique_external(&ext_urls, self.link_cap),
            total_links_internal: links.len(),
            total_links_external: ext_urls.len(),
            broken_links_count: broken_external_links.len(),
            broken_external_links,
            title: summary.title,
            url: summary.canonical_url,
            ai_content_risk: classification.ai_risk,
            content_type: classification.content_type,
            categories,
            is_living: classification.is_living,
            is_dead: classification.is_dead,
            death_year: classification.death_year,
            birth_year: classification.birth_year,
            is_stub: classification.is_stub,
            ai_explanation,
            partial_failures,
        })
    }
}

fn or_empty(
    result: FetchResult<Vec<String>>,
    property: &str,
    failures: &mut Vec<String>,
) -> Vec<String> {
    result.unwrap_or_else(|e| {
        warn!(property, error = %e, "List query failed, reporting it as empty");
        failures.push(property.to_string());
        Vec::new()
    })
}

/// Distinct non-empty titles, sorted, at most `cap`.
fn unique_internal(titles: &[String], cap: usize) -> Vec<String> {
    titles
        .iter()
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(cap)
        .cloned()
        .collect()
}

/// Distinct http(s) URLs, sorted, at most `cap`.
fn unique_external(urls: &[String], cap: usize) -> Vec<String> {
    urls.iter()
        .filter(|u| u.starts_with("http"))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(cap)
        .cloned()
        .collect()
}
