use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FetchError, FetchResult};
use crate::settings::Settings;

/// Decides whether an external link is dead. Never fails: unknown means broken.
#[async_trait]
pub trait LinkChecker: Send + Sync {
    async fn is_broken(&self, url: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub is_broken: bool,
}

/// HEAD-then-GET reachability check over HTTP.
///
/// A link is reachable when the final status (after redirects) is in
/// `200..400`. A non-reachable HEAD status gets one GET, since plenty of
/// servers answer HEAD with 403/405. Timeouts, DNS and TLS failures, refused
/// connections and unparseable URLs all count as broken.
pub struct HttpLinkProbe {
    client: reqwest::Client,
}

impl HttpLinkProbe {
    pub fn new(settings: &Settings) -> FetchResult<Self> {
        Self::build(&settings.user_agent, settings.probe_timeout(), settings.max_redirects)
    }

    pub fn build(user_agent: &str, timeout: Duration, max_redirects: usize) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn check(&self, url: &str) -> Result<bool, reqwest::Error> {
        let head = self.client.head(url).send().await?;
        if is_reachable(head.status()) {
            return Ok(false);
        }

        debug!(url, status = %head.status(), "HEAD not accepted, retrying with GET");
        let get = self.client.get(url).send().await?;
        Ok(!is_reachable(get.status()))
    }
}

fn is_reachable(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

#[async_trait]
impl LinkChecker for HttpLinkProbe {
    async fn is_broken(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(broken) => broken,
            Err(e) => {
                debug!(url, error = %e, "Probe failed");
                true
            }
        }
    }
}

/// Probe every URL concurrently and wait for all of them.
///
/// Results come back in input order. Each probe is bounded by the checker's
/// own timeout; there is no deadline over the whole batch.
pub async fn probe_all<C: LinkChecker + ?Sized>(checker: &C, urls: &[String]) -> Vec<ProbeResult> {
    let checks = urls.iter().map(|url| async move {
        ProbeResult {
            url: url.clone(),
            is_broken: checker.is_broken(url).await,
        }
    });
    let results = join_all(checks).await;

    let broken = results.iter().filter(|r| r.is_broken).count();
    info!(probed = results.len(), broken, "External links probed");
    results
}
