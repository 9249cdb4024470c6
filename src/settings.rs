use std::time::Duration;

use serde::Deserialize;

const DEFAULT_LANG: &str = "sw";
const DEFAULT_USER_AGENT: &str = concat!("wikitrust/", env!("CARGO_PKG_VERSION"));

/// Endpoints and policy knobs for one analysis run.
///
/// Loaded from `WIKITRUST_*` environment variables; every field has a default,
/// so an empty environment yields a working configuration against the Swahili
/// Wikipedia.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wiki language subdomain, used to derive endpoints that are not set explicitly.
    pub lang: String,
    pub summary_endpoint: Option<String>,
    pub action_api: Option<String>,
    pub user_agent: String,
    pub summary_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    /// How many external links (in extraction order) get probed.
    pub probe_sample_size: usize,
    /// Maximum entries kept in the sorted internal/external link lists.
    pub link_cap: usize,
    pub max_redirects: usize,
    /// Titles analyzed at once in batch mode.
    pub batch_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            summary_endpoint: None,
            action_api: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            summary_timeout_secs: 30,
            query_timeout_secs: 60,
            probe_timeout_secs: 8,
            probe_sample_size: 15,
            link_cap: 200,
            max_redirects: 10,
            batch_concurrency: 4,
        }
    }
}

impl Settings {
    /// Read settings from the environment (`WIKITRUST_LANG`, `WIKITRUST_PROBE_TIMEOUT_SECS`, ...).
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("WIKITRUST").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    pub fn for_lang(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Self::default()
        }
    }

    pub fn summary_endpoint(&self) -> String {
        self.summary_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/api/rest_v1/page/summary/", self.lang))
    }

    pub fn action_api(&self) -> String {
        self.action_api
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.lang))
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_swahili_wikipedia() {
        let s = Settings::default();
        assert_eq!(
            s.summary_endpoint(),
            "https://sw.wikipedia.org/api/rest_v1/page/summary/"
        );
        assert_eq!(s.action_api(), "https://sw.wikipedia.org/w/api.php");
        assert_eq!(s.probe_timeout(), Duration::from_secs(8));
        assert_eq!(s.probe_sample_size, 15);
        assert_eq!(s.link_cap, 200);
    }

    #[test]
    fn lang_changes_derived_endpoints_only() {
        let mut s = Settings::for_lang("en");
        assert_eq!(s.action_api(), "https://en.wikipedia.org/w/api.php");
        s.action_api = Some("http://localhost:9000/api.php".into());
        assert_eq!(s.action_api(), "http://localhost:9000/api.php");
        assert!(s.summary_endpoint().starts_with("https://en.wikipedia.org/"));
    }
}
