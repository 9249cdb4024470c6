//! Trust assessment for a single wiki article: AI-phrasing risk, link
//! inventory with external-link health, content type and biographical flags
//! inferred from categories.

pub mod analyze;
pub mod batch;
pub mod classify;
pub mod error;
pub mod explain;
pub mod probe;
pub mod settings;
pub mod wiki;

#[cfg(test)]
mod testing;

pub use analyze::{AnalysisResult, Analyzer};
pub use error::{FetchError, FetchResult};
pub use settings::Settings;

/// Analyze `title` against the default wiki (Swahili Wikipedia).
pub async fn analyze(title: &str) -> FetchResult<AnalysisResult> {
    Analyzer::from_settings(&Settings::default())?
        .analyze(title)
        .await
}
