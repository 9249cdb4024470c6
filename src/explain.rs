use crate::classify::{ClassificationResult, ContentType};

const HIGH_RISK: f64 = 0.7;
const MODERATE_RISK: f64 = 0.4;

/// Raw link counts fed into the narrative.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkCounts {
    pub internal: usize,
    pub external: usize,
    pub broken: usize,
}

/// Plain-language summary of an analysis.
///
/// Sentence order is fixed: content type, birth year, living, deceased, stub,
/// link counts, broken links, AI-risk tier. Optional sentences are skipped,
/// never reordered.
pub fn compose(c: &ClassificationResult, counts: LinkCounts) -> String {
    let mut parts = Vec::new();

    match &c.content_type {
        ContentType::Article => {
            parts.push("This appears to be a standard encyclopedia article.".to_string())
        }
        other => parts.push(format!("This page is a '{}' page.", other)),
    }
    if let Some(year) = c.birth_year {
        parts.push(format!("The subject seems to have been born in {}.", year));
    }
    if c.is_living {
        parts.push("Categories suggest the person is living.".to_string());
    }
    if c.is_dead {
        parts.push("Categories indicate the subject is deceased.".to_string());
    }
    if c.is_stub {
        parts.push(
            "The article is categorized as a stub (mbegu); it may be incomplete.".to_string(),
        );
    }
    parts.push(format!(
        "There are about {} internal links and {} external links.",
        counts.internal, counts.external
    ));
    if counts.broken > 0 {
        parts.push(format!(
            "At least {} external link(s) appear broken.",
            counts.broken
        ));
    }
    parts.push(risk_tier(c.ai_risk).to_string());

    parts.join(" ")
}

fn risk_tier(score: f64) -> &'static str {
    if score >= HIGH_RISK {
        "Text shows a high risk of AI-generated patterns."
    } else if score >= MODERATE_RISK {
        "Text shows a moderate risk of AI-generated patterns."
    } else {
        "Low indications of AI-generated phrasing in summary."
    }
}
