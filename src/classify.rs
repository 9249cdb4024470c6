use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexSet};
use serde::{Serialize, Serializer};

use crate::wiki::summary::PageSummary;

// Phrases typical of unedited LLM output.
static AI_PHRASES_RE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)As an AI language model",
        r"(?i)In conclusion,",
        r"(?i)This article aims to",
        r"(?i)It is important to note that",
    ])
    .unwrap()
});

// Year must sit at the end of the title, right after the keyword, so a death
// category like "Waliofariki 1980" can never be read as a birth year.
static BIRTH_SW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Waliozaliwa|Kuzaliwa)\s+(\d{3,4})$").unwrap());
static BIRTH_EN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{3,4})\s+births$").unwrap());
static DEATH_SW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:Waliofariki|Vifo vya)\s+(\d{3,4})$").unwrap());
static DEATH_EN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{3,4})\s+deaths$").unwrap());

static LIVING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Watu hai|Walio hai|Living people").unwrap());
// "mbegu" is Swahili for seed, the local name for stubs.
static STUB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)mbegu|stub").unwrap());

const PHRASE_WEIGHT: f64 = 0.25;
const LENGTH_FLOOR: usize = 200;
const LENGTH_SCALE: f64 = 5000.0;
const LENGTH_PENALTY_MAX: f64 = 0.3;
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=2100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Article,
    Disambiguation,
    Redirect,
    /// Any other summary `type`, kept verbatim (e.g. `no-extract`).
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Article => "article",
            ContentType::Disambiguation => "disambiguation",
            ContentType::Redirect => "redirect",
            ContentType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub ai_risk: f64,
    pub content_type: ContentType,
    pub birth_year: Option<i32>,
    pub is_dead: bool,
    pub death_year: Option<i32>,
    /// Living category matched and no death category did.
    pub is_living: bool,
    pub is_stub: bool,
}

/// Heuristic 0..=1 score for boilerplate phrasing in `text`, rounded to 2 decimals.
pub fn ai_risk(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let hits = AI_PHRASES_RE.matches(text).iter().count();
    let len = text.chars().count();
    let length_penalty = if len < LENGTH_FLOOR {
        0.0
    } else {
        (len as f64 / LENGTH_SCALE).min(LENGTH_PENALTY_MAX)
    };

    let score = (hits as f64 * PHRASE_WEIGHT + length_penalty).clamp(0.0, 1.0);
    // ties go to even: 0.125 -> 0.12
    (score * 100.0).round_ties_even() / 100.0
}

/// Map the summary `type` field; `standard` (or a missing or empty field) is an article.
pub fn content_type(raw: Option<&str>) -> ContentType {
    match raw {
        None | Some("") | Some("standard") => ContentType::Article,
        Some("disambiguation") => ContentType::Disambiguation,
        Some("redirect") => ContentType::Redirect,
        Some(other) => ContentType::Other(other.to_string()),
    }
}

fn year_from(patterns: &[&Regex], category: &str) -> Option<i32> {
    patterns.iter().find_map(|re| {
        let year = re.captures(category)?.get(1)?.as_str().parse::<i32>().ok()?;
        YEAR_RANGE.contains(&year).then_some(year)
    })
}

/// First birth year found in an explicit birth category.
pub fn birth_year(categories: &[String]) -> Option<i32> {
    categories
        .iter()
        .find_map(|c| year_from(&[&*BIRTH_SW_RE, &*BIRTH_EN_RE], c))
}

/// `(is_dead, death_year)` from explicit death categories only.
pub fn death_indicator(categories: &[String]) -> (bool, Option<i32>) {
    match categories
        .iter()
        .find_map(|c| year_from(&[&*DEATH_SW_RE, &*DEATH_EN_RE], c))
    {
        Some(year) => (true, Some(year)),
        None => (false, None),
    }
}

pub fn is_living(categories: &[String]) -> bool {
    categories.iter().any(|c| LIVING_RE.is_match(c))
}

pub fn is_stub(categories: &[String]) -> bool {
    categories.iter().any(|c| STUB_RE.is_match(c))
}

pub fn classify(summary: &PageSummary, categories: &[String]) -> ClassificationResult {
    let (is_dead, death_year) = death_indicator(categories);
    ClassificationResult {
        ai_risk: ai_risk(&summary.extract),
        content_type: content_type(summary.content_type.as_deref()),
        birth_year: birth_year(categories),
        is_dead,
        death_year,
        is_living: is_living(categories) && !is_dead,
        is_stub: is_stub(categories),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_text_has_no_risk() {
        assert_eq!(ai_risk(""), 0.0);
    }

    #[test]
    fn short_clean_text_has_no_risk() {
        assert_eq!(ai_risk("Jaji Mkuu ni kiongozi wa mahakama."), 0.0);
    }

    #[test]
    fn each_phrase_adds_a_quarter() {
        assert_eq!(ai_risk("In conclusion, the court met."), 0.25);
        assert_eq!(
            ai_risk("as an ai language model I think. In conclusion, yes."),
            0.5
        );
    }

    #[test]
    fn repeated_phrase_counts_once() {
        assert_eq!(ai_risk("In conclusion, a. In conclusion, b."), 0.25);
    }

    #[test]
    fn length_penalty_scales_then_caps() {
        assert_eq!(ai_risk(&"a".repeat(199)), 0.0);
        assert_eq!(ai_risk(&"a".repeat(500)), 0.1);
        assert_eq!(ai_risk(&"a".repeat(1000)), 0.2);
        assert_eq!(ai_risk(&"a".repeat(20_000)), 0.3);
    }

    #[test]
    fn half_way_scores_round_to_even() {
        assert_eq!(ai_risk(&"a".repeat(625)), 0.12);
        assert_eq!(ai_risk(&"a".repeat(875)), 0.17);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 150 two-byte characters: 300 bytes, still under the floor.
        assert_eq!(ai_risk(&"é".repeat(150)), 0.0);
    }

    #[test]
    fn score_stays_in_range_and_never_drops_with_more_phrases() {
        let phrases = [
            "As an AI language model, ",
            "In conclusion, ",
            "This article aims to ",
            "It is important to note that ",
        ];
        let mut text = "x".repeat(3000);
        let mut last = ai_risk(&text);
        for p in phrases {
            text.push_str(p);
            let score = ai_risk(&text);
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            assert!(score >= last);
            last = score;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn content_type_mapping() {
        assert_eq!(content_type(Some("standard")), ContentType::Article);
        assert_eq!(content_type(None), ContentType::Article);
        assert_eq!(content_type(Some("")), ContentType::Article);
        assert_eq!(content_type(Some("disambiguation")), ContentType::Disambiguation);
        assert_eq!(content_type(Some("redirect")).to_string(), "redirect");
        assert_eq!(content_type(Some("no-extract")).to_string(), "no-extract");
    }

    #[test]
    fn content_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&content_type(Some("mainpage"))).unwrap();
        assert_eq!(json, "\"mainpage\"");
    }

    #[test]
    fn living_people() {
        let c = cats(&["Watu hai"]);
        assert!(is_living(&c));
        assert_eq!(death_indicator(&c), (false, None));
        assert!(is_living(&cats(&["Living people"])));
        assert!(is_living(&cats(&["walio hai"])));
    }

    #[test]
    fn swahili_death_year() {
        assert_eq!(death_indicator(&cats(&["Waliofariki 1980"])), (true, Some(1980)));
        assert_eq!(death_indicator(&cats(&["Vifo vya 1500"])), (true, Some(1500)));
    }

    #[test]
    fn english_birth_and_death_years() {
        assert_eq!(birth_year(&cats(&["1923 births"])), Some(1923));
        assert_eq!(death_indicator(&cats(&["1999 deaths"])), (true, Some(1999)));
    }

    #[test]
    fn swahili_birth_year() {
        assert_eq!(birth_year(&cats(&["Waliozaliwa 1477"])), Some(1477));
        assert_eq!(birth_year(&cats(&["Kuzaliwa 1960"])), Some(1960));
    }

    #[test]
    fn birth_requires_explicit_keyword() {
        let c = cats(&["Waliofariki 1980", "1980 deaths", "Matukio ya 1923"]);
        assert_eq!(birth_year(&c), None);
    }

    #[test]
    fn year_must_end_the_title_and_be_in_range() {
        assert_eq!(birth_year(&cats(&["Waliozaliwa 1923 Nairobi"])), None);
        assert_eq!(birth_year(&cats(&["Waliozaliwa 999"])), None);
        assert_eq!(death_indicator(&cats(&["Waliofariki 2500"])), (false, None));
    }

    #[test]
    fn first_matching_category_wins() {
        let c = cats(&["Wanasiasa", "Waliozaliwa 1950", "1960 births"]);
        assert_eq!(birth_year(&c), Some(1950));
    }

    #[test]
    fn stub_markers() {
        assert!(is_stub(&cats(&["Mbegu za watu"])));
        assert!(is_stub(&cats(&["Politician STUBS"])));
        assert!(!is_stub(&cats(&["Watu hai"])));
    }

    #[test]
    fn dead_person_is_never_living() {
        let summary = PageSummary {
            title: "Costantino Castriota".into(),
            extract: String::new(),
            content_type: Some("standard".into()),
            canonical_url: None,
        };
        let c = cats(&["Watu hai", "Waliozaliwa 1477", "Waliofariki 1500", "Mbegu za Wakristo"]);
        let r = classify(&summary, &c);
        assert!(r.is_dead);
        assert!(!r.is_living);
        assert_eq!(r.birth_year, Some(1477));
        assert_eq!(r.death_year, Some(1500));
        assert!(r.is_stub);
        assert_eq!(r.content_type, ContentType::Article);
    }

    #[test]
    fn no_death_category_does_not_imply_living() {
        let summary = PageSummary {
            title: "Nairobi".into(),
            extract: String::new(),
            content_type: None,
            canonical_url: None,
        };
        let r = classify(&summary, &cats(&["Miji ya Kenya"]));
        assert!(!r.is_living);
        assert!(!r.is_dead);
    }
}
