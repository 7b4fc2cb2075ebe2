use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::paragraphs::{ExtractedText, ParagraphLabel, NOT_FOUND};

pub const NO_SUPERSESSION: &str = "None";

static REPLACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)replaces").unwrap());
static AD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AD\s+\d{4}-\d{2}-\d{2}").unwrap());
static ATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Code\s+(\d+)[,:]?\s*(.*)").unwrap());

/// Fields derived from the Subject and Affected-ADs paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedFields {
    pub ata_code: Option<String>,
    pub ata_subject: Option<String>,
    pub superseded: Vec<String>,
}

impl ClassifiedFields {
    pub fn from_paragraphs(paragraphs: &ExtractedText) -> Self {
        let (ata_code, ata_subject) = paragraphs
            .get(ParagraphLabel::Subject)
            .and_then(ata_classification)
            .map_or((None, None), |(code, subject)| (Some(code), Some(subject)));
        let superseded = paragraphs
            .get(ParagraphLabel::AffectedAds)
            .map(superseded_ads)
            .unwrap_or_default();
        Self {
            ata_code,
            ata_subject,
            superseded,
        }
    }

    pub fn ata_code_text(&self) -> &str {
        self.ata_code.as_deref().unwrap_or(NOT_FOUND)
    }

    pub fn ata_subject_text(&self) -> &str {
        self.ata_subject.as_deref().unwrap_or(NOT_FOUND)
    }

    /// Comma-separated superseded ADs, or "None".
    pub fn superseded_text(&self) -> String {
        if self.superseded.is_empty() {
            NO_SUPERSESSION.to_string()
        } else {
            self.superseded.join(", ")
        }
    }
}

/// Text following the first case-insensitive occurrence of `anchor`.
pub fn after_anchor<'a>(text: &'a str, anchor: &Regex) -> Option<&'a str> {
    anchor.find(text).map(|m| &text[m.end()..])
}

/// AD identifiers in `window`, first-seen order, without repeats.
pub fn scan_ad_numbers(window: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    AD_NUMBER_RE
        .find_iter(window)
        .map(|m| m.as_str().to_string())
        .filter(|ad| seen.insert(ad.clone()))
        .collect()
}

/// ADs listed after "replaces" in the Affected-ADs paragraph.
pub fn superseded_ads(affected: &str) -> Vec<String> {
    after_anchor(affected, &REPLACES_RE)
        .map(scan_ad_numbers)
        .unwrap_or_default()
}

/// ATA chapter code and its description from the Subject paragraph.
pub fn ata_classification(subject: &str) -> Option<(String, String)> {
    let caps = ATA_RE.captures(subject)?;
    let code = caps[1].trim().to_string();
    let rest = caps[2].trim();
    let description = match rest.find('.') {
        Some(dot) => rest[..dot].trim(),
        None => rest.trim_end_matches('.'),
    };
    Some((code, description.to_string()))
}
