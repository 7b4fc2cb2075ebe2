//! Lettered-paragraph extraction for AD rule text.
//!
//! Two heading layouts are in use across the publication history:
//!
//! * modern: `(c) Applicability This AD applies to ...`
//! * legacy: `Applicability (c) This AD applies to ...`
//!
//! Each layout is a [`HeadingLayout`]; [`extract`] tries them in the order of
//! [`LAYOUTS`] and returns the first capture.

use std::sync::LazyLock;

use regex::Regex;

pub const NOT_FOUND: &str = "Not found";

/// Next lettered heading: `(x) Word`. Case-insensitive, so an inline
/// reference such as `paragraph (g) of this AD` also ends the body.
static MODERN_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([a-z]\)\s*[A-Z]").unwrap());

/// Next lettered heading in either layout; legacy headings are a run of
/// words followed by the marker, e.g. `Unsafe Condition (e)`.
static LEGACY_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([a-z]\)\s*[A-Z]|(?:[A-Z][a-zA-Z]* )+\([a-z]\)").unwrap()
});

static MODERN_HEADINGS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    ParagraphLabel::ALL.map(|label| {
        Regex::new(&format!(
            r"(?is)\({}\)\s*{}",
            label.letter(),
            regex::escape(label.heading())
        ))
        .unwrap()
    })
});

static LEGACY_HEADINGS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    ParagraphLabel::ALL.map(|label| {
        Regex::new(&format!(
            r"(?is){}\s+\({}\)",
            regex::escape(label.heading()),
            label.letter()
        ))
        .unwrap()
    })
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphLabel {
    AffectedAds,
    Applicability,
    Subject,
    UnsafeCondition,
}

impl ParagraphLabel {
    pub const ALL: [ParagraphLabel; 4] = [
        ParagraphLabel::AffectedAds,
        ParagraphLabel::Applicability,
        ParagraphLabel::Subject,
        ParagraphLabel::UnsafeCondition,
    ];

    pub fn letter(self) -> char {
        match self {
            ParagraphLabel::AffectedAds => 'b',
            ParagraphLabel::Applicability => 'c',
            ParagraphLabel::Subject => 'd',
            ParagraphLabel::UnsafeCondition => 'e',
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ParagraphLabel::AffectedAds => "Affected ADs",
            ParagraphLabel::Applicability => "Applicability",
            ParagraphLabel::Subject => "Subject",
            ParagraphLabel::UnsafeCondition => "Unsafe Condition",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A heading convention: locates the start of a paragraph body and where it ends.
pub trait HeadingLayout: Sync {
    fn name(&self) -> &'static str;

    /// Heading for `label`; the body starts at the end of the match.
    fn heading(&self, label: ParagraphLabel) -> &Regex;

    fn boundary(&self) -> &Regex;

    fn find(&self, text: &str, label: ParagraphLabel) -> Option<String> {
        let start = self.heading(label).find(text)?.end();
        let body = &text[start..];
        let end = self.boundary().find(body).map_or(body.len(), |m| m.start());
        Some(body[..end].trim().to_string())
    }
}

pub struct Modern;

impl HeadingLayout for Modern {
    fn name(&self) -> &'static str {
        "modern"
    }

    fn heading(&self, label: ParagraphLabel) -> &Regex {
        &MODERN_HEADINGS[label.index()]
    }

    fn boundary(&self) -> &Regex {
        &MODERN_BOUNDARY_RE
    }
}

pub struct Legacy;

impl HeadingLayout for Legacy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn heading(&self, label: ParagraphLabel) -> &Regex {
        &LEGACY_HEADINGS[label.index()]
    }

    fn boundary(&self) -> &Regex {
        &LEGACY_BOUNDARY_RE
    }
}

/// Layouts in the order they are attempted.
pub static LAYOUTS: &[&dyn HeadingLayout] = &[&Modern, &Legacy];

/// Body of paragraph `label`, or None if no layout finds its heading.
pub fn extract(text: &str, label: ParagraphLabel) -> Option<String> {
    extract_with(LAYOUTS, text, label).map(|(body, _)| body)
}

/// Like [`extract`] over an explicit layout list; also names the layout that matched.
pub fn extract_with(
    layouts: &[&dyn HeadingLayout],
    text: &str,
    label: ParagraphLabel,
) -> Option<(String, &'static str)> {
    layouts
        .iter()
        .find_map(|layout| layout.find(text, label).map(|body| (body, layout.name())))
}

/// One entry per tracked label; a missing paragraph reads as [`NOT_FOUND`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    paragraphs: [Option<String>; 4],
}

impl ExtractedText {
    pub fn from_text(text: &str) -> Self {
        let mut out = Self::default();
        for label in ParagraphLabel::ALL {
            out.paragraphs[label.index()] = extract(text, label);
        }
        out
    }

    pub fn get(&self, label: ParagraphLabel) -> Option<&str> {
        self.paragraphs[label.index()].as_deref()
    }

    pub fn text(&self, label: ParagraphLabel) -> &str {
        self.get(label).unwrap_or(NOT_FOUND)
    }

    pub fn missing(&self) -> Vec<ParagraphLabel> {
        ParagraphLabel::ALL
            .into_iter()
            .filter(|l| self.get(*l).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::flatten;

    #[test]
    fn modern_applicability() {
        let text = "(c) Applicability This AD applies to Model X airplanes. (d) Subject Air Transport Association (ATA) of America Code 57, Wings.";
        assert_eq!(
            extract(text, ParagraphLabel::Applicability).as_deref(),
            Some("This AD applies to Model X airplanes.")
        );
    }

    #[test]
    fn legacy_applicability() {
        let text = "Applicability (c) This AD applies to Model Y. Subject (d) Air Transport Association (ATA) of America Code 32.";
        assert_eq!(
            extract(text, ParagraphLabel::Applicability).as_deref(),
            Some("This AD applies to Model Y.")
        );
    }

    #[test]
    fn legacy_stops_at_multiword_heading() {
        let text = "Subject (d) Code 27: Flight controls. Unsafe Condition (e) This AD results from cracking.";
        assert_eq!(
            extract(text, ParagraphLabel::Subject).as_deref(),
            Some("Code 27: Flight controls.")
        );
        assert_eq!(
            extract(text, ParagraphLabel::UnsafeCondition).as_deref(),
            Some("This AD results from cracking.")
        );
    }

    #[test]
    fn last_paragraph_runs_to_end() {
        let text = "(e) Unsafe Condition This AD was prompted by reports of corrosion";
        assert_eq!(
            extract(text, ParagraphLabel::UnsafeCondition).as_deref(),
            Some("This AD was prompted by reports of corrosion")
        );
    }

    #[test]
    fn heading_is_case_insensitive() {
        let text = "(C) APPLICABILITY This AD applies to Model Z. (d) Subject Code 21.";
        assert_eq!(
            extract(text, ParagraphLabel::Applicability).as_deref(),
            Some("This AD applies to Model Z.")
        );
    }

    #[test]
    fn cross_reference_ends_modern_paragraph() {
        let text = "(c) Applicability This AD applies to airplanes identified in paragraph (g) of this AD. (d) Subject Code 52.";
        assert_eq!(
            extract(text, ParagraphLabel::Applicability).as_deref(),
            Some("This AD applies to airplanes identified in paragraph")
        );
    }

    #[test]
    fn cross_reference_empties_legacy_paragraph() {
        // Every word before "(g)" counts as part of a legacy heading run.
        let text = "Applicability (c) This AD applies to airplanes identified in paragraph (g) of this AD. Subject (d) Code 52.";
        let (body, layout) =
            extract_with(LAYOUTS, text, ParagraphLabel::Applicability).unwrap();
        assert_eq!(layout, "legacy");
        assert_eq!(body, "");
        assert!(!ExtractedText::from_text(text)
            .missing()
            .contains(&ParagraphLabel::Applicability));
    }

    #[test]
    fn boundary_is_case_insensitive() {
        let text = "(c) Applicability Model 767 airplanes. (D) SUBJECT Code 32.";
        assert_eq!(
            extract(text, ParagraphLabel::Applicability).as_deref(),
            Some("Model 767 airplanes.")
        );
    }

    #[test]
    fn heading_regexes_follow_label_order() {
        for label in ParagraphLabel::ALL {
            let modern = format!("({}) {} body", label.letter(), label.heading());
            let legacy = format!("{} ({}) body", label.heading(), label.letter());
            assert!(Modern.heading(label).is_match(&modern), "{:?}", label);
            assert!(Legacy.heading(label).is_match(&legacy), "{:?}", label);
        }
    }

    #[test]
    fn missing_heading() {
        assert_eq!(extract("(c) Applicability foo", ParagraphLabel::AffectedAds), None);
        assert_eq!(extract("", ParagraphLabel::Subject), None);
    }

    #[test]
    fn modern_wins_over_legacy() {
        let text = "Applicability (c) legacy body. (c) Applicability modern body. (d) Subject x";
        let (body, layout) =
            extract_with(LAYOUTS, text, ParagraphLabel::Applicability).unwrap();
        assert_eq!(layout, "modern");
        assert_eq!(body, "modern body.");
    }

    #[test]
    fn layouts_are_pluggable() {
        static COLON_HEADINGS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
            ParagraphLabel::ALL
                .map(|l| Regex::new(&format!(r"(?i){}:", regex::escape(l.heading()))).unwrap())
        });

        struct Colon;
        impl HeadingLayout for Colon {
            fn name(&self) -> &'static str {
                "colon"
            }
            fn heading(&self, label: ParagraphLabel) -> &Regex {
                &COLON_HEADINGS[label.index()]
            }
            fn boundary(&self) -> &Regex {
                &MODERN_BOUNDARY_RE
            }
        }

        let text = "Applicability: Model Q airplanes.";
        assert_eq!(extract(text, ParagraphLabel::Applicability), None);
        let layouts: &[&dyn HeadingLayout] = &[&Modern, &Legacy, &Colon];
        let (body, layout) = extract_with(layouts, text, ParagraphLabel::Applicability).unwrap();
        assert_eq!(layout, "colon");
        assert_eq!(body, "Model Q airplanes.");
    }

    #[test]
    fn extracted_text_sentinels() {
        let ex = ExtractedText::from_text("(c) Applicability Model X. (e) Unsafe Condition Cracks.");
        assert_eq!(ex.text(ParagraphLabel::Applicability), "Model X.");
        assert_eq!(ex.text(ParagraphLabel::UnsafeCondition), "Cracks.");
        assert_eq!(ex.text(ParagraphLabel::AffectedAds), NOT_FOUND);
        assert_eq!(ex.get(ParagraphLabel::Subject), None);
        assert_eq!(
            ex.missing(),
            vec![ParagraphLabel::AffectedAds, ParagraphLabel::Subject]
        );
    }

    #[test]
    fn modern_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/modern_ad.html").unwrap();
        let ex = ExtractedText::from_text(&flatten(&html));
        assert!(ex.missing().is_empty(), "missing: {:?}", ex.missing());
        assert!(ex.text(ParagraphLabel::Applicability).contains("Model 747-400"));
        assert!(ex.text(ParagraphLabel::AffectedAds).starts_with("This AD replaces AD 2019-08-11"));
        assert!(ex.text(ParagraphLabel::Subject).contains("Code 57, Wings"));
        assert!(!ex.text(ParagraphLabel::UnsafeCondition).contains("Compliance"));
    }

    #[test]
    fn legacy_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/legacy_ad.html").unwrap();
        let ex = ExtractedText::from_text(&flatten(&html));
        assert!(ex.missing().is_empty(), "missing: {:?}", ex.missing());
        assert!(ex.text(ParagraphLabel::Applicability).starts_with("This AD applies to"));
        assert!(ex.text(ParagraphLabel::Applicability).contains("Model 737-300"));
        assert_eq!(ex.text(ParagraphLabel::AffectedAds), "None.");
        assert!(!ex.text(ParagraphLabel::Subject).contains("Unsafe"));
    }
}
