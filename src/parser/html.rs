use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PART39_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h1[^>]*>\s*PART 39.*?AIRWORTHINESS DIRECTIVES\s*</h1>").unwrap()
});
static PRINTED_PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*printed\s+page\s+\d+\s*\)").unwrap());

const PART39_MARKER: &str = "PART 39&mdash;AIRWORTHINESS DIRECTIVES";

/// Strip tags and collapse whitespace into single-spaced plain text.
pub fn flatten(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

/// Keep only the regulatory amendment, starting at the "PART 39" heading.
/// Returns the input unchanged when no heading is present.
pub fn trim_to_amendment(html: &str) -> &str {
    if let Some(m) = PART39_RE.find(html) {
        return &html[m.start()..];
    }
    html.find(PART39_MARKER)
        .and_then(|idx| html[..idx].rfind("<h1"))
        .map(|start| &html[start..])
        .unwrap_or(html)
}

/// Remove inline "( printed page NNNNN)" markers left by the publisher.
pub fn strip_printed_page_markers(html: &str) -> String {
    PRINTED_PAGE_RE.replace_all(html, "").into_owned()
}
