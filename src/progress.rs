use std::fmt;

use tracing::debug;

/// Points in a run that are reported to the caller's log callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    SearchStarted,
    ResultsFound { count: u64, total_pages: u32 },
    PageFetched { page: u32, total_pages: u32 },
    PageFailed { page: u32, error: String },
    NoSearchResults,
    FilteringStarted { candidates: usize },
    DocumentUnavailable { document: String, error: String },
    NoFullTextLink { document: String },
    AdNumberUnresolved { document: String, reason: String },
    MissingParagraphs { ad_number: String, labels: Vec<char> },
    Skipped { ad_number: String },
    Processed { ad_number: String },
    NoMatches { make: String, model: String },
    FinalCount { count: usize },
    LookupStarted { ad_number: String },
    LookupFailed { ad_number: String, reason: String },
    Saved { path: String },
    DownloadsFinished { saved: usize, requested: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchStarted => write!(f, "Querying Federal Register API..."),
            Self::ResultsFound { count, total_pages } => write!(
                f,
                "Found {} potential matching rules across {} page(s).",
                count, total_pages
            ),
            Self::PageFetched { page, total_pages } => {
                write!(f, "  - Downloaded page {} of {}...", page, total_pages)
            }
            Self::PageFailed { page, error } => write!(
                f,
                "Error fetching data from Federal Register API (Page {}): {}",
                page, error
            ),
            Self::NoSearchResults => write!(f, "No ADs found or an error occurred during search."),
            Self::FilteringStarted { candidates } => write!(
                f,
                "Filtering and parsing {} full AD texts (this may take a moment)...",
                candidates
            ),
            Self::DocumentUnavailable { document, error } => {
                write!(f, "  Could not fetch full text of {}: {}", document, error)
            }
            Self::NoFullTextLink { document } => {
                write!(f, "  No full-text link for {}; paragraphs not found", document)
            }
            Self::AdNumberUnresolved { document, reason } => {
                write!(f, "  AD number unavailable for {}: {}", document, reason)
            }
            Self::MissingParagraphs { ad_number, labels } => {
                let labels: Vec<String> = labels.iter().map(|l| format!("({})", l)).collect();
                write!(f, "  {}: paragraphs not found: {}", ad_number, labels.join(", "))
            }
            Self::Skipped { ad_number } => {
                write!(f, "  Skipped (model not in Applicability): {}", ad_number)
            }
            Self::Processed { ad_number } => write!(f, "Processed: {}", ad_number),
            Self::NoMatches { make, model } => write!(
                f,
                "No fully matching Airworthiness Directives found for {} {}.",
                make, model
            ),
            Self::FinalCount { count } => {
                write!(f, "Final count: {} ADs matched completely.", count)
            }
            Self::LookupStarted { ad_number } => write!(f, "Searching API for: {}...", ad_number),
            Self::LookupFailed { ad_number, reason } => write!(f, "  {}: {}", ad_number, reason),
            Self::Saved { path } => write!(f, "  -> Saved to {}", path),
            Self::DownloadsFinished { saved, requested } => write!(
                f,
                "Finished. Successfully downloaded {} of {} documents.",
                saved, requested
            ),
        }
    }
}

/// Caller-supplied sink for progress lines. Invoked synchronously on the worker.
pub type Reporter<'a> = &'a mut dyn FnMut(&ProgressEvent);

pub fn emit(reporter: Reporter<'_>, event: ProgressEvent) {
    debug!(%event, "progress");
    reporter(&event);
}
