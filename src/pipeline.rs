use std::collections::HashSet;

use tracing::info;

use crate::api::document::fetch_document;
use crate::api::search::paginated_search;
use crate::api::{Endpoints, SearchHit, SearchQuery};
use crate::parser::classify::ClassifiedFields;
use crate::parser::paragraphs::{ExtractedText, ParagraphLabel};
use crate::progress::{emit, ProgressEvent, Reporter};
use crate::transport::Transport;

const AD_TITLE_MARKER: &str = "Airworthiness Directives";
const NO_SUBJECT: &str = "No subject provided.";
const UNKNOWN_DATE: &str = "Unknown Date";
const NO_PDF_LINK: &str = "No PDF link available.";

/// One matching AD, ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveRecord {
    pub ad_number: String,
    pub title: String,
    pub subject: String,
    pub publication_date: String,
    pub fields: ClassifiedFields,
    pub paragraphs: ExtractedText,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Records(Vec<DirectiveRecord>),
    NoMatches,
}

/// Search → fetch → extract → filter → sort, one request at a time.
pub struct RecordAssembler<T> {
    transport: T,
    endpoints: Endpoints,
}

impl<T: Transport> RecordAssembler<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn assemble(&self, query: &SearchQuery, reporter: Reporter<'_>) -> RunOutcome {
        let hits = paginated_search(&self.transport, &self.endpoints, query, reporter).await;
        if hits.is_empty() {
            emit(reporter, ProgressEvent::NoSearchResults);
            return RunOutcome::NoMatches;
        }

        let candidates: Vec<SearchHit> = dedup_hits(hits)
            .into_iter()
            .filter(|hit| title_matches(&hit.title, &query.make))
            .collect();
        emit(
            reporter,
            ProgressEvent::FilteringStarted {
                candidates: candidates.len(),
            },
        );

        let mut records = Vec::new();
        for hit in &candidates {
            if let Some(record) = self.build_record(hit, query, reporter).await {
                records.push(record);
            }
        }

        if records.is_empty() {
            emit(
                reporter,
                ProgressEvent::NoMatches {
                    make: query.make.clone(),
                    model: query.model.clone(),
                },
            );
            return RunOutcome::NoMatches;
        }

        sort_newest_first(&mut records);
        info!(count = records.len(), make = %query.make, model = %query.model, "run complete");
        emit(
            reporter,
            ProgressEvent::FinalCount {
                count: records.len(),
            },
        );
        RunOutcome::Records(records)
    }

    async fn build_record(
        &self,
        hit: &SearchHit,
        query: &SearchQuery,
        reporter: Reporter<'_>,
    ) -> Option<DirectiveRecord> {
        let doc = fetch_document(&self.transport, &self.endpoints, hit, reporter).await;
        let paragraphs = doc.parsed.paragraphs;

        if !applicability_matches(&paragraphs, &query.model) {
            emit(
                reporter,
                ProgressEvent::Skipped {
                    ad_number: doc.ad_number,
                },
            );
            return None;
        }

        let missing = paragraphs.missing();
        if !missing.is_empty() {
            emit(
                reporter,
                ProgressEvent::MissingParagraphs {
                    ad_number: doc.ad_number.clone(),
                    labels: missing.into_iter().map(ParagraphLabel::letter).collect(),
                },
            );
        }

        emit(
            reporter,
            ProgressEvent::Processed {
                ad_number: doc.ad_number.clone(),
            },
        );

        Some(DirectiveRecord {
            ad_number: doc.ad_number,
            title: hit.title.clone(),
            subject: subject_summary(hit.summary.as_deref()),
            publication_date: hit
                .publication_date
                .clone()
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            fields: doc.parsed.fields,
            paragraphs,
            pdf_url: hit
                .pdf_url
                .clone()
                .unwrap_or_else(|| NO_PDF_LINK.to_string()),
        })
    }
}

/// Both literal substrings must appear in the title.
pub fn title_matches(title: &str, make: &str) -> bool {
    title.contains(AD_TITLE_MARKER) && title.contains(make)
}

/// Exact, case-sensitive model check against the Applicability paragraph.
pub fn applicability_matches(paragraphs: &ExtractedText, model: &str) -> bool {
    paragraphs
        .get(ParagraphLabel::Applicability)
        .is_some_and(|c| c.contains(model))
}

fn subject_summary(summary: Option<&str>) -> String {
    summary
        .unwrap_or(NO_SUBJECT)
        .replace('\n', " ")
        .trim()
        .to_string()
}

/// Drop repeat documents, keeping the first occurrence.
fn dedup_hits(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| match &hit.document_number {
            Some(n) => seen.insert(n.clone()),
            None => true,
        })
        .collect()
}

/// ISO dates sort correctly as text; ties keep search order.
fn sort_newest_first(records: &mut [DirectiveRecord]) {
    records.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
}
