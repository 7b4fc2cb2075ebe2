use serde_json::Value;
use tracing::warn;

use super::{Endpoints, SearchHit};
use crate::error::FetchError;
use crate::parser::{self, ParsedDocument};
use crate::progress::{emit, ProgressEvent, Reporter};
use crate::transport::Transport;

pub const UNKNOWN_AD_NUMBER: &str = "Unknown AD Number";

/// Result of resolving one search hit into AD content.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub ad_number: String,
    pub parsed: ParsedDocument,
}

/// Resolve the AD number and parse the full text of `hit`.
///
/// The two lookups are independent; either one failing degrades its own
/// fields to sentinels and is reported, never propagated.
pub async fn fetch_document<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    hit: &SearchHit,
    reporter: Reporter<'_>,
) -> FetchedDocument {
    let ad_number = resolve_ad_number(transport, endpoints, hit, reporter).await;
    let parsed = fetch_paragraphs(transport, hit, reporter).await;
    FetchedDocument { ad_number, parsed }
}

async fn resolve_ad_number<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    hit: &SearchHit,
    reporter: Reporter<'_>,
) -> String {
    let Some(document_number) = hit.document_number.as_deref() else {
        warn!(title = %hit.title, "search hit has no document number");
        emit(
            reporter,
            ProgressEvent::AdNumberUnresolved {
                document: describe(hit).to_string(),
                reason: "no document number".to_string(),
            },
        );
        return UNKNOWN_AD_NUMBER.to_string();
    };

    let reason = match lookup_ad_number(transport, endpoints, document_number).await {
        Ok(Some(ad)) => return ad,
        Ok(None) => "no AD docket identifier".to_string(),
        Err(e) => e.to_string(),
    };
    warn!(document_number, %reason, "AD number not resolved");
    emit(
        reporter,
        ProgressEvent::AdNumberUnresolved {
            document: document_number.to_string(),
            reason,
        },
    );
    UNKNOWN_AD_NUMBER.to_string()
}

async fn lookup_ad_number<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    document_number: &str,
) -> Result<Option<String>, FetchError> {
    let url = endpoints.document_url(document_number)?;
    let body = transport.get_text(url.as_str()).await?;
    let doc: Value = serde_json::from_str(&body)?;
    Ok(first_ad_docket(&doc))
}

/// Name for a hit in log lines: its document number, else its title.
fn describe(hit: &SearchHit) -> &str {
    match hit.document_number.as_deref() {
        Some(n) => n,
        None if !hit.title.is_empty() => &hit.title,
        None => "untitled document",
    }
}

/// First docket identifier of the form "AD ...", if `docket_ids` is a list.
pub fn first_ad_docket(doc: &Value) -> Option<String> {
    doc.get("docket_ids")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find(|id| id.starts_with("AD "))
        .map(str::to_string)
}

async fn fetch_paragraphs<T: Transport>(
    transport: &T,
    hit: &SearchHit,
    reporter: Reporter<'_>,
) -> ParsedDocument {
    let document = describe(hit);
    let Some(url) = hit.body_html_url.as_deref().filter(|u| !u.is_empty()) else {
        warn!(document, "no full-text link");
        emit(
            reporter,
            ProgressEvent::NoFullTextLink {
                document: document.to_string(),
            },
        );
        return ParsedDocument::default();
    };

    match transport.get_text(url).await {
        Ok(html) => parser::process_html(&html),
        Err(e) => {
            warn!(document, error = %e, "full text fetch failed");
            emit(
                reporter,
                ProgressEvent::DocumentUnavailable {
                    document: document.to_string(),
                    error: e.to_string(),
                },
            );
            ParsedDocument::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::paragraphs::{ParagraphLabel, NOT_FOUND};
    use crate::transport::testing::ScriptedTransport;

    fn hit() -> SearchHit {
        SearchHit {
            title: "Airworthiness Directives; The Boeing Company Airplanes".into(),
            document_number: Some("2023-07001".into()),
            body_html_url: Some("https://example.test/documents/full_text/2023-07001.html".into()),
            ..Default::default()
        }
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("https://example.test/api/v1")
    }

    fn modern_html() -> String {
        std::fs::read_to_string("tests/fixtures/modern_ad.html").unwrap()
    }

    #[test]
    fn docket_scan() {
        let doc = serde_json::json!({ "docket_ids": ["FAA-2022-1187", "AD 2023-07-09", "AD 2023-07-10"] });
        assert_eq!(first_ad_docket(&doc).as_deref(), Some("AD 2023-07-09"));
        assert_eq!(first_ad_docket(&serde_json::json!({ "docket_ids": "AD 1" })), None);
        assert_eq!(first_ad_docket(&serde_json::json!({ "docket_ids": [1, "FAA-1"] })), None);
        assert_eq!(first_ad_docket(&serde_json::json!({})), None);
    }

    #[tokio::test]
    async fn both_lookups_succeed() {
        let transport = ScriptedTransport::new()
            .route("/articles/2023-07001.json", r#"{"docket_ids": ["FAA-2022-1187", "AD 2023-07-09"]}"#)
            .route("/full_text/", modern_html());
        let doc = fetch_document(&transport, &endpoints(), &hit(), &mut |_| {}).await;

        assert_eq!(doc.ad_number, "AD 2023-07-09");
        assert_eq!(doc.parsed.fields.ata_code_text(), "57");
    }

    #[tokio::test]
    async fn failed_full_text_keeps_ad_number() {
        let transport = ScriptedTransport::new()
            .route("/articles/2023-07001.json", r#"{"docket_ids": ["AD 2023-07-09"]}"#)
            .fail("/full_text/", 500);
        let mut events = Vec::new();
        let doc =
            fetch_document(&transport, &endpoints(), &hit(), &mut |e| events.push(e.clone())).await;

        assert_eq!(doc.ad_number, "AD 2023-07-09");
        for label in ParagraphLabel::ALL {
            assert_eq!(doc.parsed.paragraphs.text(label), NOT_FOUND);
        }
        assert_eq!(doc.parsed.fields.superseded_text(), "None");
        assert!(matches!(
            events.as_slice(),
            [ProgressEvent::DocumentUnavailable { .. }]
        ));
    }

    #[tokio::test]
    async fn failed_ad_lookup_keeps_paragraphs() {
        let transport = ScriptedTransport::new()
            .fail("/articles/2023-07001.json", 404)
            .route("/full_text/", modern_html());
        let mut events = Vec::new();
        let doc =
            fetch_document(&transport, &endpoints(), &hit(), &mut |e| events.push(e.clone())).await;

        assert_eq!(doc.ad_number, UNKNOWN_AD_NUMBER);
        assert_eq!(doc.parsed.fields.ata_subject_text(), "Wings");
        assert!(matches!(
            events.as_slice(),
            [ProgressEvent::AdNumberUnresolved { .. }]
        ));
    }

    #[tokio::test]
    async fn no_ad_docket_is_unknown() {
        let transport = ScriptedTransport::new()
            .route("/articles/2023-07001.json", r#"{"docket_ids": ["FAA-2022-1187"]}"#)
            .route("/full_text/", modern_html());
        let doc = fetch_document(&transport, &endpoints(), &hit(), &mut |_| {}).await;
        assert_eq!(doc.ad_number, UNKNOWN_AD_NUMBER);
    }

    #[tokio::test]
    async fn missing_links_make_no_requests() {
        let transport = ScriptedTransport::new();
        let bare = SearchHit {
            title: "Airworthiness Directives; Boeing".into(),
            ..Default::default()
        };
        let mut events = Vec::new();
        let doc =
            fetch_document(&transport, &endpoints(), &bare, &mut |e| events.push(e.clone())).await;

        assert_eq!(doc.ad_number, UNKNOWN_AD_NUMBER);
        assert_eq!(doc.parsed, ParsedDocument::default());
        assert!(transport.requests().is_empty());
        assert_eq!(
            events,
            [
                ProgressEvent::AdNumberUnresolved {
                    document: "Airworthiness Directives; Boeing".into(),
                    reason: "no document number".into(),
                },
                ProgressEvent::NoFullTextLink {
                    document: "Airworthiness Directives; Boeing".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_full_text_link_is_reported() {
        let transport = ScriptedTransport::new()
            .route("/articles/2023-07001.json", r#"{"docket_ids": ["AD 2023-07-09"]}"#);
        let linkless = SearchHit {
            body_html_url: None,
            ..hit()
        };
        let mut events = Vec::new();
        let doc = fetch_document(&transport, &endpoints(), &linkless, &mut |e| {
            events.push(e.clone())
        })
        .await;

        assert_eq!(doc.ad_number, "AD 2023-07-09");
        assert_eq!(
            events,
            [ProgressEvent::NoFullTextLink {
                document: "2023-07001".into()
            }]
        );
        assert_eq!(transport.count_matching("/full_text/"), 0);
    }
}
