use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{info, warn};

use crate::api::{Endpoints, SearchPage};
use crate::error::FetchError;
use crate::parser::html;
use crate::progress::{emit, ProgressEvent, Reporter};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    /// Cleaned amendment text as a standalone HTML page
    Html,
    /// The publisher's original PDF
    Original,
}

/// Why a single AD download produced no file.
#[derive(Debug)]
enum Miss {
    NotFound,
    NoLink(&'static str),
    Failed(FetchError),
}

impl std::fmt::Display for Miss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Miss::NotFound => write!(f, "Not found."),
            Miss::NoLink(what) => write!(f, "No {} available.", what),
            Miss::Failed(e) => write!(f, "Error: {}", e),
        }
    }
}

impl From<FetchError> for Miss {
    fn from(e: FetchError) -> Self {
        Miss::Failed(e)
    }
}

/// Download every AD in `ad_numbers` into `dir`; returns how many were saved.
pub async fn fetch_all<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    ad_numbers: &[String],
    format: DocumentFormat,
    dir: &Path,
    reporter: Reporter<'_>,
) -> usize {
    let mut saved = 0;
    for ad in ad_numbers {
        if fetch_ad(transport, endpoints, ad, format, dir, reporter).await {
            saved += 1;
        }
    }
    emit(
        reporter,
        ProgressEvent::DownloadsFinished {
            saved,
            requested: ad_numbers.len(),
        },
    );
    saved
}

/// Look up one AD by number and save it in `format`. Failures are reported, not returned.
pub async fn fetch_ad<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    ad_number: &str,
    format: DocumentFormat,
    dir: &Path,
    reporter: Reporter<'_>,
) -> bool {
    emit(
        reporter,
        ProgressEvent::LookupStarted {
            ad_number: ad_number.to_string(),
        },
    );
    match try_fetch(transport, endpoints, ad_number, format, dir).await {
        Ok(path) => {
            info!(ad_number, path = %path.display(), "saved");
            emit(
                reporter,
                ProgressEvent::Saved {
                    path: path.display().to_string(),
                },
            );
            true
        }
        Err(miss) => {
            warn!(ad_number, reason = %miss, "download failed");
            emit(
                reporter,
                ProgressEvent::LookupFailed {
                    ad_number: ad_number.to_string(),
                    reason: miss.to_string(),
                },
            );
            false
        }
    }
}

async fn try_fetch<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    ad_number: &str,
    format: DocumentFormat,
    dir: &Path,
) -> Result<PathBuf, Miss> {
    let url = endpoints.lookup_url(ad_number)?;
    let body = transport.get_text(url.as_str()).await?;
    let page: SearchPage = serde_json::from_str(&body).map_err(FetchError::from)?;
    // First hit is taken as the match.
    let hit = page.results.into_iter().next().ok_or(Miss::NotFound)?;
    let clean = clean_ad_number(ad_number);

    match format {
        DocumentFormat::Original => {
            let pdf_url = hit.pdf_url.ok_or(Miss::NoLink("original PDF"))?;
            let bytes = transport.get_bytes(&pdf_url).await?;
            let path = dir.join(format!("{}_original.pdf", clean));
            tokio::fs::write(&path, bytes).await.map_err(FetchError::from)?;
            Ok(path)
        }
        DocumentFormat::Html => {
            let html_url = hit.body_html_url.ok_or(Miss::NoLink("HTML content"))?;
            let raw = transport.get_text(&html_url).await?;
            let path = dir.join(format!("AD {}.html", clean));
            tokio::fs::write(&path, standalone_page(&clean, &raw))
                .await
                .map_err(FetchError::from)?;
            Ok(path)
        }
    }
}

/// Letters, digits, '-' and '_' only, for use in file names.
pub fn clean_ad_number(ad_number: &str) -> String {
    ad_number
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .to_string()
}

fn standalone_page(clean: &str, raw: &str) -> String {
    let body = html::strip_printed_page_markers(html::trim_to_amendment(raw));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>AD {}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        clean, body
    )
}
