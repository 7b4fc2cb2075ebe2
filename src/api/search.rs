use tracing::{info, warn};

use super::{Endpoints, SearchHit, SearchPage, SearchQuery};
use crate::error::FetchError;
use crate::progress::{emit, ProgressEvent, Reporter};
use crate::transport::Transport;

/// Walk the result pages for `query`, newest first.
///
/// Stops on an empty page or the last reported page. A failed page ends the
/// walk early and the hits gathered so far are returned.
pub async fn paginated_search<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    query: &SearchQuery,
    reporter: Reporter<'_>,
) -> Vec<SearchHit> {
    emit(reporter, ProgressEvent::SearchStarted);

    let mut hits = Vec::new();
    let mut page = 1;

    loop {
        let result = match fetch_page(transport, endpoints, query, page).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, error = %e, "search page failed");
                emit(
                    reporter,
                    ProgressEvent::PageFailed {
                        page,
                        error: e.to_string(),
                    },
                );
                break;
            }
        };

        if result.results.is_empty() {
            break;
        }

        let total_pages = result.total_pages();
        if page == 1 {
            emit(
                reporter,
                ProgressEvent::ResultsFound {
                    count: result.count(),
                    total_pages,
                },
            );
        }
        if total_pages > 1 {
            emit(reporter, ProgressEvent::PageFetched { page, total_pages });
        }

        hits.extend(result.results);

        if page >= total_pages {
            break;
        }
        page += 1;
    }

    info!(hits = hits.len(), pages = page, "search finished");
    hits
}

async fn fetch_page<T: Transport>(
    transport: &T,
    endpoints: &Endpoints,
    query: &SearchQuery,
    page: u32,
) -> Result<SearchPage, FetchError> {
    let url = endpoints.search_url(query, page)?;
    let body = transport.get_text(url.as_str()).await?;
    Ok(serde_json::from_str(&body)?)
}
