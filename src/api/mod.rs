pub mod document;
pub mod search;

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::FetchError;

const AGENCY: &str = "federal-aviation-administration";
const DOCUMENT_TYPE: &str = "RULE";
pub const PER_PAGE: u32 = 100;

const SEARCH_FIELDS: &[&str] = &[
    "title",
    "abstract",
    "publication_date",
    "pdf_url",
    "document_number",
    "body_html_url",
];

const LOOKUP_FIELDS: &[&str] = &["pdf_url", "document_number", "title", "body_html_url"];

/// One entry of the publication index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub publication_date: Option<String>,
    pub document_number: Option<String>,
    pub body_html_url: Option<String>,
    pub pdf_url: Option<String>,
}

/// One page of `articles.json`.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchHit>,
    pub total_pages: Option<u32>,
    pub count: Option<u64>,
}

impl SearchPage {
    pub fn total_pages(&self) -> u32 {
        self.total_pages.unwrap_or(1)
    }

    pub fn count(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Make/model/date filter for one run.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub make: String,
    pub model: String,
    pub start_date: String,
}

impl SearchQuery {
    pub fn new(make: &str, model: &str, start_date: &str) -> Self {
        Self {
            make: make.to_string(),
            model: model.to_string(),
            start_date: start_date.to_string(),
        }
    }

    pub fn term(&self) -> String {
        format!(
            "\"Airworthiness Directives\" \"{}\" \"{}\"",
            self.make, self.model
        )
    }

    /// Query-string pairs for page `page` of this search.
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("conditions[agencies][]", AGENCY.to_string()),
            ("conditions[type][]", DOCUMENT_TYPE.to_string()),
            ("conditions[term]", self.term()),
            ("conditions[publication_date][gte]", self.start_date.clone()),
            ("order", "newest".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        params.extend(SEARCH_FIELDS.iter().map(|f| ("fields[]", f.to_string())));
        params
    }
}

/// URL construction for the Federal Register API.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, query: &SearchQuery, page: u32) -> Result<Url, FetchError> {
        let base = format!("{}/articles.json", self.base_url);
        Ok(Url::parse_with_params(&base, query.params(page))?)
    }

    /// Single-document metadata, which carries the docket identifiers.
    pub fn document_url(&self, document_number: &str) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!(
            "{}/articles/{}.json",
            self.base_url, document_number
        ))?)
    }

    /// Free-text lookup of one AD by its number.
    pub fn lookup_url(&self, ad_number: &str) -> Result<Url, FetchError> {
        let base = format!("{}/articles.json", self.base_url);
        let mut params = vec![
            ("conditions[agencies][]", AGENCY.to_string()),
            ("conditions[type][]", DOCUMENT_TYPE.to_string()),
            ("conditions[term]", ad_number.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        params.extend(LOOKUP_FIELDS.iter().map(|f| ("fields[]", f.to_string())));
        Ok(Url::parse_with_params(&base, params)?)
    }
}
