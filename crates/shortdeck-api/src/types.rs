// Wire types for the Shlink REST API (v3).
//
// Field names follow the JSON payloads verbatim (camelCase). These are
// transport shapes only; `shortdeck-core` converts them into its own model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Problem details ──────────────────────────────────────────────────

/// RFC 7807 error body returned by every failing endpoint.
///
/// Members beyond the standard five are kept in `extra` (e.g. `invalidElements`
/// on validation failures, `shortCode` on not-found errors).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type", default)]
    pub problem_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProblemDetails {
    /// Best human-readable line: `detail`, falling back to `title`.
    pub fn summary(&self) -> &str {
        if self.detail.is_empty() {
            &self.title
        } else {
            &self.detail
        }
    }

    /// Whether a decoded JSON value looks like a problem-details document.
    pub(crate) fn looks_like(value: &serde_json::Value) -> bool {
        value.get("type").is_some_and(serde_json::Value::is_string)
            && (value.get("title").is_some() || value.get("detail").is_some())
    }
}

// ── Short URLs ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlMeta {
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsSummary {
    pub total: u64,
    pub non_bots: Option<u64>,
    pub bots: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortUrlResponse {
    pub short_code: String,
    #[serde(default)]
    pub short_url: String,
    pub long_url: String,
    pub date_created: DateTime<Utc>,
    /// Deprecated by the server in favour of `visitsSummary`, still sent by older versions.
    #[serde(default)]
    pub visits_count: Option<u64>,
    #[serde(default)]
    pub visits_summary: Option<VisitsSummary>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta: ShortUrlMeta,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub crawlable: bool,
    #[serde(default)]
    pub forward_query: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub pages_count: u32,
    #[serde(default)]
    pub items_per_page: u32,
    #[serde(default)]
    pub items_in_current_page: u32,
    #[serde(default)]
    pub total_items: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrlsPage {
    pub data: Vec<ShortUrlResponse>,
    #[serde(default)]
    pub pagination: PaginationResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShortUrlsEnvelope {
    pub short_urls: ShortUrlsPage,
}

/// Query string for `GET /short-urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlsQuery {
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub search_term: Option<String>,
    pub tags: Vec<String>,
    pub order_by: Option<String>,
}

impl ShortUrlsQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.items_per_page {
            params.push(("itemsPerPage", per_page.to_string()));
        }
        if let Some(ref term) = self.search_term {
            params.push(("searchTerm", term.clone()));
        }
        for tag in &self.tags {
            params.push(("tags[]", tag.clone()));
        }
        if let Some(ref order) = self.order_by {
            params.push(("orderBy", order.clone()));
        }
        params
    }
}

/// Body for `POST /short-urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortUrlRequest {
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_if_exists: Option<bool>,
}

/// Body for `PATCH /short-urls/{shortCode}`. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditShortUrlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawlable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_query: Option<bool>,
}

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRedirects {
    pub base_url_redirect: Option<String>,
    #[serde(rename = "regular404Redirect")]
    pub regular_404_redirect: Option<String>,
    pub invalid_short_url_redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    pub domain: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub redirects: Option<DomainRedirects>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainsPage {
    pub data: Vec<DomainResponse>,
    #[serde(default)]
    pub default_redirects: Option<DomainRedirects>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DomainsEnvelope {
    pub domains: DomainsPage,
}

/// Body for `PATCH /domains/redirects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDomainRedirectsRequest {
    pub domain: String,
    #[serde(flatten)]
    pub redirects: DomainRedirects,
}

// ── Health ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthResponse {
    pub fn is_pass(&self) -> bool {
        self.status == "pass"
    }
}
