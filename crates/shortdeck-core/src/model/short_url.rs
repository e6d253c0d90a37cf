// ── Short URL domain types ──

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identified;

pub use shortdeck_api::ShortUrlMeta;

/// A shortened URL as cached by the dashboard.
///
/// Identity is `(short_code, domain)`; `domain == None` is the server's
/// default domain. Everything except `visits_count` is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub short_code: String,
    pub domain: Option<String>,
    pub short_url: String,
    pub long_url: String,
    /// Never decreases from the engine's point of view.
    pub visits_count: u64,
    pub date_created: DateTime<Utc>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub meta: ShortUrlMeta,
    pub crawlable: bool,
    pub forward_query: bool,
}

impl Identified for ShortUrl {
    type Key<'a> = (&'a str, Option<&'a str>);

    fn identity(&self) -> Self::Key<'_> {
        (&self.short_code, self.domain.as_deref())
    }
}

/// Owned identity key of a short URL, used to address it in API calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortUrlIdentifier {
    pub short_code: String,
    pub domain: Option<String>,
}

impl ShortUrlIdentifier {
    pub fn new(short_code: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            short_code: short_code.into(),
            domain,
        }
    }
}

impl Identified for ShortUrlIdentifier {
    type Key<'a> = (&'a str, Option<&'a str>);

    fn identity(&self) -> Self::Key<'_> {
        (&self.short_code, self.domain.as_deref())
    }
}

impl fmt::Display for ShortUrlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{domain}/{}", self.short_code),
            None => write!(f, "{}", self.short_code),
        }
    }
}

/// Server-reported pagination of a short URL listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub pages_count: u32,
    pub items_per_page: u32,
    pub items_in_current_page: u32,
    /// Adjusted locally by ±1 on create/delete.
    pub total_items: u64,
}

/// One page of short URLs, exactly as returned by a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlsList {
    pub data: Vec<Arc<ShortUrl>>,
    pub pagination: Pagination,
}
