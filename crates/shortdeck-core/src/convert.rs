// ── API-to-domain type conversions ──
//
// Bridges raw `shortdeck_api` response types into canonical
// `shortdeck_core::model` types.

use std::sync::Arc;

use shortdeck_api::{
    DomainResponse, DomainsPage, PaginationResponse, ShortUrlResponse, ShortUrlsPage,
};

use crate::model::{Domain, DomainStatus, DomainsListing, Pagination, ShortUrl, ShortUrlsList};

impl From<ShortUrlResponse> for ShortUrl {
    fn from(raw: ShortUrlResponse) -> Self {
        // Newer servers only fill `visitsSummary`; older ones only `visitsCount`.
        let visits_count = raw
            .visits_summary
            .map(|s| s.total)
            .or(raw.visits_count)
            .unwrap_or_default();

        Self {
            short_code: raw.short_code,
            domain: raw.domain,
            short_url: raw.short_url,
            long_url: raw.long_url,
            visits_count,
            date_created: raw.date_created,
            tags: raw.tags,
            title: raw.title,
            meta: raw.meta,
            crawlable: raw.crawlable,
            forward_query: raw.forward_query,
        }
    }
}

impl From<PaginationResponse> for Pagination {
    fn from(raw: PaginationResponse) -> Self {
        Self {
            current_page: raw.current_page,
            pages_count: raw.pages_count,
            items_per_page: raw.items_per_page,
            items_in_current_page: raw.items_in_current_page,
            total_items: raw.total_items,
        }
    }
}

impl From<ShortUrlsPage> for ShortUrlsList {
    fn from(raw: ShortUrlsPage) -> Self {
        Self {
            data: raw
                .data
                .into_iter()
                .map(|s| Arc::new(ShortUrl::from(s)))
                .collect(),
            pagination: raw.pagination.into(),
        }
    }
}

/// Freshly listed domains always start out `Validating`, whatever the
/// transport said about them.
impl From<DomainResponse> for Domain {
    fn from(raw: DomainResponse) -> Self {
        Self {
            domain: raw.domain,
            is_default: raw.is_default,
            redirects: raw.redirects,
            status: DomainStatus::Validating,
        }
    }
}

impl From<DomainsPage> for DomainsListing {
    fn from(raw: DomainsPage) -> Self {
        Self {
            domains: raw
                .data
                .into_iter()
                .map(|d| Arc::new(Domain::from(d)))
                .collect(),
            default_redirects: raw.default_redirects,
        }
    }
}
