// ── Events ──
//
// Every state change in the store is one of these. Both collection engines
// consume the same enum and ignore variants they do not care about, so a
// flow owned by one slice (e.g. redirect edition) can be observed by another
// without any string matching on action names.

use crate::model::{
    CreateVisit, DomainHealth, DomainsListing, EditDomainRedirects, ProblemDetails, ShortUrl,
    ShortUrlIdentifier, ShortUrlsList,
};

/// Lifecycle of one network-backed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase<T> {
    Pending,
    Fulfilled(T),
    /// Carries problem details when the server sent them.
    Rejected(Option<ProblemDetails>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ── Short URLs ───────────────────────────────────────────────────
    ShortUrlsListed(TaskPhase<ShortUrlsList>),
    ShortUrlCreated(TaskPhase<ShortUrl>),
    ShortUrlEdited(TaskPhase<ShortUrl>),
    ShortUrlDeleted(TaskPhase<ShortUrlIdentifier>),
    /// Batch from the live visit feed.
    VisitsRecorded(Vec<CreateVisit>),

    // ── Domains ──────────────────────────────────────────────────────
    DomainsListed(TaskPhase<DomainsListing>),
    /// Probes never reject: failures already resolved to `Invalid`.
    DomainHealthChecked(DomainHealth),
    DomainsFiltered(String),
    DomainRedirectsEdited(TaskPhase<EditDomainRedirects>),
}

impl Event {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShortUrlsListed(_) => "short_urls_listed",
            Self::ShortUrlCreated(_) => "short_url_created",
            Self::ShortUrlEdited(_) => "short_url_edited",
            Self::ShortUrlDeleted(_) => "short_url_deleted",
            Self::VisitsRecorded(_) => "visits_recorded",
            Self::DomainsListed(_) => "domains_listed",
            Self::DomainHealthChecked(_) => "domain_health_checked",
            Self::DomainsFiltered(_) => "domains_filtered",
            Self::DomainRedirectsEdited(_) => "domain_redirects_edited",
        }
    }
}
