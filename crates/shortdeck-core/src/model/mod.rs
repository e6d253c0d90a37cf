// ── Domain model ──
//
// Canonical types cached by the engines. Wire shapes live in
// `shortdeck-api`; `crate::convert` translates between the two.

pub mod domain;
pub mod identity;
pub mod short_url;
pub mod visit;

pub use domain::{
    Domain, DomainHealth, DomainRedirects, DomainStatus, DomainsListing, EditDomainRedirects,
};
pub use identity::{Identified, merge_count, replace_matching, same_entity};
pub use short_url::{Pagination, ShortUrl, ShortUrlIdentifier, ShortUrlMeta, ShortUrlsList};
pub use visit::{CreateVisit, Visit};

pub use shortdeck_api::{
    CreateShortUrlRequest as ShortUrlDraft, EditShortUrlRequest as ShortUrlEdit, ProblemDetails,
    ShortUrlsQuery,
};
