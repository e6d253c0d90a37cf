//! Async client for the Shlink URL shortener REST API.
//!
//! - **[`ShlinkClient`]**: one server, API-key authenticated, JSON in and out.
//!   Short URL listing/creation/edition/deletion, domain listing, domain
//!   redirect edition and the unauthenticated health endpoint.
//! - **[`Error`]**: transport and server failures. Failing responses carrying
//!   an RFC 7807 body surface as [`Error::Api`] with the decoded
//!   [`ProblemDetails`].
//! - **[`replace_authority`]**: derive a per-domain server URL for probing
//!   custom domains.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;
pub mod uri;

pub use client::ShlinkClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    CreateShortUrlRequest, DomainRedirects, DomainResponse, DomainsPage,
    EditDomainRedirectsRequest, EditShortUrlRequest, HealthResponse, PaginationResponse,
    ProblemDetails, ShortUrlMeta, ShortUrlResponse, ShortUrlsPage, ShortUrlsQuery, VisitsSummary,
};
pub use uri::replace_authority;
