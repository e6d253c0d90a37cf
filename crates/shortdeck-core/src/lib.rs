//! Client-side collection synchronization engine for Shlink dashboards.
//!
//! Keeps two cached collections, short URLs and domains, consistent with a
//! stream of independently issued events without refetching them after
//! every change:
//!
//! - **Collection engines** ([`store::short_urls`], [`store::domains`]):
//!   pure reducers `(state, event) -> state` over immutable snapshots.
//!   Reconciliation events that target missing state or unknown entities
//!   degrade to no-ops.
//!
//! - **[`Event`]**: one tagged enum consumed by both engines, so a flow
//!   owned by one slice (e.g. redirect edition) is observed by the other
//!   without string matching.
//!
//! - **[`run_task`]**: brackets any network call with
//!   [`TaskPhase::Pending`] and [`TaskPhase::Fulfilled`] /
//!   [`TaskPhase::Rejected`] events.
//!
//! - **[`DataStore`]**: one `tokio::sync::watch` channel per slice, written
//!   by a single event loop and read through [`StateStream<T>`].
//!
//! - **[`Controller`]**: facade owning the event queue, the selected server
//!   and the live visit batcher. [`Controller::settled()`] waits for every
//!   dispatched event to be applied.

pub mod api;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod event;
pub mod model;
pub mod store;
pub mod stream;
pub mod task;
mod visits;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{HealthReport, ShortenerApi};
pub use config::{ControllerConfig, RealTimeUpdates, ServerConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use event::{Event, TaskPhase};
pub use store::{
    DataStore, DomainsListState, MutationState, OVERVIEW_PAGE_SIZE, ShortUrlsListState,
};
pub use stream::StateStream;
pub use task::{Dispatcher, run_task};

pub use model::{
    CreateVisit, Domain, DomainHealth, DomainRedirects, DomainStatus, DomainsListing,
    EditDomainRedirects, Identified, Pagination, ProblemDetails, ShortUrl, ShortUrlDraft,
    ShortUrlEdit, ShortUrlIdentifier, ShortUrlMeta, ShortUrlsList, ShortUrlsQuery, Visit,
    merge_count, replace_matching, same_entity,
};
