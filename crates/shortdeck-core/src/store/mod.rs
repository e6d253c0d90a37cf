// ── Snapshot store ──
//
// One `watch` channel per slice. Events are applied by a single writer;
// each slice reduces the event independently and only notifies its
// subscribers when it actually changed.

pub mod domains;
pub mod mutation;
pub mod short_urls;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::event::Event;
use crate::model::{EditDomainRedirects, ShortUrl, ShortUrlIdentifier};
use crate::stream::StateStream;

pub use domains::DomainsListState;
pub use mutation::MutationState;
pub use short_urls::{OVERVIEW_PAGE_SIZE, ShortUrlsListState};

/// Replace the slice with `next(current)` when it yields a new state.
fn update<S>(slot: &watch::Sender<Arc<S>>, next: impl FnOnce(&S) -> Option<S>) -> bool {
    slot.send_if_modified(|current| match next(current) {
        Some(state) => {
            *current = Arc::new(state);
            true
        }
        None => false,
    })
}

pub struct DataStore {
    short_urls: watch::Sender<Arc<ShortUrlsListState>>,
    domains: watch::Sender<Arc<DomainsListState>>,
    short_url_creation: watch::Sender<Arc<MutationState<ShortUrl>>>,
    short_url_edition: watch::Sender<Arc<MutationState<ShortUrl>>>,
    short_url_deletion: watch::Sender<Arc<MutationState<ShortUrlIdentifier>>>,
    domain_redirects_edition: watch::Sender<Arc<MutationState<EditDomainRedirects>>>,
    /// Number of events applied so far.
    applied: watch::Sender<u64>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            short_urls: watch::Sender::new(Arc::default()),
            domains: watch::Sender::new(Arc::default()),
            short_url_creation: watch::Sender::new(Arc::default()),
            short_url_edition: watch::Sender::new(Arc::default()),
            short_url_deletion: watch::Sender::new(Arc::default()),
            domain_redirects_edition: watch::Sender::new(Arc::default()),
            applied: watch::Sender::new(0),
        }
    }

    /// Fold one event into every slice.
    ///
    /// Callers must serialize calls; the controller does so by applying
    /// events from a single task.
    pub fn apply(&self, event: &Event) {
        let lists_changed = update(&self.short_urls, |s| s.reduce(event))
            | update(&self.domains, |s| s.reduce(event));

        let mutation_changed = match event {
            Event::ShortUrlCreated(phase) => {
                update(&self.short_url_creation, |s| Some(s.reduce(phase)))
            }
            Event::ShortUrlEdited(phase) => {
                update(&self.short_url_edition, |s| Some(s.reduce(phase)))
            }
            Event::ShortUrlDeleted(phase) => {
                update(&self.short_url_deletion, |s| Some(s.reduce(phase)))
            }
            Event::DomainRedirectsEdited(phase) => {
                update(&self.domain_redirects_edition, |s| Some(s.reduce(phase)))
            }
            _ => false,
        };

        trace!(
            event = event.kind(),
            changed = lists_changed || mutation_changed,
            "event applied"
        );
        self.applied.send_modify(|applied| *applied += 1);
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn short_urls_snapshot(&self) -> Arc<ShortUrlsListState> {
        Arc::clone(&self.short_urls.borrow())
    }

    pub fn domains_snapshot(&self) -> Arc<DomainsListState> {
        Arc::clone(&self.domains.borrow())
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn short_urls(&self) -> StateStream<ShortUrlsListState> {
        StateStream::new(self.short_urls.subscribe())
    }

    pub fn domains(&self) -> StateStream<DomainsListState> {
        StateStream::new(self.domains.subscribe())
    }

    pub fn short_url_creation(&self) -> StateStream<MutationState<ShortUrl>> {
        StateStream::new(self.short_url_creation.subscribe())
    }

    pub fn short_url_edition(&self) -> StateStream<MutationState<ShortUrl>> {
        StateStream::new(self.short_url_edition.subscribe())
    }

    pub fn short_url_deletion(&self) -> StateStream<MutationState<ShortUrlIdentifier>> {
        StateStream::new(self.short_url_deletion.subscribe())
    }

    pub fn domain_redirects_edition(&self) -> StateStream<MutationState<EditDomainRedirects>> {
        StateStream::new(self.domain_redirects_edition.subscribe())
    }

    pub(crate) fn applied(&self) -> watch::Receiver<u64> {
        self.applied.subscribe()
    }
}
