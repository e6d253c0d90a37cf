// ── Controller facade ──
//
// Owns the event queue, the store and the selected server. Every
// operation runs as a three-phase task whose events are applied by a
// single background task, so readers only ever observe whole snapshots.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use futures_util::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shortdeck_api::{ShlinkClient, replace_authority};

use crate::api::{HealthReport, ShortenerApi};
use crate::config::{ControllerConfig, ServerConfig};
use crate::error::CoreError;
use crate::event::Event;
use crate::model::{
    CreateVisit, DomainHealth, DomainStatus, DomainsListing, EditDomainRedirects, ShortUrl,
    ShortUrlDraft, ShortUrlEdit, ShortUrlIdentifier, ShortUrlsList, ShortUrlsQuery,
};
use crate::store::{DataStore, DomainsListState, MutationState, ShortUrlsListState};
use crate::stream::StateStream;
use crate::task::{Dispatcher, run_task};
use crate::visits::visit_batcher_task;

// ── SelectedServer ───────────────────────────────────────────────

/// The server operations currently run against.
struct SelectedServer {
    config: ServerConfig,
    api: Arc<dyn ShortenerApi>,
}

// ── Controller ───────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Nothing is applied to the
/// store until [`start()`](Self::start) spawns the event loop; events
/// dispatched before that are queued.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    dispatcher: Dispatcher,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    visits_tx: mpsc::UnboundedSender<Vec<CreateVisit>>,
    visits_rx: Mutex<Option<mpsc::UnboundedReceiver<Vec<CreateVisit>>>>,
    selected: ArcSwapOption<SelectedServer>,
    cancel: CancellationToken,
    batcher_cancel: CancellationToken,
    batcher_handle: Mutex<Option<JoinHandle<()>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller, building an HTTP client for the initially
    /// selected server if the configuration names one.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let controller = Self::build(config);
        if let Some(server) = controller.inner.config.server.clone() {
            controller.select_server(server)?;
        }
        Ok(controller)
    }

    /// Create a controller whose initially selected server is reached
    /// through `api` instead of HTTP.
    pub fn with_api(config: ControllerConfig, api: Arc<dyn ShortenerApi>) -> Self {
        let controller = Self::build(config);
        if let Some(server) = controller.inner.config.server.clone() {
            controller.select_server_with(server, api);
        }
        controller
    }

    fn build(config: ControllerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (visits_tx, visits_rx) = mpsc::unbounded_channel();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DataStore::new()),
                dispatcher: Dispatcher::new(event_tx),
                event_rx: Mutex::new(Some(event_rx)),
                visits_tx,
                visits_rx: Mutex::new(Some(visits_rx)),
                selected: ArcSwapOption::empty(),
                cancel: CancellationToken::new(),
                batcher_cancel: CancellationToken::new(),
                batcher_handle: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Handle for dispatching events directly, e.g. from an external flow.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the event loop and the visit batcher. Calling it again is a
    /// no-op.
    pub async fn start(&self) {
        let Some(event_rx) = self.inner.event_rx.lock().await.take() else {
            debug!("controller already started");
            return;
        };
        let mut handles = self.inner.task_handles.lock().await;

        handles.push(tokio::spawn(event_loop_task(
            Arc::clone(&self.inner.store),
            event_rx,
            self.inner.cancel.clone(),
        )));

        if let Some(visits_rx) = self.inner.visits_rx.lock().await.take() {
            *self.inner.batcher_handle.lock().await = Some(tokio::spawn(visit_batcher_task(
                self.inner.config.real_time_updates,
                visits_rx,
                self.inner.dispatcher.clone(),
                self.inner.batcher_cancel.clone(),
            )));
        }

        info!("controller started");
    }

    /// Stop background tasks. Buffered visits are flushed first, then
    /// every queued event is applied before the event loop exits.
    pub async fn shutdown(&self) {
        self.inner.batcher_cancel.cancel();
        if let Some(batcher) = self.inner.batcher_handle.lock().await.take() {
            let _ = batcher.await;
        }
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller stopped");
    }

    /// Start, run `f`, wait for its events to land, stop. The controller is
    /// stopped even when `f` or the wait fails; `f`'s error wins.
    pub async fn oneshot<F, Fut, T>(self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.start().await;
        let result = f(self.clone()).await;
        let settled = self.settled().await;
        self.shutdown().await;
        let value = result?;
        settled.map(|()| value)
    }

    /// Wait until every event dispatched so far has been applied.
    pub async fn settled(&self) -> Result<(), CoreError> {
        let target = self.inner.dispatcher.dispatched();
        if self.inner.event_rx.lock().await.is_some() {
            // Not started: nothing will ever be applied.
            return if *self.inner.store.applied().borrow() >= target {
                Ok(())
            } else {
                Err(CoreError::ControllerStopped)
            };
        }

        let mut applied = self.inner.store.applied();
        tokio::select! {
            result = applied.wait_for(|n| *n >= target) => {
                result.map(|_| ()).map_err(|_| CoreError::ControllerStopped)
            }
            () = self.inner.cancel.cancelled() => {
                // The loop drains what was queued before it exits.
                for handle in self.inner.task_handles.lock().await.drain(..) {
                    let _ = handle.await;
                }
                if *self.inner.store.applied().borrow() >= target {
                    Ok(())
                } else {
                    Err(CoreError::ControllerStopped)
                }
            }
        }
    }

    // ── Selected server ──────────────────────────────────────────

    pub fn select_server(&self, server: ServerConfig) -> Result<(), CoreError> {
        let client = ShlinkClient::new(server.url.as_str(), &server.api_key, &server.transport())?;
        self.select_server_with(server, Arc::new(client));
        Ok(())
    }

    pub fn select_server_with(&self, server: ServerConfig, api: Arc<dyn ShortenerApi>) {
        info!(server = %server.name, url = %server.url, "server selected");
        self.inner.selected.store(Some(Arc::new(SelectedServer {
            config: server,
            api,
        })));
    }

    pub fn reset_selected_server(&self) {
        debug!("selected server reset");
        self.inner.selected.store(None);
    }

    pub fn selected_server(&self) -> Option<ServerConfig> {
        self.inner
            .selected
            .load_full()
            .map(|selected| selected.config.clone())
    }

    fn api(&self) -> Result<Arc<dyn ShortenerApi>, CoreError> {
        self.inner
            .selected
            .load_full()
            .map(|selected| Arc::clone(&selected.api))
            .ok_or(CoreError::NoServerSelected)
    }

    // ── Short URLs ───────────────────────────────────────────────

    pub async fn list_short_urls(&self, query: ShortUrlsQuery) -> Result<ShortUrlsList, CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::ShortUrlsListed, async move {
            api?.list_short_urls(&query).await
        })
        .await
    }

    pub async fn create_short_url(&self, draft: ShortUrlDraft) -> Result<ShortUrl, CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::ShortUrlCreated, async move {
            api?.create_short_url(&draft).await
        })
        .await
    }

    pub async fn edit_short_url(
        &self,
        id: ShortUrlIdentifier,
        edit: ShortUrlEdit,
    ) -> Result<ShortUrl, CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::ShortUrlEdited, async move {
            api?.edit_short_url(&id, &edit).await
        })
        .await
    }

    pub async fn delete_short_url(&self, id: ShortUrlIdentifier) -> Result<(), CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::ShortUrlDeleted, async move {
            api?.delete_short_url(&id).await.map(|()| id)
        })
        .await
        .map(drop)
    }

    /// Feed a batch from the live visit feed into the batcher.
    pub fn record_visits(&self, visits: Vec<CreateVisit>) -> Result<(), CoreError> {
        self.inner
            .visits_tx
            .send(visits)
            .map_err(|_| CoreError::ControllerStopped)
    }

    // ── Domains ──────────────────────────────────────────────────

    pub async fn list_domains(&self) -> Result<DomainsListing, CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::DomainsListed, async move {
            api?.list_domains().await
        })
        .await
    }

    /// Probe one domain and record the outcome.
    ///
    /// Never fails on probe errors: those resolve to `Invalid`.
    pub async fn check_domain_health(&self, domain: &str) -> Result<DomainStatus, CoreError> {
        let status = self.probe(domain).await;
        self.inner
            .dispatcher
            .dispatch(Event::DomainHealthChecked(DomainHealth {
                domain: domain.to_owned(),
                status,
            }))?;
        Ok(status)
    }

    /// Probe every cached domain concurrently.
    pub async fn validate_domains(&self) -> Result<Vec<DomainHealth>, CoreError> {
        let domains = self.inner.store.domains_snapshot();
        let checks = domains.domains.iter().map(|d| async move {
            let status = self.check_domain_health(&d.domain).await?;
            Ok::<_, CoreError>(DomainHealth {
                domain: d.domain.clone(),
                status,
            })
        });
        join_all(checks).await.into_iter().collect()
    }

    async fn probe(&self, domain: &str) -> DomainStatus {
        let Some(selected) = self.inner.selected.load_full() else {
            debug!(domain, "no server selected, domain marked invalid");
            return DomainStatus::Invalid;
        };

        let url = match replace_authority(&selected.config.url, domain) {
            Ok(url) => url,
            Err(e) => {
                warn!(domain, error = %e, "cannot build health URL");
                return DomainStatus::Invalid;
            }
        };

        match selected.api.check_health(&url).await {
            Ok(HealthReport::Pass) => DomainStatus::Valid,
            Ok(HealthReport::Fail) => DomainStatus::Invalid,
            Err(e) => {
                warn!(domain, error = %e, "health probe failed");
                DomainStatus::Invalid
            }
        }
    }

    pub fn filter_domains(&self, term: impl Into<String>) -> Result<(), CoreError> {
        self.inner
            .dispatcher
            .dispatch(Event::DomainsFiltered(term.into()))
    }

    pub async fn edit_domain_redirects(
        &self,
        edit: EditDomainRedirects,
    ) -> Result<EditDomainRedirects, CoreError> {
        let api = self.api();
        run_task(&self.inner.dispatcher, Event::DomainRedirectsEdited, async move {
            let redirects = api?.edit_domain_redirects(&edit).await?;
            Ok(EditDomainRedirects {
                domain: edit.domain,
                redirects,
            })
        })
        .await
    }

    // ── State observation ────────────────────────────────────────

    pub fn short_urls(&self) -> StateStream<ShortUrlsListState> {
        self.inner.store.short_urls()
    }

    pub fn domains(&self) -> StateStream<DomainsListState> {
        self.inner.store.domains()
    }

    pub fn short_url_creation(&self) -> StateStream<MutationState<ShortUrl>> {
        self.inner.store.short_url_creation()
    }

    pub fn short_url_edition(&self) -> StateStream<MutationState<ShortUrl>> {
        self.inner.store.short_url_edition()
    }

    pub fn short_url_deletion(&self) -> StateStream<MutationState<ShortUrlIdentifier>> {
        self.inner.store.short_url_deletion()
    }

    pub fn domain_redirects_edition(&self) -> StateStream<MutationState<EditDomainRedirects>> {
        self.inner.store.domain_redirects_edition()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Single writer for the store.
async fn event_loop_task(
    store: Arc<DataStore>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
) {
    info!("event loop started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => store.apply(&event),
                None => break,
            },
        }
    }

    rx.close();
    while let Ok(event) = rx.try_recv() {
        store.apply(&event);
    }
    info!("event loop stopped");
}
