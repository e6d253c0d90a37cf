// ── Event dispatch and three-phase tasks ──
//
// Every network-backed operation goes through `run_task`, which brackets
// the future with Pending and Fulfilled/Rejected events. Reducers never
// await: they only see the discrete phases.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::CoreError;
use crate::event::{Event, TaskPhase};

/// Sending half of the event queue.
///
/// Cheap to clone. Counts every accepted event so the controller can tell
/// when the store has caught up.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Event>,
    dispatched: Arc<AtomicU64>,
}

impl Dispatcher {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            tx,
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue `event` for the store.
    pub fn dispatch(&self, event: Event) -> Result<(), CoreError> {
        debug!(event = event.kind(), "dispatch");
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.tx.send(event).map_err(|_| {
            self.dispatched.fetch_sub(1, Ordering::SeqCst);
            CoreError::ControllerStopped
        })
    }

    /// Events accepted so far.
    pub(crate) fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }
}

/// Run `task`, dispatching its lifecycle through `wrap`.
///
/// The outcome is returned to the caller as well, so call sites can act on
/// the echoed entity without reading it back from the store. Rejections carry
/// problem details when the server sent them.
pub async fn run_task<T, W, F>(dispatcher: &Dispatcher, wrap: W, task: F) -> Result<T, CoreError>
where
    T: Clone,
    W: Fn(TaskPhase<T>) -> Event,
    F: Future<Output = Result<T, CoreError>>,
{
    dispatcher.dispatch(wrap(TaskPhase::Pending))?;
    match task.await {
        Ok(value) => {
            dispatcher.dispatch(wrap(TaskPhase::Fulfilled(value.clone())))?;
            Ok(value)
        }
        Err(e) => {
            dispatcher.dispatch(wrap(TaskPhase::Rejected(e.problem_details())))?;
            Err(e)
        }
    }
}
