// ── State subscription handle ──
//
// Thin wrapper over a `watch::Receiver` holding one store slice. Readers
// never block the writer: every value is an immutable `Arc` snapshot.

use std::sync::Arc;

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Subscription to one slice of the [`DataStore`](crate::DataStore).
pub struct StateStream<T> {
    receiver: watch::Receiver<Arc<T>>,
}

impl<T: Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<T>>) -> Self {
        Self { receiver }
    }

    /// Snapshot as of now, without marking it seen.
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.receiver.borrow())
    }

    /// Snapshot as of now, marking it seen for [`changed`](Self::changed).
    pub fn latest(&mut self) -> Arc<T> {
        Arc::clone(&self.receiver.borrow_and_update())
    }

    /// Whether a snapshot newer than the last seen one is available.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next unseen snapshot. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }

    /// Yields the current snapshot, then every subsequent one.
    pub fn into_stream(self) -> impl Stream<Item = Arc<T>> {
        WatchStream::new(self.receiver)
    }
}

impl<T> Clone for StateStream<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn changed_sees_each_new_snapshot() {
        let (tx, rx) = watch::channel(Arc::new(1));
        let mut stream = StateStream::new(rx);

        assert_eq!(*stream.latest(), 1);
        tx.send_replace(Arc::new(2));

        assert_eq!(stream.changed().await.as_deref(), Some(&2));
        drop(tx);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn into_stream_starts_with_current() {
        let (tx, rx) = watch::channel(Arc::new("a"));
        let mut stream = Box::pin(StateStream::new(rx).into_stream());

        assert_eq!(stream.next().await.as_deref(), Some(&"a"));
        tx.send_replace(Arc::new("b"));
        assert_eq!(stream.next().await.as_deref(), Some(&"b"));
    }
}
