// ── Live visit feed batching ──
//
// Visits pushed by the live feed reach the short URL collection through
// this task, which either forwards them right away or holds them for the
// configured interval and flushes them as one batch.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RealTimeUpdates;
use crate::event::Event;
use crate::model::CreateVisit;
use crate::task::Dispatcher;

/// Drop orphan visits; they cannot be matched to any cached short URL.
fn owned(visits: Vec<CreateVisit>) -> impl Iterator<Item = CreateVisit> {
    visits.into_iter().filter(|v| v.short_url.is_some())
}

fn flush(dispatcher: &Dispatcher, batch: &mut Vec<CreateVisit>) -> bool {
    if batch.is_empty() {
        return true;
    }
    debug!(visits = batch.len(), "flushing visits");
    dispatcher
        .dispatch(Event::VisitsRecorded(std::mem::take(batch)))
        .is_ok()
}

pub(crate) async fn visit_batcher_task(
    settings: RealTimeUpdates,
    mut rx: mpsc::UnboundedReceiver<Vec<CreateVisit>>,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
) {
    if !settings.enabled {
        info!("real-time updates disabled, dropping incoming visits");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                received = rx.recv() => {
                    if received.is_none() {
                        break;
                    }
                }
            }
        }
        return;
    }

    match settings.flush_interval() {
        None => immediate(&mut rx, &dispatcher, &cancel).await,
        Some(period) => buffered(period, &mut rx, &dispatcher, &cancel).await,
    }
    debug!("visit batcher stopped");
}

async fn immediate(
    rx: &mut mpsc::UnboundedReceiver<Vec<CreateVisit>>,
    dispatcher: &Dispatcher,
    cancel: &CancellationToken,
) {
    loop {
        let first = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Some(visits) => visits,
                None => break,
            },
        };

        // Whatever queued up meanwhile goes out in the same batch.
        let mut batch: Vec<CreateVisit> = owned(first).collect();
        while let Ok(more) = rx.try_recv() {
            batch.extend(owned(more));
        }
        if !flush(dispatcher, &mut batch) {
            break;
        }
    }
}

async fn buffered(
    period: Duration,
    rx: &mut mpsc::UnboundedReceiver<Vec<CreateVisit>>,
    dispatcher: &Dispatcher,
    cancel: &CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick
    let mut pending = Vec::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                while let Ok(more) = rx.try_recv() {
                    pending.extend(owned(more));
                }
                flush(dispatcher, &mut pending);
                break;
            }
            _ = interval.tick() => {
                if !flush(dispatcher, &mut pending) {
                    break;
                }
            }
            received = rx.recv() => match received {
                Some(visits) => pending.extend(owned(visits)),
                None => {
                    flush(dispatcher, &mut pending);
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tokio::time::Instant;

    use super::*;
    use crate::model::{ShortUrl, ShortUrlMeta, Visit};

    fn visit(short_code: Option<&str>, visits_count: u64) -> CreateVisit {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CreateVisit {
            short_url: short_code.map(|code| ShortUrl {
                short_code: code.into(),
                domain: None,
                short_url: format!("https://s.test/{code}"),
                long_url: "https://example.com".into(),
                visits_count,
                date_created: date,
                tags: Vec::new(),
                title: None,
                meta: ShortUrlMeta::default(),
                crawlable: false,
                forward_query: true,
            }),
            visit: Visit {
                date,
                referer: None,
                user_agent: None,
                potential_bot: false,
            },
        }
    }

    struct Harness {
        visits: mpsc::UnboundedSender<Vec<CreateVisit>>,
        events: mpsc::UnboundedReceiver<Event>,
        cancel: CancellationToken,
    }

    fn spawn(enabled: bool, interval_minutes: u32) -> Harness {
        let (visits, visits_rx) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(visit_batcher_task(
            RealTimeUpdates {
                enabled,
                interval_minutes,
            },
            visits_rx,
            Dispatcher::new(events_tx),
            cancel.clone(),
        ));
        Harness {
            visits,
            events,
            cancel,
        }
    }

    fn batch_len(event: Option<Event>) -> usize {
        match event {
            Some(Event::VisitsRecorded(visits)) => visits.len(),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn immediate_mode_forwards_and_skips_orphans() {
        let mut h = spawn(true, 0);

        h.visits
            .send(vec![visit(Some("abc"), 3), visit(None, 0)])
            .unwrap();

        assert_eq!(batch_len(h.events.recv().await), 1);
        h.cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn interval_mode_flushes_once_per_period() {
        let mut h = spawn(true, 1);
        let start = Instant::now();

        h.visits.send(vec![visit(Some("abc"), 3)]).unwrap();
        h.visits.send(vec![visit(Some("abc"), 4)]).unwrap();

        assert_eq!(batch_len(h.events.recv().await), 2);
        assert!(start.elapsed() >= Duration::from_secs(60));
        h.cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn interval_mode_flushes_pending_visits_on_cancel() {
        let mut h = spawn(true, 5);
        let start = Instant::now();

        h.visits.send(vec![visit(Some("abc"), 3)]).unwrap();
        tokio::task::yield_now().await;
        h.visits.send(vec![visit(Some("def"), 1), visit(None, 0)]).unwrap();
        h.cancel.cancel();

        assert_eq!(batch_len(h.events.recv().await), 2);
        assert!(start.elapsed() < Duration::from_secs(300));
        assert!(h.events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_mode_drops_everything() {
        let mut h = spawn(false, 0);

        h.visits.send(vec![visit(Some("abc"), 3)]).unwrap();
        drop(h.visits);

        assert!(h.events.recv().await.is_none());
    }
}
