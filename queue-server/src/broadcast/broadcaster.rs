//! Per-day change broadcaster

use parking_lot::Mutex;
use serde::Serialize;
use shared::models::QueueSnapshot;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::Subscription;
use crate::queue::{QueueChange, QueueManager, QueueResult};

/// Broadcaster counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastStats {
    /// Days with a live upstream task
    pub active_days: usize,
    /// Registered sinks across all days
    pub subscribers: usize,
    /// Upstream subscriptions opened since start
    pub upstream_opened: u64,
    /// Relevant upstream changes turned into a snapshot rebuild
    pub upstream_changes: u64,
    /// Snapshots delivered to sinks after a rebuild
    pub messages_pushed: u64,
}

struct DayChannel {
    /// Latest-value sinks; a slow client only ever misses superseded snapshots
    sinks: HashMap<u64, watch::Sender<QueueSnapshot>>,
    snapshot: QueueSnapshot,
    cancel: CancellationToken,
}

impl DayChannel {
    /// New sink seeded with the cached snapshot, unseen
    fn add_sink(&mut self, sink_id: u64) -> watch::Receiver<QueueSnapshot> {
        let (tx, mut rx) = watch::channel(self.snapshot.clone());
        rx.mark_changed();
        self.sinks.insert(sink_id, tx);
        rx
    }
}

struct Inner {
    manager: Arc<QueueManager>,
    days: Mutex<HashMap<String, DayChannel>>,
    next_sink_id: AtomicU64,
    upstream_opened: AtomicU64,
    upstream_changes: AtomicU64,
    messages_pushed: AtomicU64,
}

/// Fans one upstream change feed out to many per-day client sinks
#[derive(Clone)]
pub struct QueueBroadcaster {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueueBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBroadcaster")
            .field("stats", &self.stats())
            .finish()
    }
}

impl QueueBroadcaster {
    pub fn new(manager: Arc<QueueManager>) -> Self {
        Self {
            inner: Arc::new(Inner {
                manager,
                days: Mutex::new(HashMap::new()),
                next_sink_id: AtomicU64::new(1),
                upstream_opened: AtomicU64::new(0),
                upstream_changes: AtomicU64::new(0),
                messages_pushed: AtomicU64::new(0),
            }),
        }
    }

    /// Register a sink for `date_key`
    ///
    /// The returned subscription already holds the current snapshot. The
    /// first subscriber of a day opens the upstream task, so this must be
    /// called from within a Tokio runtime.
    pub fn subscribe(&self, date_key: &str) -> QueueResult<Subscription> {
        let sink_id = self.inner.next_sink_id.fetch_add(1, Ordering::Relaxed);

        if let Some(receiver) = self.inner.attach(date_key, sink_id) {
            tracing::debug!(date_key, sink_id, "Subscriber joined existing day");
            return Ok(self.subscription(date_key, sink_id, receiver));
        }

        // Subscribe before reading so no commit falls between the two
        let changes = self.inner.manager.subscribe();
        let snapshot = self.inner.manager.snapshot(date_key)?;

        let (receiver, cancel) = {
            let mut days = self.inner.days.lock();
            if let Some(day) = days.get_mut(date_key) {
                // Another subscriber opened the day meanwhile
                let receiver = day.add_sink(sink_id);
                drop(days);
                return Ok(self.subscription(date_key, sink_id, receiver));
            }
            let cancel = CancellationToken::new();
            let mut day = DayChannel {
                sinks: HashMap::new(),
                snapshot,
                cancel: cancel.clone(),
            };
            let receiver = day.add_sink(sink_id);
            days.insert(date_key.to_string(), day);
            (receiver, cancel)
        };

        self.inner.upstream_opened.fetch_add(1, Ordering::Relaxed);
        tracing::info!(date_key, "Opened upstream change feed for day");
        tokio::spawn(run_upstream(
            Arc::downgrade(&self.inner),
            date_key.to_string(),
            changes,
            cancel,
        ));

        Ok(self.subscription(date_key, sink_id, receiver))
    }

    fn subscription(
        &self,
        date_key: &str,
        sink_id: u64,
        receiver: watch::Receiver<QueueSnapshot>,
    ) -> Subscription {
        Subscription {
            date_key: date_key.to_string(),
            sink_id,
            receiver,
            broadcaster: self.clone(),
        }
    }

    /// Remove a sink; the last one out tears the day down
    pub(super) fn release(&self, date_key: &str, sink_id: u64) {
        let mut days = self.inner.days.lock();
        let Some(day) = days.get_mut(date_key) else {
            return;
        };
        day.sinks.remove(&sink_id);
        if day.sinks.is_empty() {
            Inner::teardown(&mut days, date_key);
        }
    }

    pub fn stats(&self) -> BroadcastStats {
        let (active_days, subscribers) = {
            let days = self.inner.days.lock();
            (days.len(), days.values().map(|d| d.sinks.len()).sum())
        };
        BroadcastStats {
            active_days,
            subscribers,
            upstream_opened: self.inner.upstream_opened.load(Ordering::Relaxed),
            upstream_changes: self.inner.upstream_changes.load(Ordering::Relaxed),
            messages_pushed: self.inner.messages_pushed.load(Ordering::Relaxed),
        }
    }
}

impl Inner {
    /// Join an existing day, seeding the sink with the cached snapshot
    fn attach(&self, date_key: &str, sink_id: u64) -> Option<watch::Receiver<QueueSnapshot>> {
        let mut days = self.days.lock();
        days.get_mut(date_key).map(|day| day.add_sink(sink_id))
    }

    /// Rebuild the day's snapshot and push it to every sink
    ///
    /// `cancel` is the calling task's token. Teardown cancels it under the
    /// `days` lock, so a task whose day was reopened finds it cancelled here
    /// and leaves the new day alone.
    fn refresh(&self, date_key: &str, cancel: &CancellationToken) {
        let snapshot = match self.manager.snapshot(date_key) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(date_key, error = %e, "Failed to rebuild queue snapshot");
                return;
            }
        };

        let mut days = self.days.lock();
        if cancel.is_cancelled() {
            tracing::debug!(date_key, "Day torn down during rebuild, dropping snapshot");
            return;
        }
        let Some(day) = days.get_mut(date_key) else {
            return;
        };
        self.upstream_changes.fetch_add(1, Ordering::Relaxed);

        let mut pushed = 0u64;
        day.sinks.retain(|_, sink| {
            // Replaces whatever the client has not read yet
            let delivered = sink.send(snapshot.clone()).is_ok();
            pushed += u64::from(delivered);
            delivered
        });
        day.snapshot = snapshot;
        self.messages_pushed.fetch_add(pushed, Ordering::Relaxed);

        if day.sinks.is_empty() {
            Self::teardown(&mut days, date_key);
        }
    }

    fn teardown(days: &mut HashMap<String, DayChannel>, date_key: &str) {
        if let Some(day) = days.remove(date_key) {
            day.cancel.cancel();
            tracing::info!(date_key, "Last subscriber left, closed upstream change feed");
        }
    }
}

async fn run_upstream(
    inner: Weak<Inner>,
    date_key: String,
    mut changes: broadcast::Receiver<QueueChange>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            result = changes.recv() => {
                let Some(inner) = inner.upgrade() else { break };
                match result {
                    Ok(change) => {
                        if change.affects(&date_key) {
                            inner.refresh(&date_key, &cancel);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(date_key = %date_key, skipped, "Upstream lagged, resyncing snapshot");
                        inner.refresh(&date_key, &cancel);
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!(date_key = %date_key, "Change feed closed");
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!(date_key = %date_key, "Upstream task stopped");
}
