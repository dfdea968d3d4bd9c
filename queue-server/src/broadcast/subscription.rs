use shared::models::QueueSnapshot;
use tokio::sync::watch;

use super::QueueBroadcaster;

/// One client's registration with a day's broadcaster
///
/// Yields the current snapshot first, then the latest snapshot after each
/// relevant change. Snapshots superseded before being read are skipped.
/// Dropping it deregisters the sink.
pub struct Subscription {
    pub(super) date_key: String,
    pub(super) sink_id: u64,
    pub(super) receiver: watch::Receiver<QueueSnapshot>,
    pub(super) broadcaster: QueueBroadcaster,
}

impl Subscription {
    /// Next snapshot; `None` once the day was torn down underneath us
    pub async fn recv(&mut self) -> Option<QueueSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("date_key", &self.date_key)
            .field("sink_id", &self.sink_id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.release(&self.date_key, self.sink_id);
    }
}
