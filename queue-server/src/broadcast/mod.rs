//! 实时队列推送
//!
//! # 架构
//!
//! ```text
//! QueueManager ── broadcast::Sender<QueueChange> ──┐
//!                                                  │  (one receiver per day)
//!                         ┌────────────────────────┴───┐
//!                         │  QueueBroadcaster           │
//!                         │  date_key → DayChannel      │
//!                         │   ├─ upstream task          │
//!                         │   ├─ cached QueueSnapshot   │
//!                         │   └─ sinks (watch senders)  │
//!                         └────────────┬───────────────┘
//!                   ┌──────────────────┼──────────────────┐
//!                   ▼                  ▼                  ▼
//!             Subscription       Subscription       Subscription
//!              (SSE stream)       (SSE stream)       (SSE stream)
//! ```
//!
//! A day's upstream task exists exactly while the day has at least one
//! subscription. Dropping the last [`Subscription`] tears it down.

mod broadcaster;
mod subscription;

pub use broadcaster::{BroadcastStats, QueueBroadcaster};
pub use subscription::Subscription;
