//! Queue snapshots pushed to live clients

use serde::{Deserialize, Serialize};

use super::{ItemCategory, Settings, Ticket};

/// Full state of one day's queue, as sent on every stream message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub date_key: String,
    /// Ordered by `basePosition`
    pub tickets: Vec<Ticket>,
    pub settings: Settings,
    /// Categories at or below their warning buffer
    pub low_stock: Vec<ItemCategory>,
}

impl QueueSnapshot {
    pub fn new(date_key: impl Into<String>, tickets: Vec<Ticket>, settings: Settings) -> Self {
        let low_stock = settings.low_stock();
        Self {
            date_key: date_key.into(),
            tickets,
            settings,
            low_stock,
        }
    }

    pub fn contains(&self, ticket_id: &str) -> bool {
        self.tickets.iter().any(|t| t.id == ticket_id)
    }
}
