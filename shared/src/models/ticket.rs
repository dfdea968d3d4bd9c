//! Ticket Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{CategoryCounts, ItemCategory};

/// Ticket lifecycle status
///
/// Only `Waiting → Ready` is allowed; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Waiting,
    Ready,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Ready => "ready",
        }
    }

    /// Whether deleting a ticket in this status gives its stock back.
    ///
    /// Both statuses hold stock reserved at join time.
    pub fn restores_stock(self) -> bool {
        match self {
            TicketStatus::Waiting | TicketStatus::Ready => true,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(TicketStatus::Waiting),
            "ready" => Ok(TicketStatus::Ready),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// One order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketItem {
    /// Display name as submitted
    pub name: String,
    pub qty: u32,
    /// Category resolved when the line entered the system
    pub category: ItemCategory,
}

impl TicketItem {
    pub fn new(name: impl Into<String>, qty: u32, category: ItemCategory) -> Self {
        Self {
            name: name.into(),
            qty,
            category,
        }
    }
}

/// One customer's order plus its queue metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    /// Day partition (YYYY-MM-DD, business timezone)
    pub date_key: String,
    pub name: String,
    pub items: Vec<TicketItem>,
    pub status: TicketStatus,
    /// Token number, assigned once at creation
    pub base_position: u64,
    #[serde(default)]
    pub paid: bool,
    /// Frozen when the ticket becomes ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Ticket {
    /// Per-category quantities held by this ticket
    pub fn quantities(&self) -> CategoryCounts {
        CategoryCounts::from_items(&self.items)
    }

    pub fn is_waiting(&self) -> bool {
        self.status == TicketStatus::Waiting
    }
}
