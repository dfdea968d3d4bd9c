//! API Response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CategoryCounts, Ticket, TicketItem, TicketStatus};

/// Error body returned by every failing endpoint
///
/// ```json
/// { "code": "E0002", "message": "name required" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// POST /api/join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub id: String,
    /// Token number (`basePosition`)
    pub position: u64,
    pub date_key: String,
    pub items: Vec<TicketItem>,
    /// Set when an earlier ticket with the same idempotency key was echoed back
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub existing: bool,
}

impl JoinResponse {
    pub fn from_ticket(ticket: Ticket, existing: bool) -> Self {
        Self {
            id: ticket.id,
            position: ticket.base_position,
            date_key: ticket.date_key,
            items: ticket.items,
            existing,
        }
    }
}

/// PATCH /api/ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTicketResponse {
    pub id: String,
    pub date_key: String,
    pub items: Vec<TicketItem>,
}

/// DELETE /api/ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTicketResponse {
    pub id: String,
    pub date_key: String,
    pub deleted: bool,
}

/// PATCH /api/ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub id: String,
    pub date_key: String,
    pub status: TicketStatus,
    pub total: Option<Decimal>,
}

/// PATCH /api/payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub date_key: String,
    pub paid: bool,
}

/// GET /api/queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub date_key: String,
    pub tickets: Vec<Ticket>,
}

/// DELETE /api/queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQueueResponse {
    pub date_key: String,
    /// Number of waiting tickets removed
    pub removed: usize,
    /// Stock given back to the ledger
    pub restored: CategoryCounts,
}

/// GET /api/position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    pub id: String,
    pub status: TicketStatus,
    /// 1-based rank among waiting tickets; `None` once ready
    pub position: Option<u32>,
    pub base_position: u64,
    pub name: String,
    pub items: Vec<TicketItem>,
    pub paid: bool,
    pub total: Option<Decimal>,
}
