//! API Request types

use serde::{Deserialize, Serialize};

/// One submitted order line, before category resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub name: String,
    /// Missing quantity counts as zero
    #[serde(default)]
    pub qty: u32,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
        }
    }
}

/// POST /api/join
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub name: String,
    pub items: Vec<ItemInput>,
    /// Client dedup token; may also arrive as the `X-Idempotency-Key` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// PATCH /api/ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTicketRequest {
    pub id: String,
    pub date_key: String,
    pub items: Vec<ItemInput>,
}

/// PATCH /api/ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyRequest {
    pub id: String,
    pub date_key: String,
    pub status: String,
}

/// PATCH /api/payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: String,
    pub date_key: String,
    pub paid: bool,
}

/// `?id=&date=` (DELETE /api/ticket, GET /api/position)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQuery {
    pub id: String,
    pub date: String,
}

/// `?date=` (GET /api/queue, GET /api/queue/stream)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
