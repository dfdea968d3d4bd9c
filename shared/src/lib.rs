//! Shared types for the café queue
//!
//! Wire and storage types used by the queue server and by any dashboard or
//! customer client talking to it: tickets, the inventory ledger, settings,
//! pricing and the request/response bodies of the HTTP API.

pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use models::{
    CategoryCounts, ItemCategory, Pricing, QueueSnapshot, Settings, Ticket, TicketItem,
    TicketStatus,
};
pub use serde::{Deserialize, Serialize};
