//! Data models
//!
//! Shared between queue-server and frontend (via API).
//! All JSON field names are camelCase.

pub mod category;
pub mod settings;
pub mod snapshot;
pub mod ticket;

// Re-exports
pub use category::*;
pub use settings::*;
pub use snapshot::*;
pub use ticket::*;
