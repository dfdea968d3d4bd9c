use super::super::ledger::StockShortfall;
use super::super::storage::StorageError;
use crate::utils::AppError;
use shared::models::ItemCategory;
use thiserror::Error;

/// Queue manager errors
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Validation(String),

    #[error("Ticket {id} not found for {date_key}")]
    TicketNotFound { date_key: String, id: String },

    #[error("{0}")]
    InvalidState(String),

    #[error(
        "Not enough {} in stock ({available} available, {requested} requested)",
        .category.display_name()
    )]
    StockExceeded {
        category: ItemCategory,
        available: u32,
        requested: u32,
    },
}

impl QueueError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(date_key: &str, id: &str) -> Self {
        Self::TicketNotFound {
            date_key: date_key.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<StockShortfall> for QueueError {
    fn from(shortfall: StockShortfall) -> Self {
        Self::StockExceeded {
            category: shortfall.category,
            available: shortfall.available,
            requested: shortfall.requested,
        }
    }
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                AppError::database(e.to_string())
            }
            QueueError::Validation(msg) => AppError::Validation(msg),
            e @ QueueError::TicketNotFound { .. } => AppError::NotFound(e.to_string()),
            QueueError::InvalidState(msg) => AppError::InvalidState(msg),
            e @ QueueError::StockExceeded { .. } => AppError::StockExceeded(e.to_string()),
        }
    }
}

pub type QueueResult<T> = Result<T, QueueError>;
