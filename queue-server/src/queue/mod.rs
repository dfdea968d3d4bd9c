//! Queue core: ticket storage, sequencer, inventory ledger and the
//! transactional mutation engine.

pub mod ledger;
pub mod manager;
pub mod storage;

pub use ledger::JoinStockPolicy;
pub use manager::{
    ClearOutcome, JoinOutcome, QueueChange, QueueError, QueueManager, QueueOptions, QueueResult,
    TicketPosition,
};
pub use storage::{QueueStorage, StorageError};
