//! redb-based storage layer for the daily queue
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `tickets` | `(date_key, base_position)` | `Ticket` | Ticket store, scan order = queue order |
//! | `ticket_ids` | `(date_key, ticket_id)` | `u64` | id → base_position index |
//! | `idempotency_keys` | `(date_key, key)` | `ticket_id` | Join dedup index |
//! | `day_state` | `date_key` | `u64` | Sequencer (`nextPosition`) |
//! | `config` | `"settings"` / `"pricing"` | JSON | Process-wide documents |
//!
//! # Transactions
//!
//! redb allows a single write transaction at a time. Every mutation of the
//! queue runs inside one [`WriteTransaction`], so reads performed inside it
//! see a stable view and the commit is all-or-nothing. Methods taking a
//! `txn` never commit; the caller decides.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Pricing, Settings, Ticket};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Tickets: key = (date_key, base_position), value = JSON-serialized Ticket
const TICKETS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("tickets");

/// Ticket id index: key = (date_key, ticket_id), value = base_position
const TICKET_IDS_TABLE: TableDefinition<(&str, &str), u64> = TableDefinition::new("ticket_ids");

/// Idempotency index: key = (date_key, idempotency_key), value = ticket_id
const IDEMPOTENCY_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("idempotency_keys");

/// Day partition state: key = date_key, value = last assigned position
const DAY_STATE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("day_state");

/// Config documents: key = document name, value = JSON
const CONFIG_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("config");

const SETTINGS_KEY: &str = "settings";
const PRICING_KEY: &str = "pricing";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Queue storage backed by redb
#[derive(Clone)]
pub struct QueueStorage {
    db: Arc<Database>,
}

impl QueueStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the write is on disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables so read transactions never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TICKETS_TABLE)?;
            let _ = write_txn.open_table(TICKET_IDS_TABLE)?;
            let _ = write_txn.open_table(IDEMPOTENCY_TABLE)?;
            let _ = write_txn.open_table(DAY_STATE_TABLE)?;
            let _ = write_txn.open_table(CONFIG_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequencer ==========

    /// Assign the next `basePosition` for a day (within transaction)
    ///
    /// Positions start at 1 and are never handed out twice, even after the
    /// ticket holding one is deleted.
    pub fn next_position(&self, txn: &WriteTransaction, date_key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(DAY_STATE_TABLE)?;
        let current = table.get(date_key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(date_key, next)?;
        Ok(next)
    }

    /// Last position handed out for a day (0 if none)
    pub fn last_position(&self, date_key: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DAY_STATE_TABLE)?;
        Ok(table.get(date_key)?.map(|g| g.value()).unwrap_or(0))
    }

    // ========== Tickets ==========

    /// Get a ticket by id
    pub fn get_ticket(&self, date_key: &str, ticket_id: &str) -> StorageResult<Option<Ticket>> {
        let read_txn = self.db.begin_read()?;
        let ids = read_txn.open_table(TICKET_IDS_TABLE)?;
        let tickets = read_txn.open_table(TICKETS_TABLE)?;
        lookup_ticket(&ids, &tickets, date_key, ticket_id)
    }

    /// Get a ticket by id (within transaction)
    pub fn get_ticket_txn(
        &self,
        txn: &WriteTransaction,
        date_key: &str,
        ticket_id: &str,
    ) -> StorageResult<Option<Ticket>> {
        let ids = txn.open_table(TICKET_IDS_TABLE)?;
        let tickets = txn.open_table(TICKETS_TABLE)?;
        lookup_ticket(&ids, &tickets, date_key, ticket_id)
    }

    /// Insert or overwrite a ticket and its id index entry
    pub fn put_ticket(&self, txn: &WriteTransaction, ticket: &Ticket) -> StorageResult<()> {
        let value = serde_json::to_vec(ticket)?;
        let date_key = ticket.date_key.as_str();
        {
            let mut tickets = txn.open_table(TICKETS_TABLE)?;
            tickets.insert((date_key, ticket.base_position), value.as_slice())?;
        }
        let mut ids = txn.open_table(TICKET_IDS_TABLE)?;
        ids.insert((date_key, ticket.id.as_str()), ticket.base_position)?;
        Ok(())
    }

    /// Remove a ticket together with its id and idempotency index entries
    pub fn remove_ticket(&self, txn: &WriteTransaction, ticket: &Ticket) -> StorageResult<()> {
        let date_key = ticket.date_key.as_str();
        {
            let mut tickets = txn.open_table(TICKETS_TABLE)?;
            tickets.remove((date_key, ticket.base_position))?;
        }
        {
            let mut ids = txn.open_table(TICKET_IDS_TABLE)?;
            ids.remove((date_key, ticket.id.as_str()))?;
        }
        if let Some(key) = &ticket.idempotency_key {
            let mut keys = txn.open_table(IDEMPOTENCY_TABLE)?;
            // The key may since have been rebound to a newer ticket
            let bound_here = keys
                .get((date_key, key.as_str()))?
                .is_some_and(|g| g.value() == ticket.id.as_str());
            if bound_here {
                keys.remove((date_key, key.as_str()))?;
            }
        }
        Ok(())
    }

    /// All tickets of a day, ordered by `basePosition`
    pub fn list_tickets(&self, date_key: &str) -> StorageResult<Vec<Ticket>> {
        let read_txn = self.db.begin_read()?;
        let tickets = read_txn.open_table(TICKETS_TABLE)?;
        scan_day(&tickets, date_key)
    }

    /// All tickets of a day, ordered by `basePosition` (within transaction)
    pub fn list_tickets_txn(
        &self,
        txn: &WriteTransaction,
        date_key: &str,
    ) -> StorageResult<Vec<Ticket>> {
        let tickets = txn.open_table(TICKETS_TABLE)?;
        scan_day(&tickets, date_key)
    }

    /// Tickets and settings read from one consistent view
    pub fn load_day(&self, date_key: &str) -> StorageResult<(Vec<Ticket>, Settings)> {
        let read_txn = self.db.begin_read()?;
        let tickets = read_txn.open_table(TICKETS_TABLE)?;
        let config = read_txn.open_table(CONFIG_TABLE)?;
        Ok((scan_day(&tickets, date_key)?, read_doc(&config, SETTINGS_KEY)?))
    }

    // ========== Idempotency ==========

    /// Ticket previously created with this idempotency key, if still present
    pub fn find_by_idempotency_key(
        &self,
        date_key: &str,
        key: &str,
    ) -> StorageResult<Option<Ticket>> {
        let read_txn = self.db.begin_read()?;
        let keys = read_txn.open_table(IDEMPOTENCY_TABLE)?;
        let Some(ticket_id) = keys.get((date_key, key))?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let ids = read_txn.open_table(TICKET_IDS_TABLE)?;
        let tickets = read_txn.open_table(TICKETS_TABLE)?;
        lookup_ticket(&ids, &tickets, date_key, &ticket_id)
    }

    /// Same as [`Self::find_by_idempotency_key`] (within transaction)
    pub fn find_by_idempotency_key_txn(
        &self,
        txn: &WriteTransaction,
        date_key: &str,
        key: &str,
    ) -> StorageResult<Option<Ticket>> {
        let ticket_id = {
            let keys = txn.open_table(IDEMPOTENCY_TABLE)?;
            keys.get((date_key, key))?.map(|g| g.value().to_string())
        };
        match ticket_id {
            Some(ticket_id) => self.get_ticket_txn(txn, date_key, &ticket_id),
            None => Ok(None),
        }
    }

    /// Point an idempotency key at a ticket
    pub fn bind_idempotency_key(
        &self,
        txn: &WriteTransaction,
        date_key: &str,
        key: &str,
        ticket_id: &str,
    ) -> StorageResult<()> {
        let mut keys = txn.open_table(IDEMPOTENCY_TABLE)?;
        keys.insert((date_key, key), ticket_id)?;
        Ok(())
    }

    // ========== Settings / Pricing ==========

    /// Stored settings merged over defaults
    pub fn get_settings(&self) -> StorageResult<Settings> {
        let read_txn = self.db.begin_read()?;
        let config = read_txn.open_table(CONFIG_TABLE)?;
        read_doc(&config, SETTINGS_KEY)
    }

    pub fn get_settings_txn(&self, txn: &WriteTransaction) -> StorageResult<Settings> {
        let config = txn.open_table(CONFIG_TABLE)?;
        read_doc(&config, SETTINGS_KEY)
    }

    pub fn put_settings(&self, txn: &WriteTransaction, settings: &Settings) -> StorageResult<()> {
        write_doc(txn, SETTINGS_KEY, settings)
    }

    /// Stored pricing merged over defaults
    pub fn get_pricing(&self) -> StorageResult<Pricing> {
        let read_txn = self.db.begin_read()?;
        let config = read_txn.open_table(CONFIG_TABLE)?;
        read_doc(&config, PRICING_KEY)
    }

    pub fn get_pricing_txn(&self, txn: &WriteTransaction) -> StorageResult<Pricing> {
        let config = txn.open_table(CONFIG_TABLE)?;
        read_doc(&config, PRICING_KEY)
    }

    pub fn put_pricing(&self, txn: &WriteTransaction, pricing: &Pricing) -> StorageResult<()> {
        write_doc(txn, PRICING_KEY, pricing)
    }
}

// ========== Table helpers (shared by read and write transactions) ==========

fn lookup_ticket(
    ids: &impl ReadableTable<(&'static str, &'static str), u64>,
    tickets: &impl ReadableTable<(&'static str, u64), &'static [u8]>,
    date_key: &str,
    ticket_id: &str,
) -> StorageResult<Option<Ticket>> {
    let Some(position) = ids.get((date_key, ticket_id))?.map(|g| g.value()) else {
        return Ok(None);
    };
    match tickets.get((date_key, position))? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

fn scan_day(
    tickets: &impl ReadableTable<(&'static str, u64), &'static [u8]>,
    date_key: &str,
) -> StorageResult<Vec<Ticket>> {
    let mut result = Vec::new();
    for entry in tickets.range((date_key, 0u64)..=(date_key, u64::MAX))? {
        let (_key, value) = entry?;
        let ticket: Ticket = serde_json::from_slice(value.value())?;
        result.push(ticket);
    }
    Ok(result)
}

fn read_doc<T: DeserializeOwned + Default>(
    config: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> StorageResult<T> {
    match config.get(key)? {
        Some(guard) => Ok(serde_json::from_slice(guard.value())?),
        None => Ok(T::default()),
    }
}

fn write_doc<T: Serialize>(txn: &WriteTransaction, key: &str, doc: &T) -> StorageResult<()> {
    let value = serde_json::to_vec(doc)?;
    let mut config = txn.open_table(CONFIG_TABLE)?;
    config.insert(key, value.as_slice())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ItemCategory, TicketItem, TicketStatus};

    fn create_test_ticket(date_key: &str, id: &str, position: u64) -> Ticket {
        Ticket {
            id: id.to_string(),
            date_key: date_key.to_string(),
            name: format!("Guest {position}"),
            items: vec![TicketItem::new("Special Chai", 1, ItemCategory::Chai)],
            status: TicketStatus::Waiting,
            base_position: position,
            paid: false,
            total: None,
            idempotency_key: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_positions_are_per_day_and_monotonic() {
        let storage = QueueStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_position(&txn, "2026-10-17").unwrap(), 1);
        assert_eq!(storage.next_position(&txn, "2026-10-17").unwrap(), 2);
        assert_eq!(storage.next_position(&txn, "2026-10-18").unwrap(), 1);
        txn.commit().unwrap();

        assert_eq!(storage.last_position("2026-10-17").unwrap(), 2);
        assert_eq!(storage.last_position("2026-10-19").unwrap(), 0);
    }

    #[test]
    fn test_aborted_transaction_leaves_no_trace() {
        let storage = QueueStorage::open_in_memory().unwrap();

        {
            let txn = storage.begin_write().unwrap();
            storage.next_position(&txn, "2026-10-17").unwrap();
            storage
                .put_ticket(&txn, &create_test_ticket("2026-10-17", "a", 1))
                .unwrap();
            // dropped without commit
        }

        assert_eq!(storage.last_position("2026-10-17").unwrap(), 0);
        assert!(storage.list_tickets("2026-10-17").unwrap().is_empty());
    }

    #[test]
    fn test_list_is_ordered_by_position_and_scoped_to_day() {
        let storage = QueueStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.put_ticket(&txn, &create_test_ticket("2026-10-17", "c", 12)).unwrap();
        storage.put_ticket(&txn, &create_test_ticket("2026-10-17", "a", 2)).unwrap();
        storage.put_ticket(&txn, &create_test_ticket("2026-10-18", "x", 1)).unwrap();
        storage.put_ticket(&txn, &create_test_ticket("2026-10-17", "b", 3)).unwrap();
        txn.commit().unwrap();

        let ids: Vec<String> = storage
            .list_tickets("2026-10-17")
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(storage.list_tickets("2026-10-18").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_ticket_clears_indexes() {
        let storage = QueueStorage::open_in_memory().unwrap();
        let mut ticket = create_test_ticket("2026-10-17", "a", 1);
        ticket.idempotency_key = Some("k1".to_string());

        let txn = storage.begin_write().unwrap();
        storage.put_ticket(&txn, &ticket).unwrap();
        storage.bind_idempotency_key(&txn, "2026-10-17", "k1", "a").unwrap();
        txn.commit().unwrap();

        assert_eq!(
            storage.find_by_idempotency_key("2026-10-17", "k1").unwrap(),
            Some(ticket.clone())
        );
        assert!(storage.get_ticket("2026-10-17", "a").unwrap().is_some());

        let txn = storage.begin_write().unwrap();
        storage.remove_ticket(&txn, &ticket).unwrap();
        txn.commit().unwrap();

        assert!(storage.get_ticket("2026-10-17", "a").unwrap().is_none());
        assert!(storage.find_by_idempotency_key("2026-10-17", "k1").unwrap().is_none());
    }

    #[test]
    fn test_idempotency_keys_are_scoped_to_day() {
        let storage = QueueStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.put_ticket(&txn, &create_test_ticket("2026-10-17", "a", 1)).unwrap();
        storage.bind_idempotency_key(&txn, "2026-10-17", "k1", "a").unwrap();
        assert!(
            storage
                .find_by_idempotency_key_txn(&txn, "2026-10-17", "k1")
                .unwrap()
                .is_some()
        );
        txn.commit().unwrap();

        assert!(storage.find_by_idempotency_key("2026-10-18", "k1").unwrap().is_none());
    }

    #[test]
    fn test_config_documents_default_when_missing() {
        let storage = QueueStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_settings().unwrap(), Settings::default());
        assert_eq!(storage.get_pricing().unwrap(), Pricing::default());

        let mut settings = Settings::default();
        settings.inventory.chai = 40;
        let txn = storage.begin_write().unwrap();
        storage.put_settings(&txn, &settings).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_settings().unwrap().inventory.chai, 40);
        let (tickets, loaded) = storage.load_day("2026-10-17").unwrap();
        assert!(tickets.is_empty());
        assert_eq!(loaded.inventory.chai, 40);
    }
}
