//! QueueManager - transactional queue mutations and change notification
//!
//! Every mutation runs as one redb write transaction:
//!
//! ```text
//! join(req)
//!     ├─ 1. Validate name / items (no transaction yet)
//!     ├─ 2. Service window gate (optional)
//!     ├─ 3. Idempotency fast path (read transaction)
//!     ├─ 4. Begin write transaction
//!     ├─ 5. Idempotency re-check (closes the double-submit race)
//!     ├─ 6. Sequencer → basePosition
//!     ├─ 7. Ledger reserve (clamp / reject)
//!     ├─ 8. Persist ticket, indexes, ledger
//!     ├─ 9. Commit
//!     └─ 10. Broadcast QueueChange
//! ```
//!
//! Reads inside a transaction always happen before the writes they drive.
//! Changes are broadcast only after a successful commit; an error anywhere
//! drops the transaction and nothing is written.

mod error;
pub use error::*;

use super::ledger::{self, JoinStockPolicy};
use super::storage::{QueueStorage, StorageError};
use crate::utils::time;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    CategoryCounts, ItemCategory, MAX_PRICE, Pricing, PricingUpdate, QueueSnapshot, Settings,
    SettingsUpdate, Ticket, TicketItem, TicketStatus,
};
use shared::request::{ItemInput, JoinRequest};
use std::path::Path;
use tokio::sync::broadcast;

/// Change feed capacity; slow consumers resync from a fresh snapshot
const CHANGE_CHANNEL_CAPACITY: usize = 1024;

/// Committed change, as seen by the change feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueChange {
    /// Tickets of one day changed; `ledger` is set when the inventory moved too
    Tickets { date_key: String, ledger: bool },
    /// Settings document replaced (service window, inventory, buffer)
    Settings,
    /// Prices changed; not part of queue snapshots
    Pricing,
}

impl QueueChange {
    /// Whether the snapshot of `date_key` is stale after this change
    pub fn affects(&self, date_key: &str) -> bool {
        match self {
            QueueChange::Tickets {
                date_key: changed,
                ledger,
            } => changed == date_key || *ledger,
            QueueChange::Settings => true,
            QueueChange::Pricing => false,
        }
    }
}

/// Behaviour switches read from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueOptions {
    pub join_policy: JoinStockPolicy,
    /// Refuse joins outside `[serviceStart, serviceEnd)`
    pub enforce_service_window: bool,
}

/// Result of a join
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub ticket: Ticket,
    /// An earlier ticket with the same idempotency key was returned
    pub existing: bool,
}

/// Result of clearing today's waiting tickets
#[derive(Debug, Clone)]
pub struct ClearOutcome {
    pub date_key: String,
    pub removed: usize,
    pub restored: CategoryCounts,
}

/// A ticket and its live rank among waiting tickets
#[derive(Debug, Clone)]
pub struct TicketPosition {
    pub ticket: Ticket,
    /// 1-based; `None` once the ticket is ready
    pub position: Option<u32>,
}

/// QueueManager for queue mutations
pub struct QueueManager {
    storage: QueueStorage,
    change_tx: broadcast::Sender<QueueChange>,
    /// 业务时区
    tz: Tz,
    options: QueueOptions,
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager")
            .field("storage", &"<QueueStorage>")
            .field("change_tx", &"<broadcast::Sender>")
            .field("tz", &self.tz)
            .field("options", &self.options)
            .finish()
    }
}

impl QueueManager {
    /// Create a new QueueManager with the given database path
    pub fn new(db_path: impl AsRef<Path>, tz: Tz, options: QueueOptions) -> QueueResult<Self> {
        let storage = QueueStorage::open(db_path)?;
        tracing::info!(
            tz = %tz,
            join_policy = %options.join_policy,
            enforce_service_window = options.enforce_service_window,
            "QueueManager started"
        );
        Ok(Self::with_storage(storage, tz, options))
    }

    /// Create a QueueManager with existing storage
    pub fn with_storage(storage: QueueStorage, tz: Tz, options: QueueOptions) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            storage,
            change_tx,
            tz,
            options,
        }
    }

    /// Subscribe to committed changes
    pub fn subscribe(&self) -> broadcast::Receiver<QueueChange> {
        self.change_tx.subscribe()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Today's dateKey in the business timezone
    pub fn today(&self) -> String {
        time::today_key(self.tz)
    }

    fn notify(&self, change: QueueChange) {
        if self.change_tx.send(change).is_err() {
            tracing::trace!("No change subscribers");
        }
    }

    // ========== Mutations ==========

    /// Create a ticket for today
    pub fn join(&self, req: JoinRequest) -> QueueResult<JoinOutcome> {
        let date_key = self.today();
        let name = validate_name(&req.name)?;
        let items = resolve_items(&req.items)?;
        let idempotency_key = req
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        if self.options.enforce_service_window {
            let settings = self.storage.get_settings()?;
            let now = time::now_time(self.tz);
            if !time::within_service_window(&settings.service_start, &settings.service_end, now) {
                tracing::info!(%date_key, "Join refused outside service window");
                return Err(QueueError::InvalidState(settings.closed_message));
            }
        }

        // Idempotency fast path: only a still-waiting ticket is echoed
        if let Some(key) = &idempotency_key
            && let Some(existing) = self.storage.find_by_idempotency_key(&date_key, key)?
            && existing.is_waiting()
        {
            tracing::debug!(ticket_id = %existing.id, "Duplicate join, returning existing ticket");
            return Ok(JoinOutcome {
                ticket: existing,
                existing: true,
            });
        }

        let txn = self.storage.begin_write()?;

        if let Some(key) = &idempotency_key
            && let Some(existing) = self.storage.find_by_idempotency_key_txn(&txn, &date_key, key)?
            && existing.is_waiting()
        {
            tracing::debug!(ticket_id = %existing.id, "Duplicate join raced, returning existing ticket");
            return Ok(JoinOutcome {
                ticket: existing,
                existing: true,
            });
        }

        let position = self.storage.next_position(&txn, &date_key)?;
        let mut settings = self.storage.get_settings_txn(&txn)?;
        let demand = CategoryCounts::from_items(&items);
        let before = settings.inventory;
        settings.inventory = ledger::reserve(&before, &demand, self.options.join_policy)?;
        for (category, requested) in demand.iter() {
            if requested > before.get(category) {
                tracing::warn!(
                    %category,
                    available = before.get(category),
                    requested,
                    "Join oversells stock, ledger clamped at zero"
                );
            }
        }

        let now = shared::util::now_millis();
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            date_key: date_key.clone(),
            name,
            items,
            status: TicketStatus::Waiting,
            base_position: position,
            paid: false,
            total: None,
            idempotency_key: idempotency_key.clone(),
            created_at: now,
            updated_at: now,
        };

        self.storage.put_ticket(&txn, &ticket)?;
        if let Some(key) = &idempotency_key {
            self.storage
                .bind_idempotency_key(&txn, &date_key, key, &ticket.id)?;
        }
        self.storage.put_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            ticket_id = %ticket.id,
            %date_key,
            position,
            "Ticket joined"
        );
        self.notify(QueueChange::Tickets {
            date_key,
            ledger: !demand.is_empty(),
        });

        Ok(JoinOutcome {
            ticket,
            existing: false,
        })
    }

    /// Replace the items of a waiting ticket
    pub fn edit(&self, date_key: &str, ticket_id: &str, items: &[ItemInput]) -> QueueResult<Ticket> {
        let items = resolve_items(items)?;

        let txn = self.storage.begin_write()?;
        let mut ticket = self
            .storage
            .get_ticket_txn(&txn, date_key, ticket_id)?
            .ok_or_else(|| QueueError::not_found(date_key, ticket_id))?;
        if !ticket.is_waiting() {
            return Err(QueueError::InvalidState(format!(
                "Ticket {} is {} and can no longer be edited",
                ticket_id, ticket.status
            )));
        }

        let mut settings = self.storage.get_settings_txn(&txn)?;
        let old = ticket.quantities();
        let new = CategoryCounts::from_items(&items);
        settings.inventory = ledger::rebalance(&settings.inventory, &old, &new)?;

        ticket.items = items;
        ticket.updated_at = shared::util::now_millis();
        self.storage.put_ticket(&txn, &ticket)?;
        self.storage.put_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(ticket_id, date_key, "Ticket edited");
        self.notify(QueueChange::Tickets {
            date_key: date_key.to_string(),
            ledger: old != new,
        });
        Ok(ticket)
    }

    /// Delete a ticket and give its stock back
    pub fn delete(&self, date_key: &str, ticket_id: &str) -> QueueResult<Ticket> {
        let txn = self.storage.begin_write()?;
        let ticket = self
            .storage
            .get_ticket_txn(&txn, date_key, ticket_id)?
            .ok_or_else(|| QueueError::not_found(date_key, ticket_id))?;
        let mut settings = self.storage.get_settings_txn(&txn)?;

        self.storage.remove_ticket(&txn, &ticket)?;
        let restores = ticket.status.restores_stock();
        if restores {
            settings.inventory = ledger::restore(&settings.inventory, &ticket.quantities());
            self.storage.put_settings(&txn, &settings)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(ticket_id, date_key, status = %ticket.status, "Ticket deleted");
        self.notify(QueueChange::Tickets {
            date_key: date_key.to_string(),
            ledger: restores,
        });
        Ok(ticket)
    }

    /// Remove every waiting ticket of today and restore their stock
    pub fn clear_today(&self) -> QueueResult<ClearOutcome> {
        let date_key = self.today();
        let nothing = ClearOutcome {
            date_key: date_key.clone(),
            removed: 0,
            restored: CategoryCounts::default(),
        };

        if !self.storage.list_tickets(&date_key)?.iter().any(Ticket::is_waiting) {
            return Ok(nothing);
        }

        let txn = self.storage.begin_write()?;
        let waiting: Vec<Ticket> = self
            .storage
            .list_tickets_txn(&txn, &date_key)?
            .into_iter()
            .filter(Ticket::is_waiting)
            .collect();
        if waiting.is_empty() {
            return Ok(nothing);
        }

        let mut settings = self.storage.get_settings_txn(&txn)?;
        let mut restored = CategoryCounts::default();
        for ticket in &waiting {
            restored.add_all(&ticket.quantities());
            self.storage.remove_ticket(&txn, ticket)?;
        }
        settings.inventory = ledger::restore(&settings.inventory, &restored);
        self.storage.put_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(%date_key, removed = waiting.len(), "Cleared waiting tickets");
        self.notify(QueueChange::Tickets {
            date_key: date_key.clone(),
            ledger: true,
        });
        Ok(ClearOutcome {
            date_key,
            removed: waiting.len(),
            restored,
        })
    }

    /// Mark a ticket ready and freeze its total at current prices
    pub fn mark_ready(&self, date_key: &str, ticket_id: &str, status: &str) -> QueueResult<Ticket> {
        if status.trim().parse::<TicketStatus>() != Ok(TicketStatus::Ready) {
            return Err(QueueError::validation("invalid status"));
        }

        let txn = self.storage.begin_write()?;
        let mut ticket = self
            .storage
            .get_ticket_txn(&txn, date_key, ticket_id)?
            .ok_or_else(|| QueueError::not_found(date_key, ticket_id))?;
        if ticket.status == TicketStatus::Ready {
            // Total stays frozen at the first transition
            return Ok(ticket);
        }

        let pricing = self.storage.get_pricing_txn(&txn)?;
        ticket.status = TicketStatus::Ready;
        let total = pricing.total_for(&ticket.items).ok_or_else(|| {
            QueueError::InvalidState("ticket total is out of range".to_string())
        })?;
        ticket.total = Some(total);
        ticket.updated_at = shared::util::now_millis();
        self.storage.put_ticket(&txn, &ticket)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(ticket_id, date_key, total = ?ticket.total, "Ticket ready");
        self.notify(QueueChange::Tickets {
            date_key: date_key.to_string(),
            ledger: false,
        });
        Ok(ticket)
    }

    /// Set or clear the paid flag
    pub fn set_paid(&self, date_key: &str, ticket_id: &str, paid: bool) -> QueueResult<Ticket> {
        let txn = self.storage.begin_write()?;
        let mut ticket = self
            .storage
            .get_ticket_txn(&txn, date_key, ticket_id)?
            .ok_or_else(|| QueueError::not_found(date_key, ticket_id))?;
        if ticket.paid == paid {
            return Ok(ticket);
        }

        ticket.paid = paid;
        ticket.updated_at = shared::util::now_millis();
        self.storage.put_ticket(&txn, &ticket)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(ticket_id, date_key, paid, "Ticket payment updated");
        self.notify(QueueChange::Tickets {
            date_key: date_key.to_string(),
            ledger: false,
        });
        Ok(ticket)
    }

    /// Merge a partial settings update
    pub fn update_settings(&self, update: SettingsUpdate) -> QueueResult<Settings> {
        for (field, value) in [
            ("serviceStart", &update.service_start),
            ("serviceEnd", &update.service_end),
        ] {
            if let Some(value) = value
                && time::parse_hhmm(value).is_none()
            {
                return Err(QueueError::validation(format!("{field} must be HH:MM")));
            }
        }
        if let Some(message) = &update.closed_message
            && message.chars().count() > MAX_NOTE_LEN
        {
            return Err(QueueError::validation(format!(
                "closedMessage is too long (max {MAX_NOTE_LEN})"
            )));
        }

        let txn = self.storage.begin_write()?;
        let mut settings = self.storage.get_settings_txn(&txn)?;
        update.apply_to(&mut settings);
        settings.updated_at = shared::util::now_millis();
        self.storage.put_settings(&txn, &settings)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(inventory = ?settings.inventory, "Settings updated");
        self.notify(QueueChange::Settings);
        Ok(settings)
    }

    /// Merge a partial pricing update
    pub fn update_pricing(&self, update: PricingUpdate) -> QueueResult<Pricing> {
        for (category, price) in update.entries() {
            if let Some(price) = price
                && price < Decimal::ZERO
            {
                return Err(QueueError::validation(format!(
                    "{} price must not be negative",
                    category
                )));
            }
            if let Some(price) = price
                && price > MAX_PRICE
            {
                return Err(QueueError::validation(format!(
                    "{} price exceeds maximum allowed ({})",
                    category, MAX_PRICE
                )));
            }
        }

        let txn = self.storage.begin_write()?;
        let mut pricing = self.storage.get_pricing_txn(&txn)?;
        update.apply_to(&mut pricing);
        self.storage.put_pricing(&txn, &pricing)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!("Pricing updated");
        self.notify(QueueChange::Pricing);
        Ok(pricing)
    }

    // ========== Queries ==========

    /// Tickets of a day ordered by `basePosition`
    pub fn list(&self, date_key: &str) -> QueueResult<Vec<Ticket>> {
        Ok(self.storage.list_tickets(date_key)?)
    }

    pub fn get_ticket(&self, date_key: &str, ticket_id: &str) -> QueueResult<Ticket> {
        self.storage
            .get_ticket(date_key, ticket_id)?
            .ok_or_else(|| QueueError::not_found(date_key, ticket_id))
    }

    /// Ticket plus its 1-based rank among the day's waiting tickets
    pub fn position(&self, date_key: &str, ticket_id: &str) -> QueueResult<TicketPosition> {
        let tickets = self.storage.list_tickets(date_key)?;
        let mut rank = 0u32;
        for ticket in tickets {
            if ticket.is_waiting() {
                rank += 1;
            }
            if ticket.id == ticket_id {
                let position = ticket.is_waiting().then_some(rank);
                return Ok(TicketPosition { ticket, position });
            }
        }
        Err(QueueError::not_found(date_key, ticket_id))
    }

    pub fn settings(&self) -> QueueResult<Settings> {
        Ok(self.storage.get_settings()?)
    }

    pub fn pricing(&self) -> QueueResult<Pricing> {
        Ok(self.storage.get_pricing()?)
    }

    /// `{dateKey, tickets, settings, lowStock}` from one consistent read
    pub fn snapshot(&self, date_key: &str) -> QueueResult<QueueSnapshot> {
        let (tickets, settings) = self.storage.load_day(date_key)?;
        Ok(QueueSnapshot::new(date_key, tickets, settings))
    }
}

// ========== Input validation ==========

fn validate_name(name: &str) -> QueueResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(QueueError::validation("name required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(QueueError::validation(format!(
            "name is too long (max {MAX_NAME_LEN} chars)"
        )));
    }
    Ok(name.to_string())
}

/// Drop zero-quantity lines and resolve every remaining name to a category
fn resolve_items(inputs: &[ItemInput]) -> QueueResult<Vec<TicketItem>> {
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs.iter().filter(|i| i.qty > 0) {
        let name = input.name.trim();
        let category = ItemCategory::from_item_name(name)
            .ok_or_else(|| QueueError::validation(format!("unknown item: {name}")))?;
        items.push(TicketItem::new(name, input.qty, category));
    }
    if items.is_empty() {
        return Err(QueueError::validation("at least one item required"));
    }
    Ok(items)
}

#[cfg(test)]
mod tests;
