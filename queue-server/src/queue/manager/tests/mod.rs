use super::*;
use shared::models::CategoryCountsPatch;

fn create_test_manager() -> QueueManager {
    create_manager_with(QueueOptions::default())
}

fn create_manager_with(options: QueueOptions) -> QueueManager {
    let storage = QueueStorage::open_in_memory().unwrap();
    QueueManager::with_storage(storage, chrono_tz::Asia::Kolkata, options)
}

// ========================================================================
// Helpers
// ========================================================================

/// Set the inventory ledger for the given categories
fn stock(manager: &QueueManager, levels: &[(ItemCategory, u32)]) {
    let mut patch = CategoryCountsPatch::default();
    for (category, value) in levels {
        match category {
            ItemCategory::Chai => patch.chai = Some(*value),
            ItemCategory::Bun => patch.bun = Some(*value),
            ItemCategory::Tiramisu => patch.tiramisu = Some(*value),
            ItemCategory::MilkBun => patch.milk_bun = Some(*value),
            ItemCategory::HotChocolate => patch.hot_chocolate = Some(*value),
        }
    }
    manager
        .update_settings(SettingsUpdate {
            inventory: Some(patch),
            ..Default::default()
        })
        .unwrap();
}

fn inventory(manager: &QueueManager) -> CategoryCounts {
    manager.settings().unwrap().inventory
}

fn items(lines: &[(&str, u32)]) -> Vec<ItemInput> {
    lines
        .iter()
        .map(|(name, qty)| ItemInput::new(*name, *qty))
        .collect()
}

fn join_request(name: &str, lines: &[(&str, u32)]) -> JoinRequest {
    JoinRequest {
        name: name.to_string(),
        items: items(lines),
        idempotency_key: None,
    }
}

/// Join and return the created ticket
fn join(manager: &QueueManager, name: &str, lines: &[(&str, u32)]) -> Ticket {
    let outcome = manager.join(join_request(name, lines)).unwrap();
    assert!(!outcome.existing);
    outcome.ticket
}

fn set_chai_price(manager: &QueueManager, price: i64) {
    manager
        .update_pricing(PricingUpdate {
            chai_price: Some(Decimal::from(price)),
            ..Default::default()
        })
        .unwrap();
}

mod test_concurrency;
