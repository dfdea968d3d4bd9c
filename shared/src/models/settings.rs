//! Settings and Pricing Models
//!
//! Both are process-wide documents (not per day). The live inventory ledger
//! lives inside [`Settings`] so every pushed queue snapshot carries it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryCounts, CategoryCountsPatch, ItemCategory, TicketItem};

pub const DEFAULT_SERVICE_START: &str = "06:00";
pub const DEFAULT_SERVICE_END: &str = "23:00";
pub const DEFAULT_CLOSED_MESSAGE: &str =
    "Queue is currently closed. Please check back during service hours.";
/// Low-stock warning threshold per category
pub const DEFAULT_BUFFER: u32 = 10;
/// Upper bound for a single unit price
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// 营业设置 (服务时段 + 库存台账 + 预警阈值)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 开始服务时间 (HH:MM)
    pub service_start: String,
    /// 结束服务时间 (HH:MM)
    pub service_end: String,
    /// 非服务时段提示
    pub closed_message: String,
    /// 剩余库存
    pub inventory: CategoryCounts,
    /// 低库存预警阈值 (仅用于界面提示)
    pub buffer: CategoryCounts,
    pub updated_at: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_start: DEFAULT_SERVICE_START.to_string(),
            service_end: DEFAULT_SERVICE_END.to_string(),
            closed_message: DEFAULT_CLOSED_MESSAGE.to_string(),
            inventory: CategoryCounts::default(),
            buffer: CategoryCounts::uniform(DEFAULT_BUFFER),
            updated_at: 0,
        }
    }
}

impl Settings {
    /// Categories whose remaining stock is at or below the buffer
    pub fn low_stock(&self) -> Vec<ItemCategory> {
        ItemCategory::ALL
            .into_iter()
            .filter(|c| self.inventory.get(*c) <= self.buffer.get(*c))
            .collect()
    }
}

/// Partial settings update (POST /api/settings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub service_start: Option<String>,
    pub service_end: Option<String>,
    pub closed_message: Option<String>,
    pub inventory: Option<CategoryCountsPatch>,
    pub buffer: Option<CategoryCountsPatch>,
}

impl SettingsUpdate {
    /// Merge over `settings`; absent fields keep their stored value
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(start) = &self.service_start {
            settings.service_start = start.trim().to_string();
        }
        if let Some(end) = &self.service_end {
            settings.service_end = end.trim().to_string();
        }
        if let Some(message) = &self.closed_message {
            settings.closed_message = message.clone();
        }
        if let Some(inventory) = &self.inventory {
            inventory.apply_to(&mut settings.inventory);
        }
        if let Some(buffer) = &self.buffer {
            buffer.apply_to(&mut settings.buffer);
        }
    }
}

/// 各品类单价
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pricing {
    pub chai_price: Decimal,
    pub bun_price: Decimal,
    pub tiramisu_price: Decimal,
    pub milk_bun_price: Decimal,
    pub hot_chocolate_price: Decimal,
}

impl Pricing {
    pub fn price_of(&self, category: ItemCategory) -> Decimal {
        match category {
            ItemCategory::Chai => self.chai_price,
            ItemCategory::Bun => self.bun_price,
            ItemCategory::Tiramisu => self.tiramisu_price,
            ItemCategory::MilkBun => self.milk_bun_price,
            ItemCategory::HotChocolate => self.hot_chocolate_price,
        }
    }

    /// Sum of price × qty over the lines; `None` on overflow
    pub fn total_for(&self, items: &[TicketItem]) -> Option<Decimal> {
        items.iter().try_fold(Decimal::ZERO, |total, item| {
            self.price_of(item.category)
                .checked_mul(Decimal::from(item.qty))
                .and_then(|line| total.checked_add(line))
        })
    }
}

/// Partial pricing update (POST /api/pricing)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingUpdate {
    pub chai_price: Option<Decimal>,
    pub bun_price: Option<Decimal>,
    pub tiramisu_price: Option<Decimal>,
    pub milk_bun_price: Option<Decimal>,
    pub hot_chocolate_price: Option<Decimal>,
}

impl PricingUpdate {
    /// Prices present in the update
    pub fn entries(&self) -> [(ItemCategory, Option<Decimal>); 5] {
        [
            (ItemCategory::Chai, self.chai_price),
            (ItemCategory::Bun, self.bun_price),
            (ItemCategory::Tiramisu, self.tiramisu_price),
            (ItemCategory::MilkBun, self.milk_bun_price),
            (ItemCategory::HotChocolate, self.hot_chocolate_price),
        ]
    }

    pub fn apply_to(&self, pricing: &mut Pricing) {
        for (category, price) in self.entries() {
            let Some(price) = price else { continue };
            match category {
                ItemCategory::Chai => pricing.chai_price = price,
                ItemCategory::Bun => pricing.bun_price = price,
                ItemCategory::Tiramisu => pricing.tiramisu_price = price,
                ItemCategory::MilkBun => pricing.milk_bun_price = price,
                ItemCategory::HotChocolate => pricing.hot_chocolate_price = price,
            }
        }
    }
}
