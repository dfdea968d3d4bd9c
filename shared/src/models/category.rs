//! Menu categories and per-category counters
//!
//! The menu is a closed set. Display names seen on tickets (including names
//! used by older menu revisions) are mapped to a category once, when an item
//! enters the system, via [`ITEM_ALIASES`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TicketItem;

/// Menu category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemCategory {
    Chai,
    Bun,
    Tiramisu,
    MilkBun,
    HotChocolate,
}

/// Display name → category table.
///
/// Append only: legacy names stay so historical tickets keep resolving.
///
/// | Revision | Names |
/// |----------|-------|
/// | v1 | Irani Chai, Bun, Milk Bun |
/// | v2 | Special Chai, Bun Maska, Tiramisu, Premium Milk Bun |
/// | v3 | Hot Chocolate |
pub const ITEM_ALIASES: &[(&str, ItemCategory)] = &[
    ("Special Chai", ItemCategory::Chai),
    ("Irani Chai", ItemCategory::Chai),
    ("Bun Maska", ItemCategory::Bun),
    ("Bun", ItemCategory::Bun),
    ("Tiramisu", ItemCategory::Tiramisu),
    ("Premium Milk Bun", ItemCategory::MilkBun),
    ("Milk Bun", ItemCategory::MilkBun),
    ("Hot Chocolate", ItemCategory::HotChocolate),
];

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        ItemCategory::Chai,
        ItemCategory::Bun,
        ItemCategory::Tiramisu,
        ItemCategory::MilkBun,
        ItemCategory::HotChocolate,
    ];

    /// Stable id, identical to the serialized form
    pub fn id(self) -> &'static str {
        match self {
            ItemCategory::Chai => "chai",
            ItemCategory::Bun => "bun",
            ItemCategory::Tiramisu => "tiramisu",
            ItemCategory::MilkBun => "milkBun",
            ItemCategory::HotChocolate => "hotChocolate",
        }
    }

    /// Current menu name
    pub fn display_name(self) -> &'static str {
        match self {
            ItemCategory::Chai => "Special Chai",
            ItemCategory::Bun => "Bun Maska",
            ItemCategory::Tiramisu => "Tiramisu",
            ItemCategory::MilkBun => "Premium Milk Bun",
            ItemCategory::HotChocolate => "Hot Chocolate",
        }
    }

    /// Resolve an item name (current, legacy, or category id) to a category.
    ///
    /// Matching is exact after trimming surrounding whitespace.
    pub fn from_item_name(name: &str) -> Option<Self> {
        let name = name.trim();
        ITEM_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, category)| *category)
            .or_else(|| Self::ALL.into_iter().find(|c| c.id() == name))
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One counter per category.
///
/// Used for the inventory ledger, buffer thresholds, and per-ticket
/// quantity breakdowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryCounts {
    pub chai: u32,
    pub bun: u32,
    pub tiramisu: u32,
    pub milk_bun: u32,
    pub hot_chocolate: u32,
}

impl CategoryCounts {
    /// Same value for every category
    pub fn uniform(value: u32) -> Self {
        Self {
            chai: value,
            bun: value,
            tiramisu: value,
            milk_bun: value,
            hot_chocolate: value,
        }
    }

    pub fn get(&self, category: ItemCategory) -> u32 {
        match category {
            ItemCategory::Chai => self.chai,
            ItemCategory::Bun => self.bun,
            ItemCategory::Tiramisu => self.tiramisu,
            ItemCategory::MilkBun => self.milk_bun,
            ItemCategory::HotChocolate => self.hot_chocolate,
        }
    }

    pub fn set(&mut self, category: ItemCategory, value: u32) {
        match category {
            ItemCategory::Chai => self.chai = value,
            ItemCategory::Bun => self.bun = value,
            ItemCategory::Tiramisu => self.tiramisu = value,
            ItemCategory::MilkBun => self.milk_bun = value,
            ItemCategory::HotChocolate => self.hot_chocolate = value,
        }
    }

    /// Saturating add for one category
    pub fn add(&mut self, category: ItemCategory, value: u32) {
        let current = self.get(category);
        self.set(category, current.saturating_add(value));
    }

    /// Saturating add of every category of `other`
    pub fn add_all(&mut self, other: &CategoryCounts) {
        for (category, value) in other.iter() {
            self.add(category, value);
        }
    }

    /// Per-category quantity totals of a list of ticket lines
    pub fn from_items(items: &[TicketItem]) -> Self {
        let mut counts = Self::default();
        for item in items {
            counts.add(item.category, item.qty);
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemCategory, u32)> + '_ {
        ItemCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, v)| v == 0)
    }
}

/// Partial update of a [`CategoryCounts`]; absent categories keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryCountsPatch {
    pub chai: Option<u32>,
    pub bun: Option<u32>,
    pub tiramisu: Option<u32>,
    pub milk_bun: Option<u32>,
    pub hot_chocolate: Option<u32>,
}

impl CategoryCountsPatch {
    pub fn apply_to(&self, target: &mut CategoryCounts) {
        let fields = [
            (ItemCategory::Chai, self.chai),
            (ItemCategory::Bun, self.bun),
            (ItemCategory::Tiramisu, self.tiramisu),
            (ItemCategory::MilkBun, self.milk_bun),
            (ItemCategory::HotChocolate, self.hot_chocolate),
        ];
        for (category, value) in fields {
            if let Some(value) = value {
                target.set(category, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_and_legacy_names_resolve() {
        assert_eq!(ItemCategory::from_item_name("Special Chai"), Some(ItemCategory::Chai));
        assert_eq!(ItemCategory::from_item_name("Irani Chai"), Some(ItemCategory::Chai));
        assert_eq!(ItemCategory::from_item_name("Bun"), Some(ItemCategory::Bun));
        assert_eq!(ItemCategory::from_item_name(" Milk Bun "), Some(ItemCategory::MilkBun));
        assert_eq!(ItemCategory::from_item_name("milkBun"), Some(ItemCategory::MilkBun));
        assert_eq!(
            ItemCategory::from_item_name("Hot Chocolate"),
            Some(ItemCategory::HotChocolate)
        );
        assert_eq!(ItemCategory::from_item_name("Espresso"), None);
        assert_eq!(ItemCategory::from_item_name("special chai"), None);
    }

    #[test]
    fn test_every_category_display_name_is_an_alias() {
        for category in ItemCategory::ALL {
            assert_eq!(ItemCategory::from_item_name(category.display_name()), Some(category));
        }
    }

    #[test]
    fn test_counts_from_items_groups_by_category() {
        let items = vec![
            TicketItem::new("Special Chai", 2, ItemCategory::Chai),
            TicketItem::new("Irani Chai", 1, ItemCategory::Chai),
            TicketItem::new("Bun Maska", 1, ItemCategory::Bun),
        ];
        let counts = CategoryCounts::from_items(&items);
        assert_eq!(counts.chai, 3);
        assert_eq!(counts.bun, 1);
        assert_eq!(counts.tiramisu, 0);
        assert!(!counts.is_empty());
        assert!(CategoryCounts::default().is_empty());
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let json = serde_json::to_value(CategoryCounts::uniform(3)).unwrap();
        assert_eq!(json["milkBun"], 3);
        assert_eq!(json["hotChocolate"], 3);

        // Missing categories default to zero (older documents)
        let parsed: CategoryCounts = serde_json::from_str(r#"{"chai":5}"#).unwrap();
        assert_eq!(parsed.chai, 5);
        assert_eq!(parsed.hot_chocolate, 0);
    }

    #[test]
    fn test_patch_only_touches_present_categories() {
        let mut counts = CategoryCounts::uniform(10);
        let patch: CategoryCountsPatch = serde_json::from_str(r#"{"bun":4}"#).unwrap();
        patch.apply_to(&mut counts);
        assert_eq!(counts.bun, 4);
        assert_eq!(counts.chai, 10);
    }
}
