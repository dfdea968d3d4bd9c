//! Inventory ledger arithmetic
//!
//! Pure functions over [`CategoryCounts`]; the caller reads the ledger and
//! writes the result back inside the same write transaction.

use shared::models::{CategoryCounts, ItemCategory};
use std::fmt;
use std::str::FromStr;

/// How join treats demand beyond the remaining stock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinStockPolicy {
    /// Floor each category at zero and accept the ticket (may oversell)
    #[default]
    Clamp,
    /// Refuse the ticket like an over-stock edit
    Reject,
}

impl FromStr for JoinStockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown join stock policy: {other}")),
        }
    }
}

impl fmt::Display for JoinStockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clamp => f.write_str("clamp"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Requested quantity exceeds what the ledger can give
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockShortfall {
    pub category: ItemCategory,
    pub available: u32,
    pub requested: u32,
}

/// Take `demand` out of `ledger` according to `policy`.
pub fn reserve(
    ledger: &CategoryCounts,
    demand: &CategoryCounts,
    policy: JoinStockPolicy,
) -> Result<CategoryCounts, StockShortfall> {
    let mut next = *ledger;
    for (category, requested) in demand.iter() {
        let available = ledger.get(category);
        if requested > available && policy == JoinStockPolicy::Reject {
            return Err(StockShortfall {
                category,
                available,
                requested,
            });
        }
        next.set(category, available.saturating_sub(requested));
    }
    Ok(next)
}

/// Swap a ticket's old quantities for new ones: `ledger + old - new`.
///
/// Fails without touching anything when any category would go negative.
pub fn rebalance(
    ledger: &CategoryCounts,
    old: &CategoryCounts,
    new: &CategoryCounts,
) -> Result<CategoryCounts, StockShortfall> {
    let mut next = *ledger;
    for category in ItemCategory::ALL {
        let available = i64::from(ledger.get(category)) + i64::from(old.get(category));
        let requested = i64::from(new.get(category));
        let remaining = available - requested;
        if remaining < 0 {
            return Err(StockShortfall {
                category,
                available: u32::try_from(available).unwrap_or(u32::MAX),
                requested: new.get(category),
            });
        }
        next.set(category, u32::try_from(remaining).unwrap_or(u32::MAX));
    }
    Ok(next)
}

/// Give `released` back to the ledger
pub fn restore(ledger: &CategoryCounts, released: &CategoryCounts) -> CategoryCounts {
    let mut next = *ledger;
    next.add_all(released);
    next
}
