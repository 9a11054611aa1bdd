use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{DomainError, DomainResult, Entity, ItemId};

/// A fungible stock item type (classification for stock and assets).
///
/// Quantity on hand is *not* stored here — it lives in per-location stock
/// balance rows maintained by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    /// Unit of measure for quantities ("pcs", "kg", "l").
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        id: ItemId,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();
        let unit = unit.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("item sku cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if unit.trim().is_empty() {
            return Err(DomainError::validation("item unit cannot be empty"));
        }
        Ok(Self {
            id,
            sku,
            name,
            unit,
            created_at,
        })
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_sku_name_or_unit() {
        let now = Utc::now();
        assert!(Item::new(ItemId::new(), "", "Wire", "kg", now).is_err());
        assert!(Item::new(ItemId::new(), "WIRE-01", " ", "kg", now).is_err());
        assert!(Item::new(ItemId::new(), "WIRE-01", "Wire", "", now).is_err());
    }
}
