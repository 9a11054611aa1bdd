use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wareflow_core::{AssetId, ItemId, LocationId, MovementId, SlipId};

/// What a movement log entry is about: fungible stock or one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSubject {
    Item(ItemId),
    Asset(AssetId),
}

/// Immutable record of one physical/quantity change.
///
/// Append-only: written once per applied slip-line effect (and by
/// maintenance workflows, which carry no slip reference). Pure record — any
/// validation has already happened upstream, so the log documents committed
/// state changes only, never rejected attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLog {
    pub id: MovementId,
    pub slip: Option<SlipId>,
    pub subject: MovementSubject,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    /// Signed quantity delta for stock movements; `None` for asset-only moves.
    pub delta: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
}

impl MovementLog {
    /// Stock movement: a signed delta applied at one or both locations.
    pub fn stock(
        slip: Option<SlipId>,
        item: ItemId,
        from_location: Option<LocationId>,
        to_location: Option<LocationId>,
        delta: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::new(),
            slip,
            subject: MovementSubject::Item(item),
            from_location,
            to_location,
            delta: Some(delta),
            occurred_at,
        }
    }

    /// Asset movement: a physical relocation with no quantity component.
    pub fn asset(
        slip: Option<SlipId>,
        asset: AssetId,
        from_location: Option<LocationId>,
        to_location: Option<LocationId>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::new(),
            slip,
            subject: MovementSubject::Asset(asset),
            from_location,
            to_location,
            delta: None,
            occurred_at,
        }
    }
}
