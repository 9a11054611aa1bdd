use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wareflow_core::{AssetId, DomainError, DomainResult, Entity, ItemId, LocationId};

/// Lifecycle/quality state of a physical asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    Good,
    Fair,
    Poor,
    UnderMaintenance,
    Scrap,
}

impl AssetCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCondition::Good => "good",
            AssetCondition::Fair => "fair",
            AssetCondition::Poor => "poor",
            AssetCondition::UnderMaintenance => "under_maintenance",
            AssetCondition::Scrap => "scrap",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "good" => Ok(AssetCondition::Good),
            "fair" => Ok(AssetCondition::Fair),
            "poor" => Ok(AssetCondition::Poor),
            "under_maintenance" => Ok(AssetCondition::UnderMaintenance),
            "scrap" => Ok(AssetCondition::Scrap),
            other => Err(DomainError::validation(format!(
                "unknown asset condition '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for AssetCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset's condition forbids the requested movement.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("asset {asset} cannot be issued in condition {condition}")]
pub struct AssetNotMovable {
    pub asset: AssetId,
    pub condition: AssetCondition,
}

/// A physical, individually-tracked asset.
///
/// Condition and current location are mutated only by the slip engine (and
/// by maintenance workflows, which share this entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Human-readable tag, unique across the system.
    pub tag: String,
    /// Type classification.
    pub item: ItemId,
    pub condition: AssetCondition,
    pub current_location: LocationId,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        id: AssetId,
        tag: impl Into<String>,
        item: ItemId,
        condition: AssetCondition,
        current_location: LocationId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(DomainError::validation("asset tag cannot be empty"));
        }
        Ok(Self {
            id,
            tag,
            item,
            condition,
            current_location,
            created_at,
        })
    }

    /// Asset state guard: may this asset leave inventory custody?
    ///
    /// Pure check, no side effects. Only issue-type movement is gated; the
    /// caller snapshots `condition_at_move` from the condition observed here
    /// before any later line processing could change it.
    pub fn check_issuable(&self) -> Result<(), AssetNotMovable> {
        match self.condition {
            AssetCondition::Scrap | AssetCondition::UnderMaintenance => Err(AssetNotMovable {
                asset: self.id,
                condition: self.condition,
            }),
            _ => Ok(()),
        }
    }

    /// Successor asset after a committed movement.
    pub fn moved_to(&self, location: LocationId, new_condition: Option<AssetCondition>) -> Asset {
        Asset {
            current_location: location,
            condition: new_condition.unwrap_or(self.condition),
            ..self.clone()
        }
    }
}

impl Entity for Asset {
    type Id = AssetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(condition: AssetCondition) -> Asset {
        Asset::new(
            AssetId::new(),
            "T-001",
            ItemId::new(),
            condition,
            LocationId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn scrap_and_maintenance_assets_are_not_issuable() {
        for condition in [AssetCondition::Scrap, AssetCondition::UnderMaintenance] {
            let a = asset(condition);
            let err = a.check_issuable().unwrap_err();
            assert_eq!(err.asset, a.id);
            assert_eq!(err.condition, condition);
        }
    }

    #[test]
    fn serviceable_assets_are_issuable() {
        for condition in [AssetCondition::Good, AssetCondition::Fair, AssetCondition::Poor] {
            assert!(asset(condition).check_issuable().is_ok());
        }
    }

    #[test]
    fn moved_to_keeps_condition_unless_replaced() {
        let a = asset(AssetCondition::Good);
        let dest = LocationId::new();

        let moved = a.moved_to(dest, None);
        assert_eq!(moved.current_location, dest);
        assert_eq!(moved.condition, AssetCondition::Good);

        let downgraded = a.moved_to(dest, Some(AssetCondition::Poor));
        assert_eq!(downgraded.condition, AssetCondition::Poor);
    }

    #[test]
    fn condition_round_trips_through_text() {
        for condition in [
            AssetCondition::Good,
            AssetCondition::Fair,
            AssetCondition::Poor,
            AssetCondition::UnderMaintenance,
            AssetCondition::Scrap,
        ] {
            assert_eq!(AssetCondition::parse(condition.as_str()).unwrap(), condition);
        }
        assert!(AssetCondition::parse("broken").is_err());
    }
}
