use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{DomainError, DomainResult, Entity, LocationId, PropertyId};

/// A property: the top-level site grouping (a campus, a building complex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn new(id: PropertyId, name: impl Into<String>, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("property name cannot be empty"));
        }
        Ok(Self { id, name, created_at })
    }
}

impl Entity for Property {
    type Id = PropertyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A storage/issue location within one property (a storeroom, a ward, a yard).
///
/// Stock balances and asset positions are kept per location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub property: PropertyId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(
        id: LocationId,
        property: PropertyId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        Ok(Self {
            id,
            property,
            name,
            created_at,
        })
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
