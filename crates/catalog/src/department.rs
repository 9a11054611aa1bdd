use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{DepartmentId, DomainError, DomainResult, Entity};

/// A requesting organizational unit (maintenance, housekeeping, kitchen...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Department {
    pub fn new(id: DepartmentId, name: impl Into<String>, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("department name cannot be empty"));
        }
        Ok(Self { id, name, created_at })
    }
}

impl Entity for Department {
    type Id = DepartmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
