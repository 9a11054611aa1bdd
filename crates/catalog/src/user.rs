use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_auth::Role;
use wareflow_core::{DomainError, DomainResult, Entity, UserId};

/// A user referenced by slips (requester, issuer, receiver) and by audit
/// records.
///
/// Credential management is out of scope; this is the directory entry only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        display_name: impl Into<String>,
        roles: Vec<Role>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.into();
        let display_name = display_name.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        Ok(Self {
            id,
            username,
            display_name,
            roles,
            created_at,
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
