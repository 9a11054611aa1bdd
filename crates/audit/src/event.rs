use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use wareflow_auth::PrincipalId;
use wareflow_core::{AuditEventId, DomainError, DomainResult};

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            other => Err(DomainError::validation(format!(
                "unknown audit action '{other}'"
            ))),
        }
    }
}

/// Immutable before/after snapshot of one entity mutation.
///
/// For CREATE the old value is absent; for DELETE the new value is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub entity_type: String,
    pub entity_id: String,
    pub action: AuditAction,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub actor: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn create<T: Serialize>(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        new_value: &T,
        actor: PrincipalId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: AuditEventId::new(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action: AuditAction::Create,
            old_value: None,
            new_value: Some(snapshot(new_value)?),
            actor,
            occurred_at,
        })
    }

    pub fn update<T: Serialize>(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        old_value: &T,
        new_value: &T,
        actor: PrincipalId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: AuditEventId::new(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action: AuditAction::Update,
            old_value: Some(snapshot(old_value)?),
            new_value: Some(snapshot(new_value)?),
            actor,
            occurred_at,
        })
    }

    pub fn delete<T: Serialize>(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        old_value: &T,
        actor: PrincipalId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: AuditEventId::new(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action: AuditAction::Delete,
            old_value: Some(snapshot(old_value)?),
            new_value: None,
            actor,
            occurred_at,
        })
    }
}

fn snapshot<T: Serialize>(value: &T) -> DomainResult<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::validation(format!("snapshot serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Widget {
        name: &'static str,
        count: u32,
    }

    #[test]
    fn create_has_new_value_only() {
        let ev = AuditEvent::create(
            "widget",
            "w-1",
            &Widget { name: "a", count: 1 },
            PrincipalId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ev.action, AuditAction::Create);
        assert!(ev.old_value.is_none());
        assert_eq!(ev.new_value, Some(json!({"name": "a", "count": 1})));
    }

    #[test]
    fn update_captures_both_snapshots() {
        let ev = AuditEvent::update(
            "widget",
            "w-1",
            &Widget { name: "a", count: 1 },
            &Widget { name: "a", count: 2 },
            PrincipalId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ev.action, AuditAction::Update);
        assert_eq!(ev.old_value, Some(json!({"name": "a", "count": 1})));
        assert_eq!(ev.new_value, Some(json!({"name": "a", "count": 2})));
    }

    #[test]
    fn delete_has_old_value_only() {
        let ev = AuditEvent::delete(
            "widget",
            "w-1",
            &Widget { name: "a", count: 1 },
            PrincipalId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(ev.action, AuditAction::Delete);
        assert!(ev.new_value.is_none());
        assert!(ev.old_value.is_some());
    }
}
