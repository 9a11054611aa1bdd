use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, PrincipalId, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API layer derives it from verified claims plus the
/// role→permission policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve a principal from its roles using the default policy mapping.
    pub fn resolve(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        let permissions = crate::policy::permissions_for_roles(&roles);
        Self {
            principal_id,
            roles,
            permissions,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for a required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[&'static str]) -> Principal {
        Principal::resolve(
            PrincipalId::new(),
            roles.iter().map(|r| Role::new(*r)).collect(),
        )
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(&["admin"]);
        assert!(authorize(&p, &Permission::new("slips.create")).is_ok());
        assert!(authorize(&p, &Permission::new("catalog.write")).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let p = principal(&["clerk"]);
        let err = authorize(&p, &Permission::new("slips.create")).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("slips.create".to_string()));
    }

    #[test]
    fn unknown_role_grants_nothing() {
        let p = principal(&["intern"]);
        assert!(authorize(&p, &Permission::new("slips.read")).is_err());
    }
}
