use wareflow_auth::{Principal, PrincipalId, Role};

/// Principal context for a request (authenticated identity + roles).
///
/// Immutable; inserted by the auth middleware and required for all domain
/// routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self {
            principal_id,
            roles,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Resolve into an authorization principal using the policy mapping.
    pub fn resolve(&self) -> Principal {
        Principal::resolve(self.principal_id, self.roles.clone())
    }
}
