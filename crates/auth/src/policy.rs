//! Role→permission policy.
//!
//! Static mapping for now; a DB-backed policy source can replace this without
//! touching `authorize`.

use crate::{Permission, Role};

/// Permissions granted by a single role.
pub fn permissions_for_role(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        // Full administrator.
        "admin" => vec![Permission::new("*")],
        // Runs the storeroom: moves stock/assets, maintains master data.
        "storekeeper" => vec![
            Permission::new("slips.create"),
            Permission::new("slips.read"),
            Permission::new("assets.read"),
            Permission::new("stock.read"),
            Permission::new("catalog.read"),
            Permission::new("catalog.write"),
        ],
        // Requests and receives; read-only otherwise.
        "clerk" => vec![
            Permission::new("slips.read"),
            Permission::new("assets.read"),
            Permission::new("stock.read"),
            Permission::new("catalog.read"),
        ],
        // Compliance: read everything, change nothing.
        "auditor" => vec![
            Permission::new("slips.read"),
            Permission::new("assets.read"),
            Permission::new("stock.read"),
            Permission::new("catalog.read"),
            Permission::new("audit.read"),
        ],
        _ => Vec::new(),
    }
}

/// Union of permissions across a principal's roles (deduplicated).
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    let mut out: Vec<Permission> = Vec::new();
    for role in roles {
        for perm in permissions_for_role(role) {
            if !out.contains(&perm) {
                out.push(perm);
            }
        }
    }
    out
}

/// Pure predicate: may a caller with these roles create slips?
pub fn can_create_slip(roles: &[Role]) -> bool {
    permissions_for_roles(roles)
        .iter()
        .any(|p| p.is_wildcard() || p.as_str() == "slips.create")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storekeeper_can_create_slips() {
        assert!(can_create_slip(&[Role::new("storekeeper")]));
    }

    #[test]
    fn clerk_cannot_create_slips() {
        assert!(!can_create_slip(&[Role::new("clerk")]));
    }

    #[test]
    fn admin_wildcard_covers_slip_creation() {
        assert!(can_create_slip(&[Role::new("admin")]));
    }

    #[test]
    fn role_union_deduplicates() {
        let perms = permissions_for_roles(&[Role::new("clerk"), Role::new("auditor")]);
        let reads = perms.iter().filter(|p| p.as_str() == "slips.read").count();
        assert_eq!(reads, 1);
    }
}
