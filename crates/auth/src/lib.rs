//! `wareflow-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Token
//! signature verification lives at the API edge; everything here is
//! deterministic policy over already-verified claims.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use policy::{can_create_slip, permissions_for_roles};
pub use principal::PrincipalId;
pub use roles::Role;
