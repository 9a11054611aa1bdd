//! API-side authorization guard.
//!
//! Enforces permissions at the route boundary before any store access, while
//! keeping the policy decision itself in `wareflow-auth`. The slip engine
//! re-checks `slips.create` internally; routes guard their reads here.

use axum::http::StatusCode;

use wareflow_auth::{Permission, Principal, authorize};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Resolve the request principal and require one permission.
///
/// The error response is deliberately generic: authorization failures never
/// reveal whether the target entity exists.
pub fn require(
    ctx: &PrincipalContext,
    permission: &'static str,
) -> Result<Principal, axum::response::Response> {
    let principal = ctx.resolve();
    match authorize(&principal, &Permission::new(permission)) {
        Ok(()) => Ok(principal),
        Err(_) => Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "forbidden",
        )),
    }
}
