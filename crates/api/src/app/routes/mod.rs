use axum::{Router, routing::get};

pub mod assets;
pub mod audit_trail;
pub mod catalog;
pub mod slips;
pub mod stock;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/slips", slips::router())
        .nest("/assets", assets::router())
        .nest("/stock", stock::router())
        .nest("/catalog", catalog::router())
        .nest("/audit", audit_trail::router())
}
