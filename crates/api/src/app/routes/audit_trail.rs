use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use wareflow_infra::InventoryStore;

use crate::app::errors;
use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:entity_type/:entity_id", get(get_trail))
}

/// The audit trail for one entity, oldest first.
pub async fn get_trail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "audit.read") {
        return resp;
    }

    match services
        .store
        .audit_for_entity(&entity_type, &entity_id)
        .await
    {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
