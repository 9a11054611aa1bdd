use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wareflow_core::SlipId;
use wareflow_infra::InventoryStore;
use wareflow_slips::SlipRequest;

use crate::app::errors;
use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_slip))
        .route("/:id", get(get_slip))
}

/// The core entry point: one request, one atomic slip.
pub async fn create_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<SlipRequest>,
) -> axum::response::Response {
    // The engine authorizes `slips.create` itself, before any data access.
    let principal = principal.resolve();

    match services.engine.create_slip(&principal, body).await {
        Ok(slip) => (StatusCode::CREATED, Json(slip)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn get_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "slips.read") {
        return resp;
    }

    let id: SlipId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid slip id");
        }
    };

    match services.store.fetch_slip(id).await {
        Ok(Some(slip)) => (StatusCode::OK, Json(slip)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "slip not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
