use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use wareflow_core::AssetId;
use wareflow_infra::InventoryStore;

use crate::app::dto::AssetSearchParams;
use crate::app::errors;
use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// Search results are capped at one page.
const SEARCH_LIMIT: u32 = 50;

pub fn router() -> Router {
    Router::new()
        .route("/search", get(search_assets))
        .route("/:id", get(get_asset))
}

pub async fn search_assets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<AssetSearchParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "assets.read") {
        return resp;
    }

    match services.store.search_assets(&params.q, SEARCH_LIMIT).await {
        Ok(assets) => (StatusCode::OK, Json(assets)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "assets.read") {
        return resp;
    }

    let id: AssetId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid asset id");
        }
    };

    match services.store.fetch_asset(id).await {
        Ok(Some(asset)) => (StatusCode::OK, Json(asset)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "asset not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
