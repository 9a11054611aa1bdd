use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use wareflow_infra::InventoryStore;

use crate::app::dto::BalanceParams;
use crate::app::errors;
use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(get_balance))
}

/// Read-only ledger view: the balance row for one `(item, location)` pair.
///
/// A pair with no movements yet reads as zero.
pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<BalanceParams>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "stock.read") {
        return resp;
    }

    match services.store.fetch_balance(params.item, params.location).await {
        Ok(Some(balance)) => (StatusCode::OK, Json(balance)).into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "item": params.item.to_string(),
                "location": params.location.to_string(),
                "qty_on_hand": "0",
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
