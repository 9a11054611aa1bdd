use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use wareflow_infra::{EngineError, StoreError};

/// Map an engine failure to an HTTP response.
///
/// Business-rule violations carry their structured detail; permission
/// failures stay generic, and system failures stay opaque.
pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Permission => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        EngineError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        EngineError::NotFound { kind, id } => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{kind} not found: {id}"),
        ),
        EngineError::InsufficientStock(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": e.to_string(),
                "item": e.item.to_string(),
                "location": e.location.to_string(),
                "requested": e.requested,
                "on_hand": e.on_hand,
            })),
        )
            .into_response(),
        EngineError::AssetNotMovable(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "asset_not_movable",
                "message": e.to_string(),
                "asset": e.asset.to_string(),
                "condition": e.condition.as_str(),
            })),
        )
            .into_response(),
        EngineError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        EngineError::Store(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "storage failure",
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        _ => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "storage failure",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use wareflow_core::{AssetId, ItemId, LocationId};
    use wareflow_inventory::{AssetCondition, AssetNotMovable, InsufficientStock};

    #[test]
    fn business_rule_failures_map_to_422() {
        let resp = engine_error_to_response(EngineError::InsufficientStock(InsufficientStock {
            item: ItemId::new(),
            location: LocationId::new(),
            requested: Decimal::from(-5),
            on_hand: Decimal::from(3),
        }));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = engine_error_to_response(EngineError::AssetNotMovable(AssetNotMovable {
            asset: AssetId::new(),
            condition: AssetCondition::Scrap,
        }));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn permission_maps_to_generic_403() {
        let resp = engine_error_to_response(EngineError::Permission);
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn remaining_variants_map_to_expected_statuses() {
        let cases = [
            (
                engine_error_to_response(EngineError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                engine_error_to_response(EngineError::not_found("item", "x")),
                StatusCode::NOT_FOUND,
            ),
            (
                engine_error_to_response(EngineError::Conflict("dup".into())),
                StatusCode::CONFLICT,
            ),
            (
                engine_error_to_response(EngineError::Store(StoreError::Backend("down".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (resp, status) in cases {
            assert_eq!(resp.status(), status);
        }
    }
}
