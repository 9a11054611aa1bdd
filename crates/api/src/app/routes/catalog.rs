use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wareflow_auth::Role;
use wareflow_core::{DepartmentId, ItemId, LocationId, PropertyId, UserId};
use wareflow_infra::InventoryStore;
use wareflow_inventory::AssetCondition;

use crate::app::dto;
use crate::app::errors;
use crate::app::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/properties", post(create_property))
        .route("/properties/:id", get(get_property))
        .route("/locations", post(create_location))
        .route("/locations/:id", get(get_location))
        .route("/departments", post(create_department))
        .route("/departments/:id", get(get_department))
        .route("/items", post(create_item))
        .route("/items/:id", get(get_item))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/assets", post(register_asset))
}

pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreatePropertyRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    match services.masterdata.create_property(&principal, &body.name).await {
        Ok(property) => (StatusCode::CREATED, Json(property)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    match services
        .masterdata
        .create_location(&principal, body.property, &body.name)
        .await
    {
        Ok(location) => (StatusCode::CREATED, Json(location)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn create_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateDepartmentRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    match services
        .masterdata
        .create_department(&principal, &body.name)
        .await
    {
        Ok(department) => (StatusCode::CREATED, Json(department)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    match services
        .masterdata
        .create_item(&principal, &body.sku, &body.name, &body.unit)
        .await
    {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    let roles: Vec<Role> = body.roles.into_iter().map(Role::new).collect();
    match services
        .masterdata
        .create_user(&principal, &body.username, &body.display_name, roles)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn register_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RegisterAssetRequest>,
) -> axum::response::Response {
    let principal = principal.resolve();
    let condition = match AssetCondition::parse(&body.condition) {
        Ok(c) => c,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_condition",
                "condition must be one of: good, fair, poor, under_maintenance, scrap",
            );
        }
    };
    match services
        .masterdata
        .register_asset(&principal, &body.tag, body.item, condition, body.location)
        .await
    {
        Ok(asset) => (StatusCode::CREATED, Json(asset)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn get_property(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "catalog.read") {
        return resp;
    }
    let id: PropertyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid property id");
        }
    };
    match services.store.fetch_property(id).await {
        Ok(Some(property)) => (StatusCode::OK, Json(property)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "property not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_location(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "catalog.read") {
        return resp;
    }
    let id: LocationId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid location id");
        }
    };
    match services.store.fetch_location(id).await {
        Ok(Some(location)) => (StatusCode::OK, Json(location)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "location not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "catalog.read") {
        return resp;
    }
    let id: DepartmentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid department id",
            );
        }
    };
    match services.store.fetch_department(id).await {
        Ok(Some(department)) => (StatusCode::OK, Json(department)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "department not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "catalog.read") {
        return resp;
    }
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };
    match services.store.fetch_item(id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, "catalog.read") {
        return resp;
    }
    let id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
        }
    };
    match services.store.fetch_user(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
