use serde::Deserialize;

use wareflow_core::{ItemId, LocationId, PropertyId};

// -------------------------
// Request DTOs
// -------------------------
//
// Slip creation deserializes straight into `wareflow_slips::SlipRequest`;
// only master-data endpoints need dedicated request shapes.

#[derive(Debug, Deserialize)]
pub struct CreatePropertyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub property: PropertyId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterAssetRequest {
    pub tag: String,
    pub item: ItemId,
    /// One of: good, fair, poor, under_maintenance, scrap.
    pub condition: String,
    pub location: LocationId,
}

#[derive(Debug, Deserialize)]
pub struct AssetSearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceParams {
    pub item: ItemId,
    pub location: LocationId,
}
