//! Audited master-data service.
//!
//! Create/read for properties, locations, departments, items, users, and
//! asset registration. Deliberately thin — no cross-entity consistency rules
//! — but every create runs in its own unit of work and writes an audit
//! event, the same contract the slip engine honors.

use chrono::Utc;

use wareflow_audit::AuditEvent;
use wareflow_auth::{Permission, Principal, Role, authorize};
use wareflow_catalog::{Department, Item, Location, Property, User};
use wareflow_core::{
    AssetId, DepartmentId, ItemId, LocationId, PropertyId, UserId,
};
use wareflow_inventory::{Asset, AssetCondition};

use crate::slip_engine::EngineError;
use crate::store::InventoryStore;

#[derive(Debug)]
pub struct MasterData<S> {
    store: S,
}

impl<S> MasterData<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> MasterData<S>
where
    S: InventoryStore,
{
    pub async fn create_property(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<Property, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let property = Property::new(PropertyId::new(), name, now)?;

        let mut tx = self.store.begin().await?;
        tx.insert_property(&property).await?;
        tx.append_audit(&AuditEvent::create(
            "property",
            property.id.to_string(),
            &property,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(property)
    }

    pub async fn create_location(
        &self,
        principal: &Principal,
        property: PropertyId,
        name: &str,
    ) -> Result<Location, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let location = Location::new(LocationId::new(), property, name, now)?;

        let mut tx = self.store.begin().await?;
        tx.property(property)
            .await?
            .ok_or_else(|| EngineError::not_found("property", property))?;
        tx.insert_location(&location).await?;
        tx.append_audit(&AuditEvent::create(
            "location",
            location.id.to_string(),
            &location,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(location)
    }

    pub async fn create_department(
        &self,
        principal: &Principal,
        name: &str,
    ) -> Result<Department, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let department = Department::new(DepartmentId::new(), name, now)?;

        let mut tx = self.store.begin().await?;
        tx.insert_department(&department).await?;
        tx.append_audit(&AuditEvent::create(
            "department",
            department.id.to_string(),
            &department,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(department)
    }

    pub async fn create_item(
        &self,
        principal: &Principal,
        sku: &str,
        name: &str,
        unit: &str,
    ) -> Result<Item, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let item = Item::new(ItemId::new(), sku, name, unit, now)?;

        let mut tx = self.store.begin().await?;
        tx.insert_item(&item).await?;
        tx.append_audit(&AuditEvent::create(
            "item",
            item.id.to_string(),
            &item,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(item)
    }

    pub async fn create_user(
        &self,
        principal: &Principal,
        username: &str,
        display_name: &str,
        roles: Vec<Role>,
    ) -> Result<User, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let user = User::new(UserId::new(), username, display_name, roles, now)?;

        let mut tx = self.store.begin().await?;
        tx.insert_user(&user).await?;
        tx.append_audit(&AuditEvent::create(
            "user",
            user.id.to_string(),
            &user,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn register_asset(
        &self,
        principal: &Principal,
        tag: &str,
        item: ItemId,
        condition: AssetCondition,
        location: LocationId,
    ) -> Result<Asset, EngineError> {
        self.authorize_write(principal)?;
        let now = Utc::now();
        let asset = Asset::new(AssetId::new(), tag, item, condition, location, now)?;

        let mut tx = self.store.begin().await?;
        tx.item(item)
            .await?
            .ok_or_else(|| EngineError::not_found("item", item))?;
        tx.location(location)
            .await?
            .ok_or_else(|| EngineError::not_found("location", location))?;
        tx.insert_asset(&asset).await?;
        tx.append_audit(&AuditEvent::create(
            "asset",
            asset.id.to_string(),
            &asset,
            principal.principal_id,
            now,
        )?)
        .await?;
        tx.commit().await?;
        Ok(asset)
    }

    fn authorize_write(&self, principal: &Principal) -> Result<(), EngineError> {
        authorize(principal, &Permission::new("catalog.write")).map_err(|_| EngineError::Permission)
    }
}
