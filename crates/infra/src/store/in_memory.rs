use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use wareflow_audit::AuditEvent;
use wareflow_catalog::{Department, Item, Location, Property, User};
use wareflow_core::{AssetId, DepartmentId, ItemId, LocationId, PropertyId, SlipId, UserId};
use wareflow_inventory::{Asset, MovementLog, StockBalance};
use wareflow_slips::Slip;

use super::{InventoryStore, StoreError, StoreTx};

#[derive(Debug, Default, Clone)]
struct State {
    properties: HashMap<PropertyId, Property>,
    locations: HashMap<LocationId, Location>,
    departments: HashMap<DepartmentId, Department>,
    items: HashMap<ItemId, Item>,
    users: HashMap<UserId, User>,
    assets: HashMap<AssetId, Asset>,
    balances: HashMap<(ItemId, LocationId), StockBalance>,
    slips: HashMap<SlipId, Slip>,
    movements: Vec<MovementLog>,
    audits: Vec<AuditEvent>,
}

/// In-memory transactional store.
///
/// Intended for tests/dev. A transaction clones the current state, works on
/// the copy, and swaps it back on commit while holding the store-wide mutex
/// for the whole unit of work — a single-writer double of the Postgres
/// backend's row-level locking. Dropping a transaction without committing
/// discards the copy (rollback).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    work: State,
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(InMemoryTx { guard, work }))
    }

    async fn fetch_slip(&self, id: SlipId) -> Result<Option<Slip>, StoreError> {
        Ok(self.state.lock().await.slips.get(&id).cloned())
    }

    async fn fetch_property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.state.lock().await.properties.get(&id).cloned())
    }

    async fn fetch_location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        Ok(self.state.lock().await.locations.get(&id).cloned())
    }

    async fn fetch_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        Ok(self.state.lock().await.departments.get(&id).cloned())
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn fetch_asset(&self, id: AssetId) -> Result<Option<Asset>, StoreError> {
        Ok(self.state.lock().await.assets.get(&id).cloned())
    }

    async fn search_assets(&self, query: &str, limit: u32) -> Result<Vec<Asset>, StoreError> {
        let needle = query.to_lowercase();
        let state = self.state.lock().await;
        let mut hits: Vec<Asset> = state
            .assets
            .values()
            .filter(|a| {
                a.tag.to_lowercase().contains(&needle)
                    || state
                        .items
                        .get(&a.item)
                        .is_some_and(|i| i.name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.tag.cmp(&b.tag));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn fetch_balance(
        &self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError> {
        Ok(self.state.lock().await.balances.get(&(item, location)).cloned())
    }

    async fn movements_for_slip(&self, slip: SlipId) -> Result<Vec<MovementLog>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .movements
            .iter()
            .filter(|m| m.slip == Some(slip))
            .cloned()
            .collect())
    }

    async fn audit_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(self
            .state
            .lock()
            .await
            .audits
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn property(&mut self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.work.properties.get(&id).cloned())
    }

    async fn location(&mut self, id: LocationId) -> Result<Option<Location>, StoreError> {
        Ok(self.work.locations.get(&id).cloned())
    }

    async fn department(&mut self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        Ok(self.work.departments.get(&id).cloned())
    }

    async fn item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.work.items.get(&id).cloned())
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn asset(&mut self, id: AssetId) -> Result<Option<Asset>, StoreError> {
        Ok(self.work.assets.get(&id).cloned())
    }

    async fn balance_for_update(
        &mut self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError> {
        // The store-wide mutex held by this transaction is the lock.
        Ok(self.work.balances.get(&(item, location)).cloned())
    }

    async fn upsert_balance(&mut self, balance: &StockBalance) -> Result<(), StoreError> {
        self.work
            .balances
            .insert((balance.item, balance.location), balance.clone());
        Ok(())
    }

    async fn update_asset(&mut self, asset: &Asset) -> Result<(), StoreError> {
        if !self.work.assets.contains_key(&asset.id) {
            return Err(StoreError::Constraint(format!(
                "asset {} does not exist",
                asset.id
            )));
        }
        self.work.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn insert_slip(&mut self, slip: &Slip) -> Result<(), StoreError> {
        if self.work.slips.values().any(|s| s.slip_no == slip.slip_no) {
            return Err(StoreError::Conflict(format!(
                "slip_no '{}' already exists",
                slip.slip_no
            )));
        }
        self.work.slips.insert(slip.id, slip.clone());
        Ok(())
    }

    async fn append_movement(&mut self, movement: &MovementLog) -> Result<(), StoreError> {
        self.work.movements.push(movement.clone());
        Ok(())
    }

    async fn append_audit(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        self.work.audits.push(event.clone());
        Ok(())
    }

    async fn insert_property(&mut self, property: &Property) -> Result<(), StoreError> {
        self.work.properties.insert(property.id, property.clone());
        Ok(())
    }

    async fn insert_location(&mut self, location: &Location) -> Result<(), StoreError> {
        if !self.work.properties.contains_key(&location.property) {
            return Err(StoreError::Constraint(format!(
                "property {} does not exist",
                location.property
            )));
        }
        self.work.locations.insert(location.id, location.clone());
        Ok(())
    }

    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError> {
        self.work.departments.insert(department.id, department.clone());
        Ok(())
    }

    async fn insert_item(&mut self, item: &Item) -> Result<(), StoreError> {
        if self.work.items.values().any(|i| i.sku == item.sku) {
            return Err(StoreError::Conflict(format!(
                "item sku '{}' already exists",
                item.sku
            )));
        }
        self.work.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        if self.work.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        self.work.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_asset(&mut self, asset: &Asset) -> Result<(), StoreError> {
        if self.work.assets.values().any(|a| a.tag == asset.tag) {
            return Err(StoreError::Conflict(format!(
                "asset tag '{}' already exists",
                asset.tag
            )));
        }
        self.work.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        *self.guard = std::mem::take(&mut self.work);
        Ok(())
    }
}
