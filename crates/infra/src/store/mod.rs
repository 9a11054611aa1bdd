//! Transactional store boundary.
//!
//! The store is the **persistence collaborator** for the slip engine: it
//! exposes atomic multi-statement units of work with rollback-on-drop
//! semantics and unique-constraint enforcement on `(item, location)` balances
//! and slip numbers.
//!
//! ## Design principles
//!
//! - **No storage assumptions**: works with the in-memory implementation
//!   (tests/dev) and the Postgres backend (production).
//! - **One unit of work per slip**: every mutation a slip causes — balances,
//!   asset rows, movement logs, audit events, the slip document itself —
//!   happens through a single [`StoreTx`], committed or dropped exactly once
//!   at the top level. No collaborator commits independently.
//! - **Append-only logs**: movement and audit records have no update or
//!   delete path anywhere on these traits.

mod in_memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use wareflow_audit::AuditEvent;
use wareflow_catalog::{Department, Item, Location, Property, User};
use wareflow_core::{AssetId, DepartmentId, ItemId, LocationId, PropertyId, SlipId, UserId};
use wareflow_inventory::{Asset, MovementLog, StockBalance};
use wareflow_slips::Slip;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Store operation error.
///
/// Infrastructure failures only; business rule violations (insufficient
/// stock, unmovable assets) never originate here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-constraint violation or concurrent-commit conflict. Safe to
    /// retry the whole operation after inspecting the message.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Referential-integrity or check-constraint violation.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Row payload could not be serialized/deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The backend failed (connection loss, pool exhaustion, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Transactional inventory store.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Open a unit of work.
    ///
    /// Dropping the returned transaction without calling
    /// [`StoreTx::commit`] rolls back every statement issued through it.
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError>;

    // Read-only lookups (no unit of work required).

    async fn fetch_slip(&self, id: SlipId) -> Result<Option<Slip>, StoreError>;
    async fn fetch_property(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;
    async fn fetch_location(&self, id: LocationId) -> Result<Option<Location>, StoreError>;
    async fn fetch_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError>;
    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;
    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn fetch_asset(&self, id: AssetId) -> Result<Option<Asset>, StoreError>;

    /// Case-insensitive asset search over tag and name, ordered by tag.
    async fn search_assets(&self, query: &str, limit: u32) -> Result<Vec<Asset>, StoreError>;

    async fn fetch_balance(
        &self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError>;

    async fn movements_for_slip(&self, slip: SlipId) -> Result<Vec<MovementLog>, StoreError>;

    async fn audit_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEvent>, StoreError>;
}

/// One open unit of work.
///
/// All reads issued through a transaction observe its own uncommitted writes.
/// `balance_for_update` additionally takes (or emulates) an exclusive lock on
/// the balance row so that concurrent read-modify-write cycles on the same
/// `(item, location)` pair serialize.
#[async_trait]
pub trait StoreTx: Send {
    async fn property(&mut self, id: PropertyId) -> Result<Option<Property>, StoreError>;
    async fn location(&mut self, id: LocationId) -> Result<Option<Location>, StoreError>;
    async fn department(&mut self, id: DepartmentId) -> Result<Option<Department>, StoreError>;
    async fn item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError>;
    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn asset(&mut self, id: AssetId) -> Result<Option<Asset>, StoreError>;

    /// Read a balance row with an exclusive row lock (absent row → `None`).
    async fn balance_for_update(
        &mut self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError>;

    async fn upsert_balance(&mut self, balance: &StockBalance) -> Result<(), StoreError>;

    async fn update_asset(&mut self, asset: &Asset) -> Result<(), StoreError>;

    /// Persist a slip header, its lines, and its signature.
    async fn insert_slip(&mut self, slip: &Slip) -> Result<(), StoreError>;

    async fn append_movement(&mut self, movement: &MovementLog) -> Result<(), StoreError>;
    async fn append_audit(&mut self, event: &AuditEvent) -> Result<(), StoreError>;

    // Master-data inserts.

    async fn insert_property(&mut self, property: &Property) -> Result<(), StoreError>;
    async fn insert_location(&mut self, location: &Location) -> Result<(), StoreError>;
    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError>;
    async fn insert_item(&mut self, item: &Item) -> Result<(), StoreError>;
    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError>;
    async fn insert_asset(&mut self, asset: &Asset) -> Result<(), StoreError>;

    /// Commit the unit of work. Consumes the transaction; failures leave
    /// nothing applied.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError> {
        (**self).begin().await
    }

    async fn fetch_slip(&self, id: SlipId) -> Result<Option<Slip>, StoreError> {
        (**self).fetch_slip(id).await
    }

    async fn fetch_property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        (**self).fetch_property(id).await
    }

    async fn fetch_location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        (**self).fetch_location(id).await
    }

    async fn fetch_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        (**self).fetch_department(id).await
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).fetch_item(id).await
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).fetch_user(id).await
    }

    async fn fetch_asset(&self, id: AssetId) -> Result<Option<Asset>, StoreError> {
        (**self).fetch_asset(id).await
    }

    async fn search_assets(&self, query: &str, limit: u32) -> Result<Vec<Asset>, StoreError> {
        (**self).search_assets(query, limit).await
    }

    async fn fetch_balance(
        &self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError> {
        (**self).fetch_balance(item, location).await
    }

    async fn movements_for_slip(&self, slip: SlipId) -> Result<Vec<MovementLog>, StoreError> {
        (**self).movements_for_slip(slip).await
    }

    async fn audit_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEvent>, StoreError> {
        (**self).audit_for_entity(entity_type, entity_id).await
    }
}
