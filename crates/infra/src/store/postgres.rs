//! Postgres-backed inventory store.
//!
//! Uniqueness of `(item_id, location_id)` balances and `slip_no` is enforced
//! by the schema (`migrations/0001_init.sql`); the `qty_on_hand >= 0` CHECK
//! constraint backs up the ledger's own invariant. Same-pair read-modify-write
//! cycles serialize on a `SELECT ... FOR UPDATE` row lock, so concurrent slips
//! touching disjoint pairs do not block each other.
//!
//! ## Error mapping
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` (unique)      | `Conflict` | duplicate slip_no / tag / sku, concurrent balance insert |
//! | `23503` (foreign key) | `Constraint` | dangling reference |
//! | `23514` (check)       | `Constraint` | negative quantity reached storage (ledger bug) |
//! | other                 | `Backend`  | connection loss, pool exhaustion, ... |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use wareflow_audit::{AuditAction, AuditEvent};
use wareflow_catalog::{Department, Item, Location, Property, User};
use wareflow_core::{
    AssetId, DepartmentId, ItemId, LocationId, PropertyId, Qty, SlipId, UserId,
};
use wareflow_inventory::{Asset, AssetCondition, MovementLog, MovementSubject, StockBalance};
use wareflow_slips::{LineKind, Signature, SignatureMethod, Slip, SlipLine, SlipType};

use super::{InventoryStore, StoreError, StoreTx};

/// Postgres-backed transactional store.
///
/// `Send + Sync`; all operations go through the SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        db.code().as_deref() == Some("23505")
    } else {
        false
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => StoreError::Conflict(format!("{operation}: {}", db.message())),
            Some("23503") | Some("23514") => {
                StoreError::Constraint(format!("{operation}: {}", db.message()))
            }
            _ => StoreError::Backend(format!("{operation}: {}", db.message())),
        },
        _ => StoreError::Backend(format!("{operation}: {err}")),
    }
}

fn decode_err(what: &'static str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Serialization(format!("{what}: {err}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Row types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct PropertyRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(r: PropertyRow) -> Self {
        Property {
            id: r.id.into(),
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    property_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(r: LocationRow) -> Self {
        Location {
            id: r.id.into(),
            property: r.property_id.into(),
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<DepartmentRow> for Department {
    fn from(r: DepartmentRow) -> Self {
        Department {
            id: r.id.into(),
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    sku: String,
    name: String,
    unit: String,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(r: ItemRow) -> Self {
        Item {
            id: r.id.into(),
            sku: r.sku,
            name: r.name,
            unit: r.unit,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    display_name: String,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id.into(),
            username: r.username,
            display_name: r.display_name,
            roles: r.roles.into_iter().map(wareflow_auth::Role::new).collect(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AssetRow {
    id: Uuid,
    tag: String,
    item_id: Uuid,
    condition: String,
    current_location: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = StoreError;

    fn try_from(r: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: r.id.into(),
            tag: r.tag,
            item: r.item_id.into(),
            condition: AssetCondition::parse(&r.condition)
                .map_err(|e| decode_err("asset condition", e))?,
            current_location: r.current_location.into(),
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct BalanceRow {
    item_id: Uuid,
    location_id: Uuid,
    qty_on_hand: Decimal,
    updated_at: DateTime<Utc>,
}

impl From<BalanceRow> for StockBalance {
    fn from(r: BalanceRow) -> Self {
        StockBalance {
            item: r.item_id.into(),
            location: r.location_id.into(),
            qty_on_hand: r.qty_on_hand,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SlipRow {
    id: Uuid,
    slip_no: String,
    slip_type: String,
    property_id: Uuid,
    from_location: Uuid,
    to_location: Uuid,
    department_id: Uuid,
    requested_by: Option<Uuid>,
    issued_by: Option<Uuid>,
    received_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SlipLineRow {
    line_no: i32,
    item_id: Option<Uuid>,
    quantity: Option<Decimal>,
    asset_id: Option<Uuid>,
    new_condition: Option<String>,
    condition_at_move: Option<String>,
}

impl TryFrom<SlipLineRow> for SlipLine {
    type Error = StoreError;

    fn try_from(r: SlipLineRow) -> Result<Self, Self::Error> {
        let kind = match (r.item_id, r.asset_id) {
            (Some(item), None) => {
                let quantity = r
                    .quantity
                    .ok_or_else(|| decode_err("slip line", "stock line without quantity"))?;
                LineKind::Stock {
                    item: item.into(),
                    quantity: Qty::new(quantity).map_err(|e| decode_err("slip line quantity", e))?,
                }
            }
            (None, Some(asset)) => LineKind::Asset {
                asset: asset.into(),
                new_condition: r
                    .new_condition
                    .as_deref()
                    .map(AssetCondition::parse)
                    .transpose()
                    .map_err(|e| decode_err("slip line new_condition", e))?,
            },
            _ => return Err(decode_err("slip line", "expected exactly one of item/asset")),
        };

        Ok(SlipLine {
            line_no: r.line_no as u32,
            kind,
            condition_at_move: r
                .condition_at_move
                .as_deref()
                .map(AssetCondition::parse)
                .transpose()
                .map_err(|e| decode_err("slip line condition_at_move", e))?,
        })
    }
}

#[derive(Debug, FromRow)]
struct SignatureRow {
    signed_by_name: String,
    signed_by_user: Option<Uuid>,
    method: String,
}

impl TryFrom<SignatureRow> for Signature {
    type Error = StoreError;

    fn try_from(r: SignatureRow) -> Result<Self, Self::Error> {
        Ok(Signature {
            signed_by_name: r.signed_by_name,
            signed_by_user: r.signed_by_user.map(Into::into),
            method: SignatureMethod::parse(&r.method)
                .map_err(|e| decode_err("signature method", e))?,
        })
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    slip_id: Option<Uuid>,
    item_id: Option<Uuid>,
    asset_id: Option<Uuid>,
    from_location: Option<Uuid>,
    to_location: Option<Uuid>,
    delta: Option<Decimal>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for MovementLog {
    type Error = StoreError;

    fn try_from(r: MovementRow) -> Result<Self, Self::Error> {
        let subject = match (r.item_id, r.asset_id) {
            (Some(item), None) => MovementSubject::Item(item.into()),
            (None, Some(asset)) => MovementSubject::Asset(asset.into()),
            _ => return Err(decode_err("movement log", "expected exactly one of item/asset")),
        };
        Ok(MovementLog {
            id: r.id.into(),
            slip: r.slip_id.map(Into::into),
            subject,
            from_location: r.from_location.map(Into::into),
            to_location: r.to_location.map(Into::into),
            delta: r.delta,
            occurred_at: r.occurred_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    entity_type: String,
    entity_id: String,
    action: String,
    old_value: Option<JsonValue>,
    new_value: Option<JsonValue>,
    actor: Uuid,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEvent {
    type Error = StoreError;

    fn try_from(r: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditEvent {
            id: r.id.into(),
            entity_type: r.entity_type,
            entity_id: r.entity_id,
            action: AuditAction::parse(&r.action).map_err(|e| decode_err("audit action", e))?,
            old_value: r.old_value,
            new_value: r.new_value,
            actor: r.actor.into(),
            occurred_at: r.occurred_at,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared lookups (pool- and transaction-scoped)
// ─────────────────────────────────────────────────────────────────────────────

async fn property_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: PropertyId,
) -> Result<Option<Property>, StoreError> {
    let row: Option<PropertyRow> =
        sqlx::query_as("SELECT id, name, created_at FROM properties WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(exec)
            .await
            .map_err(|e| map_sqlx_error("fetch_property", e))?;
    Ok(row.map(Into::into))
}

async fn location_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: LocationId,
) -> Result<Option<Location>, StoreError> {
    let row: Option<LocationRow> =
        sqlx::query_as("SELECT id, property_id, name, created_at FROM locations WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(exec)
            .await
            .map_err(|e| map_sqlx_error("fetch_location", e))?;
    Ok(row.map(Into::into))
}

async fn department_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: DepartmentId,
) -> Result<Option<Department>, StoreError> {
    let row: Option<DepartmentRow> =
        sqlx::query_as("SELECT id, name, created_at FROM departments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(exec)
            .await
            .map_err(|e| map_sqlx_error("fetch_department", e))?;
    Ok(row.map(Into::into))
}

async fn item_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: ItemId,
) -> Result<Option<Item>, StoreError> {
    let row: Option<ItemRow> =
        sqlx::query_as("SELECT id, sku, name, unit, created_at FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(exec)
            .await
            .map_err(|e| map_sqlx_error("fetch_item", e))?;
    Ok(row.map(Into::into))
}

async fn user_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: UserId,
) -> Result<Option<User>, StoreError> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, username, display_name, roles, created_at FROM users WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(exec)
    .await
    .map_err(|e| map_sqlx_error("fetch_user", e))?;
    Ok(row.map(Into::into))
}

async fn asset_by_id<'e, E: PgExecutor<'e>>(
    exec: E,
    id: AssetId,
) -> Result<Option<Asset>, StoreError> {
    let row: Option<AssetRow> = sqlx::query_as(
        "SELECT id, tag, item_id, condition, current_location, created_at FROM assets WHERE id = $1",
    )
    .bind(id.as_uuid())
    .fetch_optional(exec)
    .await
    .map_err(|e| map_sqlx_error("fetch_asset", e))?;
    row.map(TryInto::try_into).transpose()
}

async fn slip_by_id(pool: &PgPool, id: SlipId) -> Result<Option<Slip>, StoreError> {
    let header: Option<SlipRow> = sqlx::query_as(
        r#"
        SELECT
            id, slip_no, slip_type, property_id, from_location, to_location,
            department_id, requested_by, issued_by, received_by, created_at
        FROM slips
        WHERE id = $1
        "#,
    )
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await
    .map_err(|e| map_sqlx_error("fetch_slip", e))?;

    let Some(header) = header else {
        return Ok(None);
    };

    let line_rows: Vec<SlipLineRow> = sqlx::query_as(
        r#"
        SELECT line_no, item_id, quantity, asset_id, new_condition, condition_at_move
        FROM slip_lines
        WHERE slip_id = $1
        ORDER BY line_no ASC
        "#,
    )
    .bind(id.as_uuid())
    .fetch_all(pool)
    .await
    .map_err(|e| map_sqlx_error("fetch_slip_lines", e))?;

    let signature_row: SignatureRow = sqlx::query_as(
        "SELECT signed_by_name, signed_by_user, method FROM signatures WHERE slip_id = $1",
    )
    .bind(id.as_uuid())
    .fetch_one(pool)
    .await
    .map_err(|e| map_sqlx_error("fetch_signature", e))?;

    let lines = line_rows
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<SlipLine>, _>>()?;

    Ok(Some(Slip {
        id: header.id.into(),
        slip_no: header.slip_no,
        slip_type: SlipType::parse(&header.slip_type).map_err(|e| decode_err("slip type", e))?,
        property: header.property_id.into(),
        from_location: header.from_location.into(),
        to_location: header.to_location.into(),
        department: header.department_id.into(),
        requested_by: header.requested_by.map(Into::into),
        issued_by: header.issued_by.map(Into::into),
        received_by: header.received_by.map(Into::into),
        created_at: header.created_at,
        lines,
        signature: signature_row.try_into()?,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Store impl
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl InventoryStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn fetch_slip(&self, id: SlipId) -> Result<Option<Slip>, StoreError> {
        slip_by_id(&self.pool, id).await
    }

    async fn fetch_property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        property_by_id(&*self.pool, id).await
    }

    async fn fetch_location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        location_by_id(&*self.pool, id).await
    }

    async fn fetch_department(&self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        department_by_id(&*self.pool, id).await
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        item_by_id(&*self.pool, id).await
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        user_by_id(&*self.pool, id).await
    }

    async fn fetch_asset(&self, id: AssetId) -> Result<Option<Asset>, StoreError> {
        asset_by_id(&*self.pool, id).await
    }

    #[instrument(skip(self), fields(query = %query, limit), err)]
    async fn search_assets(&self, query: &str, limit: u32) -> Result<Vec<Asset>, StoreError> {
        let pattern = format!("%{query}%");
        let rows: Vec<AssetRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.tag, a.item_id, a.condition, a.current_location, a.created_at
            FROM assets a
            JOIN items i ON i.id = a.item_id
            WHERE a.tag ILIKE $1 OR i.name ILIKE $1
            ORDER BY a.tag ASC
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_assets", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn fetch_balance(
        &self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError> {
        let row: Option<BalanceRow> = sqlx::query_as(
            r#"
            SELECT item_id, location_id, qty_on_hand, updated_at
            FROM stock_balances
            WHERE item_id = $1 AND location_id = $2
            "#,
        )
        .bind(item.as_uuid())
        .bind(location.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_balance", e))?;
        Ok(row.map(Into::into))
    }

    async fn movements_for_slip(&self, slip: SlipId) -> Result<Vec<MovementLog>, StoreError> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, slip_id, item_id, asset_id, from_location, to_location, delta, occurred_at
            FROM movement_logs
            WHERE slip_id = $1
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(slip.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("movements_for_slip", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn audit_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEvent>, StoreError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, entity_type, entity_id, action, old_value, new_value, actor, occurred_at
            FROM audit_events
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("audit_for_entity", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction impl
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl StoreTx for PostgresTx {
    async fn property(&mut self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        property_by_id(&mut *self.tx, id).await
    }

    async fn location(&mut self, id: LocationId) -> Result<Option<Location>, StoreError> {
        location_by_id(&mut *self.tx, id).await
    }

    async fn department(&mut self, id: DepartmentId) -> Result<Option<Department>, StoreError> {
        department_by_id(&mut *self.tx, id).await
    }

    async fn item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError> {
        item_by_id(&mut *self.tx, id).await
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        user_by_id(&mut *self.tx, id).await
    }

    async fn asset(&mut self, id: AssetId) -> Result<Option<Asset>, StoreError> {
        asset_by_id(&mut *self.tx, id).await
    }

    async fn balance_for_update(
        &mut self,
        item: ItemId,
        location: LocationId,
    ) -> Result<Option<StockBalance>, StoreError> {
        let row: Option<BalanceRow> = sqlx::query_as(
            r#"
            SELECT item_id, location_id, qty_on_hand, updated_at
            FROM stock_balances
            WHERE item_id = $1 AND location_id = $2
            FOR UPDATE
            "#,
        )
        .bind(item.as_uuid())
        .bind(location.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("balance_for_update", e))?;
        Ok(row.map(Into::into))
    }

    async fn upsert_balance(&mut self, balance: &StockBalance) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_balances (item_id, location_id, qty_on_hand, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (item_id, location_id)
            DO UPDATE SET qty_on_hand = EXCLUDED.qty_on_hand, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(balance.item.as_uuid())
        .bind(balance.location.as_uuid())
        .bind(balance.qty_on_hand)
        .bind(balance.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_balance", e))?;
        Ok(())
    }

    async fn update_asset(&mut self, asset: &Asset) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE assets SET condition = $2, current_location = $3 WHERE id = $1",
        )
        .bind(asset.id.as_uuid())
        .bind(asset.condition.as_str())
        .bind(asset.current_location.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_asset", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Constraint(format!(
                "asset {} does not exist",
                asset.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, slip), fields(slip_id = %slip.id, slip_no = %slip.slip_no), err)]
    async fn insert_slip(&mut self, slip: &Slip) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO slips (
                id, slip_no, slip_type, property_id, from_location, to_location,
                department_id, requested_by, issued_by, received_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(slip.id.as_uuid())
        .bind(&slip.slip_no)
        .bind(slip.slip_type.as_str())
        .bind(slip.property.as_uuid())
        .bind(slip.from_location.as_uuid())
        .bind(slip.to_location.as_uuid())
        .bind(slip.department.as_uuid())
        .bind(slip.requested_by.map(|u| *u.as_uuid()))
        .bind(slip.issued_by.map(|u| *u.as_uuid()))
        .bind(slip.received_by.map(|u| *u.as_uuid()))
        .bind(slip.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("slip_no '{}' already exists", slip.slip_no))
            } else {
                map_sqlx_error("insert_slip", e)
            }
        })?;

        for line in &slip.lines {
            let (item_id, quantity, asset_id, new_condition) = match &line.kind {
                LineKind::Stock { item, quantity } => {
                    (Some(*item.as_uuid()), Some(quantity.as_decimal()), None, None)
                }
                LineKind::Asset {
                    asset,
                    new_condition,
                } => (
                    None,
                    None,
                    Some(*asset.as_uuid()),
                    new_condition.map(|c| c.as_str()),
                ),
            };

            sqlx::query(
                r#"
                INSERT INTO slip_lines (
                    slip_id, line_no, item_id, quantity, asset_id, new_condition, condition_at_move
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(slip.id.as_uuid())
            .bind(line.line_no as i32)
            .bind(item_id)
            .bind(quantity)
            .bind(asset_id)
            .bind(new_condition)
            .bind(line.condition_at_move.map(|c| c.as_str()))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_slip_line", e))?;
        }

        sqlx::query(
            r#"
            INSERT INTO signatures (slip_id, signed_by_name, signed_by_user, method)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(slip.id.as_uuid())
        .bind(&slip.signature.signed_by_name)
        .bind(slip.signature.signed_by_user.map(|u| *u.as_uuid()))
        .bind(slip.signature.method.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_signature", e))?;

        Ok(())
    }

    async fn append_movement(&mut self, movement: &MovementLog) -> Result<(), StoreError> {
        let (item_id, asset_id) = match movement.subject {
            MovementSubject::Item(item) => (Some(*item.as_uuid()), None),
            MovementSubject::Asset(asset) => (None, Some(*asset.as_uuid())),
        };

        sqlx::query(
            r#"
            INSERT INTO movement_logs (
                id, slip_id, item_id, asset_id, from_location, to_location, delta, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.slip.map(|s| *s.as_uuid()))
        .bind(item_id)
        .bind(asset_id)
        .bind(movement.from_location.map(|l| *l.as_uuid()))
        .bind(movement.to_location.map(|l| *l.as_uuid()))
        .bind(movement.delta)
        .bind(movement.occurred_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("append_movement", e))?;
        Ok(())
    }

    async fn append_audit(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                id, entity_type, entity_id, action, old_value, new_value, actor, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.entity_type)
        .bind(&event.entity_id)
        .bind(event.action.as_str())
        .bind(event.old_value.clone())
        .bind(event.new_value.clone())
        .bind(event.actor.as_uuid())
        .bind(event.occurred_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("append_audit", e))?;
        Ok(())
    }

    async fn insert_property(&mut self, property: &Property) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO properties (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(property.id.as_uuid())
            .bind(&property.name)
            .bind(property.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_property", e))?;
        Ok(())
    }

    async fn insert_location(&mut self, location: &Location) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO locations (id, property_id, name, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(location.id.as_uuid())
        .bind(location.property.as_uuid())
        .bind(&location.name)
        .bind(location.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_location", e))?;
        Ok(())
    }

    async fn insert_department(&mut self, department: &Department) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO departments (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(department.id.as_uuid())
            .bind(&department.name)
            .bind(department.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_department", e))?;
        Ok(())
    }

    async fn insert_item(&mut self, item: &Item) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO items (id, sku, name, unit, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(item.id.as_uuid())
            .bind(&item.sku)
            .bind(&item.name)
            .bind(&item.unit)
            .bind(item.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_item", e))?;
        Ok(())
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), StoreError> {
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, display_name, roles, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&roles)
        .bind(user.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn insert_asset(&mut self, asset: &Asset) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, tag, item_id, condition, current_location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(asset.id.as_uuid())
        .bind(&asset.tag)
        .bind(asset.item.as_uuid())
        .bind(asset.condition.as_str())
        .bind(asset.current_location.as_uuid())
        .bind(asset.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_asset", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

impl core::fmt::Debug for PostgresTx {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresTx").finish_non_exhaustive()
    }
}
