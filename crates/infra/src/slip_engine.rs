//! Slip execution pipeline (application-level orchestration).
//!
//! `SlipEngine` turns a requested slip into a committed, auditable change to
//! inventory state. The pipeline is linear, with no retries:
//!
//! ```text
//! SlipRequest
//!   ↓
//! 1. Authorize (permission check, before any data access)
//!   ↓
//! 2. Structural validation (typed lines, signature presence)
//!   ↓
//! 3. Open unit of work
//!   ↓
//! 4. Resolve references (property, locations, department, users)
//!   ↓
//! 5. Per line, in request order: guard → ledger/asset effect → movement log
//!   ↓
//! 6. Persist slip + lines + signature
//!   ↓
//! 7. Audit event for the slip CREATE
//!   ↓
//! 8. Commit
//! ```
//!
//! Any failure in steps 4–8 drops the transaction: no lines, balance changes,
//! movement logs, or audit events survive, so callers can retry the same
//! request after fixing the reported error.

use chrono::Utc;
use thiserror::Error;

use wareflow_audit::AuditEvent;
use wareflow_auth::{Permission, Principal, authorize};
use wareflow_core::{DomainError, SlipId, UserId};
use wareflow_inventory::{AssetNotMovable, InsufficientStock, MovementLog};
use wareflow_slips::{LineKind, Slip, SlipLine, SlipRequest, SlipType};

use crate::stock_ledger;
use crate::store::{InventoryStore, StoreError, StoreTx};

/// Slip execution error.
///
/// Carries enough structured detail (kind + offending identifiers) for a
/// precise user-facing message — except `Permission`, which is deliberately
/// generic so authorization failures never leak entity existence.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller lacks a required permission. Generic on purpose.
    #[error("forbidden")]
    Permission,

    /// Malformed/incomplete request (missing line, ambiguous line, missing
    /// header field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A delta would drive a balance negative. Business rule violation, not a
    /// system fault.
    #[error(transparent)]
    InsufficientStock(#[from] InsufficientStock),

    /// Asset condition forbids the requested movement.
    #[error(transparent)]
    AssetNotMovable(#[from] AssetNotMovable),

    /// Unique-constraint or concurrent-commit conflict (e.g. duplicate
    /// slip_no). Safe to retry after inspection.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Opaque system failure; the whole operation may be retried because
    /// nothing partial was committed.
    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => EngineError::Conflict(msg),
            other => EngineError::Store(other),
        }
    }
}

impl From<DomainError> for EngineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                EngineError::Validation(msg)
            }
            DomainError::InvariantViolation(msg) => EngineError::Validation(msg),
            DomainError::Conflict(msg) => EngineError::Conflict(msg),
            DomainError::Unauthorized => EngineError::Permission,
            DomainError::NotFound => EngineError::not_found("entity", "unknown"),
        }
    }
}

/// Orchestrates slip creation against a transactional store.
///
/// Generic over the store so tests run against [`crate::InMemoryStore`] and
/// production against [`crate::PostgresStore`] without changing domain code.
#[derive(Debug)]
pub struct SlipEngine<S> {
    store: S,
}

impl<S> SlipEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> SlipEngine<S>
where
    S: InventoryStore,
{
    /// Create a slip: validate, apply every line's effect, record movements,
    /// persist the document and its signature, audit, commit.
    ///
    /// Line order matters only for which failing line is reported first; the
    /// outcome is all-or-nothing regardless.
    pub async fn create_slip(
        &self,
        principal: &Principal,
        request: SlipRequest,
    ) -> Result<Slip, EngineError> {
        // 1) Authorize before touching any data.
        authorize(principal, &Permission::new("slips.create"))
            .map_err(|_| EngineError::Permission)?;

        // 2) Structural validation (no data access).
        let draft = request.validate()?;

        // 3) One unit of work for everything that follows.
        let mut tx = self.store.begin().await?;

        // 4) Resolve header references.
        tx.property(request.property)
            .await?
            .ok_or_else(|| EngineError::not_found("property", request.property))?;
        tx.location(request.from_location)
            .await?
            .ok_or_else(|| EngineError::not_found("location", request.from_location))?;
        tx.location(request.to_location)
            .await?
            .ok_or_else(|| EngineError::not_found("location", request.to_location))?;
        tx.department(request.department)
            .await?
            .ok_or_else(|| EngineError::not_found("department", request.department))?;
        for user in [request.requested_by, request.issued_by, request.received_by]
            .into_iter()
            .flatten()
        {
            resolve_user(tx.as_mut(), user).await?;
        }

        let now = Utc::now();
        let slip_id = SlipId::new();
        let mut lines = Vec::with_capacity(draft.lines.len());

        // 5) Apply lines in request order.
        for (idx, kind) in draft.lines.iter().enumerate() {
            let line_no = (idx + 1) as u32;
            let line = self
                .apply_line(tx.as_mut(), principal, &request, slip_id, line_no, kind)
                .await?;
            lines.push(line);
        }

        // 6) Persist the document.
        let slip = Slip {
            id: slip_id,
            slip_no: request.slip_no.clone(),
            slip_type: request.slip_type,
            property: request.property,
            from_location: request.from_location,
            to_location: request.to_location,
            department: request.department,
            requested_by: request.requested_by,
            issued_by: request.issued_by,
            received_by: request.received_by,
            created_at: now,
            lines,
            signature: draft.signature,
        };
        tx.insert_slip(&slip).await?;

        // 7) Exactly one audit event for the slip itself.
        tx.append_audit(&AuditEvent::create(
            "slip",
            slip.id.to_string(),
            &slip,
            principal.principal_id,
            now,
        )?)
        .await?;

        // 8) Commit; any earlier failure dropped the transaction.
        tx.commit().await?;

        tracing::info!(
            slip_id = %slip.id,
            slip_no = %slip.slip_no,
            slip_type = %slip.slip_type,
            lines = slip.lines.len(),
            "slip committed"
        );

        Ok(slip)
    }

    async fn apply_line(
        &self,
        tx: &mut dyn StoreTx,
        principal: &Principal,
        request: &SlipRequest,
        slip_id: SlipId,
        line_no: u32,
        kind: &LineKind,
    ) -> Result<SlipLine, EngineError> {
        let now = Utc::now();

        match kind {
            LineKind::Stock { item, quantity } => {
                tx.item(*item)
                    .await?
                    .ok_or_else(|| EngineError::not_found("item", item))?;

                let qty = quantity.as_decimal();
                match request.slip_type {
                    SlipType::Issue => {
                        stock_ledger::adjust(tx, *item, request.from_location, -qty, now).await?;
                        tx.append_movement(&MovementLog::stock(
                            Some(slip_id),
                            *item,
                            Some(request.from_location),
                            Some(request.to_location),
                            -qty,
                            now,
                        ))
                        .await?;
                    }
                    SlipType::Return => {
                        stock_ledger::adjust(tx, *item, request.to_location, qty, now).await?;
                        tx.append_movement(&MovementLog::stock(
                            Some(slip_id),
                            *item,
                            Some(request.from_location),
                            Some(request.to_location),
                            qty,
                            now,
                        ))
                        .await?;
                    }
                    SlipType::Transfer => {
                        // Two ledger calls, each guarded independently; one
                        // movement row per location.
                        stock_ledger::adjust(tx, *item, request.from_location, -qty, now).await?;
                        stock_ledger::adjust(tx, *item, request.to_location, qty, now).await?;
                        tx.append_movement(&MovementLog::stock(
                            Some(slip_id),
                            *item,
                            Some(request.from_location),
                            None,
                            -qty,
                            now,
                        ))
                        .await?;
                        tx.append_movement(&MovementLog::stock(
                            Some(slip_id),
                            *item,
                            None,
                            Some(request.to_location),
                            qty,
                            now,
                        ))
                        .await?;
                    }
                }

                Ok(SlipLine {
                    line_no,
                    kind: kind.clone(),
                    condition_at_move: None,
                })
            }
            LineKind::Asset {
                asset,
                new_condition,
            } => {
                let current = tx
                    .asset(*asset)
                    .await?
                    .ok_or_else(|| EngineError::not_found("asset", asset))?;

                // Guard outbound movement; the condition observed here is the
                // `condition_at_move` snapshot, taken before anything else in
                // this transaction can change the asset.
                if request.slip_type == SlipType::Issue {
                    current.check_issuable()?;
                }
                let condition_at_move = current.condition;

                let moved = current.moved_to(request.to_location, *new_condition);
                tx.update_asset(&moved).await?;
                tx.append_audit(&AuditEvent::update(
                    "asset",
                    moved.id.to_string(),
                    &current,
                    &moved,
                    principal.principal_id,
                    now,
                )?)
                .await?;
                tx.append_movement(&MovementLog::asset(
                    Some(slip_id),
                    *asset,
                    Some(current.current_location),
                    Some(request.to_location),
                    now,
                ))
                .await?;

                Ok(SlipLine {
                    line_no,
                    kind: kind.clone(),
                    condition_at_move: Some(condition_at_move),
                })
            }
        }
    }
}

async fn resolve_user(tx: &mut dyn StoreTx, user: UserId) -> Result<(), EngineError> {
    tx.user(user)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::not_found("user", user))
}
