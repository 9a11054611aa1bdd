//! Stock ledger: the single read-modify-write site for balance rows.
//!
//! Every quantity change — issue, return, either leg of a transfer — goes
//! through [`adjust`]. The non-negativity check lives in
//! [`StockBalance::apply_delta`], so it is enforced unconditionally at every
//! call site regardless of slip type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use wareflow_core::{ItemId, LocationId};
use wareflow_inventory::StockBalance;

use crate::slip_engine::EngineError;
use crate::store::StoreTx;

/// Apply a signed delta to the `(item, location)` balance inside `tx`.
///
/// Reads the row under an exclusive lock (absent row → zero), applies the
/// delta with exact decimal arithmetic, and upserts the result. A delta that
/// would drive the balance negative fails with
/// [`EngineError::InsufficientStock`]; the caller must abandon the whole
/// transaction — partial application is never possible because nothing was
/// written.
pub async fn adjust(
    tx: &mut dyn StoreTx,
    item: ItemId,
    location: LocationId,
    delta: Decimal,
    at: DateTime<Utc>,
) -> Result<StockBalance, EngineError> {
    let current = tx
        .balance_for_update(item, location)
        .await?
        .unwrap_or_else(|| StockBalance::opening(item, location, at));

    let next = current.apply_delta(delta, at)?;
    tx.upsert_balance(&next).await?;

    tracing::debug!(
        item = %item,
        location = %location,
        delta = %delta,
        qty_on_hand = %next.qty_on_hand,
        "stock adjusted"
    );

    Ok(next)
}
