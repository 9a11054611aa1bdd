use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wareflow_core::{ItemId, LocationId};

/// Quantity on hand of one item at one location.
///
/// One row per `(item, location)` pair, created lazily on first movement.
/// The row is read and written only inside the stock ledger's atomic adjust
/// operation; balances are never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    pub item: ItemId,
    pub location: LocationId,
    pub qty_on_hand: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// A delta would drive a balance negative.
///
/// Business rule violation, not a system fault: safe to surface verbatim to
/// the end user, and the enclosing transaction must be aborted.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "insufficient stock for item {item} at location {location}: on hand {on_hand}, requested {requested}"
)]
pub struct InsufficientStock {
    pub item: ItemId,
    pub location: LocationId,
    /// The signed delta that was attempted.
    pub requested: Decimal,
    pub on_hand: Decimal,
}

impl StockBalance {
    /// Zero balance for a pair with no row yet.
    pub fn opening(item: ItemId, location: LocationId, at: DateTime<Utc>) -> Self {
        Self {
            item,
            location,
            qty_on_hand: Decimal::ZERO,
            updated_at: at,
        }
    }

    /// Apply a signed delta, enforcing the non-negativity invariant.
    ///
    /// Exact decimal arithmetic; returns the successor balance without
    /// mutating `self`. Centralizing the check here makes it unconditional at
    /// every call site regardless of slip type.
    pub fn apply_delta(&self, delta: Decimal, at: DateTime<Utc>) -> Result<StockBalance, InsufficientStock> {
        let next = self.qty_on_hand + delta;
        if next < Decimal::ZERO {
            return Err(InsufficientStock {
                item: self.item,
                location: self.location,
                requested: delta,
                on_hand: self.qty_on_hand,
            });
        }
        Ok(StockBalance {
            item: self.item,
            location: self.location,
            qty_on_hand: next,
            updated_at: at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn balance(qty: i64) -> StockBalance {
        StockBalance {
            item: ItemId::new(),
            location: LocationId::new(),
            qty_on_hand: Decimal::from(qty),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn subtracting_within_stock_succeeds() {
        let b = balance(10);
        let next = b.apply_delta(Decimal::from(-4), Utc::now()).unwrap();
        assert_eq!(next.qty_on_hand, Decimal::from(6));
    }

    #[test]
    fn overdraw_fails_and_reports_state() {
        let b = balance(3);
        let err = b.apply_delta(Decimal::from(-5), Utc::now()).unwrap_err();
        assert_eq!(err.on_hand, Decimal::from(3));
        assert_eq!(err.requested, Decimal::from(-5));
        assert_eq!(err.item, b.item);
        assert_eq!(err.location, b.location);
        // The source balance is untouched.
        assert_eq!(b.qty_on_hand, Decimal::from(3));
    }

    #[test]
    fn draining_to_exactly_zero_is_allowed() {
        let b = balance(5);
        let next = b.apply_delta(Decimal::from(-5), Utc::now()).unwrap();
        assert_eq!(next.qty_on_hand, Decimal::ZERO);
    }

    #[test]
    fn fractional_deltas_are_exact() {
        let b = balance(1);
        let next = b
            .apply_delta(Decimal::new(-3, 1), Utc::now()) // -0.3
            .unwrap()
            .apply_delta(Decimal::new(-7, 1), Utc::now()) // -0.7
            .unwrap();
        assert_eq!(next.qty_on_hand, Decimal::ZERO);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of signed deltas, applying only those
        /// that succeed never leaves the balance negative, and a failing
        /// delta never changes the balance.
        #[test]
        fn balance_never_goes_negative(
            deltas in prop::collection::vec(-1_000i64..1_000i64, 1..50)
        ) {
            let mut b = balance(0);
            for d in deltas {
                let delta = Decimal::from(d);
                match b.apply_delta(delta, Utc::now()) {
                    Ok(next) => b = next,
                    Err(err) => {
                        prop_assert_eq!(err.on_hand, b.qty_on_hand);
                        prop_assert!(b.qty_on_hand + delta < Decimal::ZERO);
                    }
                }
                prop_assert!(b.qty_on_hand >= Decimal::ZERO);
            }
        }
    }
}
