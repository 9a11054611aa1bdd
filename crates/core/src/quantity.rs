//! Exact-decimal quantity value object.
//!
//! Stock quantities are decimals (e.g. 2.5 kg of welding wire), never floats.
//! All ledger arithmetic goes through `rust_decimal::Decimal`, which is exact
//! for the scales used here (NUMERIC(19,4) in storage).

use core::str::FromStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A strictly positive movement quantity.
///
/// Slip lines carry `Qty`; signed ledger deltas are plain `Decimal` computed
/// from the slip type (issue subtracts, return adds).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qty(Decimal);

impl Qty {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Qty {}

impl core::fmt::Display for Qty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Qty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s)
            .map_err(|e| DomainError::validation(format!("invalid quantity: {e}")))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Qty {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
