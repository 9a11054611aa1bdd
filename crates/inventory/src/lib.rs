//! Stock and asset domain: balances, conditions, movement records.
//!
//! Everything here is deterministic domain logic (no IO, no HTTP, no
//! storage). The infra crate drives these rules inside transactions.

pub mod asset;
pub mod balance;
pub mod movement;

pub use asset::{Asset, AssetCondition, AssetNotMovable};
pub use balance::{InsufficientStock, StockBalance};
pub use movement::{MovementLog, MovementSubject};
