//! `wareflow-infra` — persistence and orchestration.
//!
//! Domain crates stay pure; this crate composes them with storage: the
//! transactional store traits (with in-memory and Postgres backends), the
//! stock ledger adjust operation, the slip engine, and the master-data
//! service.

pub mod masterdata;
pub mod slip_engine;
pub mod stock_ledger;
pub mod store;

mod integration_tests;

pub use masterdata::MasterData;
pub use slip_engine::{EngineError, SlipEngine};
pub use store::{InMemoryStore, InventoryStore, PostgresStore, StoreError, StoreTx};
