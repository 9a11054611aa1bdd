//! Append-only audit trail domain.
//!
//! Every mutation to a tracked entity — slips, assets, master data — produces
//! one before/after snapshot, written inside the same transaction as the
//! mutation it documents. A rolled-back transaction leaves no audit trace.

pub mod event;

pub use event::{AuditAction, AuditEvent};
