//! Slip document domain.
//!
//! A slip is a single authorized inventory movement document (issue, return,
//! or transfer) with one or more lines and exactly one signature. Slips are
//! immutable once created; there is no update path.

pub mod request;
pub mod slip;

pub use request::{SignatureRequest, SlipDraft, SlipLineRequest, SlipRequest};
pub use slip::{LineKind, Signature, SignatureMethod, Slip, SlipLine, SlipType};
