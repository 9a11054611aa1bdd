use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wareflow_core::{
    AssetId, DepartmentId, DomainError, DomainResult, Entity, ItemId, LocationId, PropertyId, Qty,
    SlipId, UserId,
};
use wareflow_inventory::AssetCondition;

/// Slip type: the direction of the movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipType {
    /// Outbound from inventory custody (subtracts at the source location).
    Issue,
    /// Inbound to inventory custody (adds at the destination location).
    Return,
    /// Between locations (subtracts at source, adds at destination).
    Transfer,
}

impl SlipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlipType::Issue => "issue",
            SlipType::Return => "return",
            SlipType::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "issue" => Ok(SlipType::Issue),
            "return" => Ok(SlipType::Return),
            "transfer" => Ok(SlipType::Transfer),
            other => Err(DomainError::validation(format!("unknown slip type '{other}'"))),
        }
    }
}

impl core::fmt::Display for SlipType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the signature was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMethod {
    Typed,
    Drawn,
    Other,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::Typed => "typed",
            SignatureMethod::Drawn => "drawn",
            SignatureMethod::Other => "other",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "typed" => Ok(SignatureMethod::Typed),
            "drawn" => Ok(SignatureMethod::Drawn),
            "other" => Ok(SignatureMethod::Other),
            unknown => Err(DomainError::validation(format!(
                "unknown signature method '{unknown}'"
            ))),
        }
    }
}

/// The signature attached to a slip (exactly one per slip).
///
/// Captured verbatim from the signature UI; no authenticity check beyond the
/// required presence of a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub signed_by_name: String,
    pub signed_by_user: Option<UserId>,
    pub method: SignatureMethod,
}

/// Line content: fungible stock xor one specific asset.
///
/// Modeled as a tagged variant rather than nullable fields checked ad hoc; a
/// request line with both or neither payload is rejected at validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Stock { item: ItemId, quantity: Qty },
    Asset {
        asset: AssetId,
        /// Replacement condition on issue/return lines (e.g. returned damaged).
        new_condition: Option<AssetCondition>,
    },
}

/// One line of a slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipLine {
    /// 1-based position in request order.
    pub line_no: u32,
    pub kind: LineKind,
    /// Snapshot of the asset's condition at the moment of the movement,
    /// independent of the asset's later condition. `None` for stock lines.
    pub condition_at_move: Option<AssetCondition>,
}

/// A committed slip: header + ordered lines + signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slip {
    pub id: SlipId,
    /// Human-readable sequence number, generated externally, unique.
    pub slip_no: String,
    pub slip_type: SlipType,
    pub property: PropertyId,
    pub from_location: LocationId,
    pub to_location: LocationId,
    pub department: DepartmentId,
    pub requested_by: Option<UserId>,
    pub issued_by: Option<UserId>,
    pub received_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SlipLine>,
    pub signature: Signature,
}

impl Entity for Slip {
    type Id = SlipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
