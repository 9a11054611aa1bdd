use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wareflow_core::{
    AssetId, DepartmentId, DomainError, DomainResult, ItemId, LocationId, PropertyId, Qty, UserId,
};
use wareflow_inventory::AssetCondition;

use crate::slip::{LineKind, Signature, SignatureMethod, SlipType};

/// A requested slip, as submitted by the caller.
///
/// Identifiers are unresolved at this stage; the engine resolves them against
/// the store inside the creating transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipRequest {
    pub slip_no: String,
    pub slip_type: SlipType,
    pub property: PropertyId,
    pub from_location: LocationId,
    pub to_location: LocationId,
    pub department: DepartmentId,
    pub requested_by: Option<UserId>,
    pub issued_by: Option<UserId>,
    pub received_by: Option<UserId>,
    pub lines: Vec<SlipLineRequest>,
    pub signature: SignatureRequest,
}

/// A requested line: loosely-typed payload fields, tightened by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipLineRequest {
    pub item: Option<ItemId>,
    pub quantity: Option<Decimal>,
    pub asset: Option<AssetId>,
    pub new_condition: Option<AssetCondition>,
}

/// Signature payload, taken verbatim from the capture UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub signed_by_name: String,
    pub signed_by_user: Option<UserId>,
    pub method: SignatureMethod,
}

/// Structurally valid slip content, ready for resolution and application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipDraft {
    pub lines: Vec<LineKind>,
    pub signature: Signature,
}

impl SlipRequest {
    /// Structural validation (shape only; no data access).
    ///
    /// - the slip number must be non-blank
    /// - at least one line is required
    /// - each line must carry exactly one of {item+quantity, asset}
    /// - quantities must be positive
    /// - `new_condition` is an asset-line field, and only for issue/return
    /// - the signature must carry a non-blank name
    pub fn validate(&self) -> DomainResult<SlipDraft> {
        if self.slip_no.trim().is_empty() {
            return Err(DomainError::validation("slip_no cannot be empty"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("slip must have at least one line"));
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for (idx, line) in self.lines.iter().enumerate() {
            let line_no = idx + 1;
            lines.push(self.validate_line(line, line_no)?);
        }

        if self.signature.signed_by_name.trim().is_empty() {
            return Err(DomainError::validation("signature requires a signer name"));
        }

        Ok(SlipDraft {
            lines,
            signature: Signature {
                signed_by_name: self.signature.signed_by_name.clone(),
                signed_by_user: self.signature.signed_by_user,
                method: self.signature.method,
            },
        })
    }

    fn validate_line(&self, line: &SlipLineRequest, line_no: usize) -> DomainResult<LineKind> {
        match (line.item, line.asset) {
            (Some(_), Some(_)) => Err(DomainError::validation(format!(
                "line {line_no}: specify either an item or an asset, not both"
            ))),
            (None, None) => Err(DomainError::validation(format!(
                "line {line_no}: specify an item with quantity or an asset"
            ))),
            (Some(item), None) => {
                if line.new_condition.is_some() {
                    return Err(DomainError::validation(format!(
                        "line {line_no}: new_condition applies to asset lines only"
                    )));
                }
                let quantity = line.quantity.ok_or_else(|| {
                    DomainError::validation(format!("line {line_no}: item lines require a quantity"))
                })?;
                let quantity = Qty::new(quantity).map_err(|_| {
                    DomainError::validation(format!("line {line_no}: quantity must be positive"))
                })?;
                Ok(LineKind::Stock { item, quantity })
            }
            (None, Some(asset)) => {
                if line.quantity.is_some() {
                    return Err(DomainError::validation(format!(
                        "line {line_no}: asset lines do not carry a quantity"
                    )));
                }
                if line.new_condition.is_some() && self.slip_type == SlipType::Transfer {
                    return Err(DomainError::validation(format!(
                        "line {line_no}: transfers do not change asset condition"
                    )));
                }
                Ok(LineKind::Asset {
                    asset,
                    new_condition: line.new_condition,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_line(qty: i64) -> SlipLineRequest {
        SlipLineRequest {
            item: Some(ItemId::new()),
            quantity: Some(Decimal::from(qty)),
            asset: None,
            new_condition: None,
        }
    }

    fn asset_line() -> SlipLineRequest {
        SlipLineRequest {
            item: None,
            quantity: None,
            asset: Some(AssetId::new()),
            new_condition: None,
        }
    }

    fn request(slip_type: SlipType, lines: Vec<SlipLineRequest>) -> SlipRequest {
        SlipRequest {
            slip_no: "ISS-0001".to_string(),
            slip_type,
            property: PropertyId::new(),
            from_location: LocationId::new(),
            to_location: LocationId::new(),
            department: DepartmentId::new(),
            requested_by: None,
            issued_by: None,
            received_by: None,
            lines,
            signature: SignatureRequest {
                signed_by_name: "A. Signer".to_string(),
                signed_by_user: None,
                method: SignatureMethod::Typed,
            },
        }
    }

    #[test]
    fn valid_mixed_request_produces_typed_lines() {
        let req = request(SlipType::Issue, vec![stock_line(4), asset_line()]);
        let draft = req.validate().unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert!(matches!(draft.lines[0], LineKind::Stock { .. }));
        assert!(matches!(draft.lines[1], LineKind::Asset { .. }));
    }

    #[test]
    fn empty_lines_are_rejected() {
        let req = request(SlipType::Issue, vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_slip_no_is_rejected() {
        let mut req = request(SlipType::Issue, vec![stock_line(1)]);
        req.slip_no = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn line_with_both_payloads_is_rejected() {
        let mut line = stock_line(2);
        line.asset = Some(AssetId::new());
        let req = request(SlipType::Issue, vec![line]);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn line_with_neither_payload_is_rejected() {
        let line = SlipLineRequest {
            item: None,
            quantity: None,
            asset: None,
            new_condition: None,
        };
        let req = request(SlipType::Issue, vec![line]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn item_line_without_quantity_is_rejected() {
        let mut line = stock_line(1);
        line.quantity = None;
        let req = request(SlipType::Issue, vec![line]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_or_negative_quantity_is_rejected() {
        for qty in [0, -3] {
            let req = request(SlipType::Issue, vec![stock_line(qty)]);
            assert!(req.validate().is_err());
        }
    }

    #[test]
    fn asset_line_with_quantity_is_rejected() {
        let mut line = asset_line();
        line.quantity = Some(Decimal::from(1));
        let req = request(SlipType::Issue, vec![line]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn new_condition_on_transfer_is_rejected() {
        let mut line = asset_line();
        line.new_condition = Some(AssetCondition::Poor);
        let req = request(SlipType::Transfer, vec![line]);
        assert!(req.validate().is_err());

        // The same line is fine on a return.
        let mut line = asset_line();
        line.new_condition = Some(AssetCondition::Poor);
        let req = request(SlipType::Return, vec![line]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn new_condition_on_stock_line_is_rejected() {
        let mut line = stock_line(1);
        line.new_condition = Some(AssetCondition::Fair);
        let req = request(SlipType::Return, vec![line]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_signer_name_is_rejected() {
        let mut req = request(SlipType::Issue, vec![stock_line(1)]);
        req.signature.signed_by_name = "".to_string();
        assert!(req.validate().is_err());
    }
}
