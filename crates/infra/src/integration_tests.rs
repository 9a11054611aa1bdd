//! Integration tests for the full slip pipeline.
//!
//! Tests: SlipRequest → SlipEngine → store → balances/movements/audit
//!
//! Verifies:
//! - Balances never go negative; overdraws fail with InsufficientStock
//! - Scrapped/under-maintenance assets cannot be issued
//! - Multi-line failures leave zero observable effects (atomicity)
//! - Every committed slip has exactly one CREATE audit event
//! - Committed slips read back identically

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use wareflow_auth::{Principal, PrincipalId, Role};
    use wareflow_core::{AssetId, DepartmentId, ItemId, LocationId, PropertyId};
    use wareflow_inventory::AssetCondition;
    use wareflow_slips::{
        SignatureMethod, SignatureRequest, SlipLineRequest, SlipRequest, SlipType,
    };

    use crate::masterdata::MasterData;
    use crate::slip_engine::{EngineError, SlipEngine};
    use crate::store::{InMemoryStore, InventoryStore};

    struct Harness {
        engine: SlipEngine<Arc<InMemoryStore>>,
        masterdata: MasterData<Arc<InMemoryStore>>,
        store: Arc<InMemoryStore>,
        admin: Principal,
        storekeeper: Principal,
        clerk: Principal,
        property: PropertyId,
        location_a: LocationId,
        location_b: LocationId,
        department: DepartmentId,
    }

    async fn setup() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let engine = SlipEngine::new(store.clone());
        let masterdata = MasterData::new(store.clone());

        let admin = Principal::resolve(PrincipalId::new(), vec![Role::new("admin")]);
        let storekeeper = Principal::resolve(PrincipalId::new(), vec![Role::new("storekeeper")]);
        let clerk = Principal::resolve(PrincipalId::new(), vec![Role::new("clerk")]);

        let property = masterdata
            .create_property(&admin, "Main Campus")
            .await
            .unwrap()
            .id;
        let location_a = masterdata
            .create_location(&admin, property, "Storeroom A")
            .await
            .unwrap()
            .id;
        let location_b = masterdata
            .create_location(&admin, property, "Storeroom B")
            .await
            .unwrap()
            .id;
        let department = masterdata
            .create_department(&admin, "Maintenance")
            .await
            .unwrap()
            .id;

        Harness {
            engine,
            masterdata,
            store,
            admin,
            storekeeper,
            clerk,
            property,
            location_a,
            location_b,
            department,
        }
    }

    impl Harness {
        async fn new_item(&self, sku: &str) -> ItemId {
            self.masterdata
                .create_item(&self.admin, sku, sku, "pcs")
                .await
                .unwrap()
                .id
        }

        async fn new_asset(&self, tag: &str, condition: AssetCondition) -> AssetId {
            let item = self.new_item(&format!("AST-{tag}")).await;
            self.masterdata
                .register_asset(&self.admin, tag, item, condition, self.location_a)
                .await
                .unwrap()
                .id
        }

        fn request(
            &self,
            slip_no: &str,
            slip_type: SlipType,
            lines: Vec<SlipLineRequest>,
        ) -> SlipRequest {
            SlipRequest {
                slip_no: slip_no.to_string(),
                slip_type,
                property: self.property,
                from_location: self.location_a,
                to_location: self.location_b,
                department: self.department,
                requested_by: None,
                issued_by: None,
                received_by: None,
                lines,
                signature: SignatureRequest {
                    signed_by_name: "S. Keeper".to_string(),
                    signed_by_user: None,
                    method: SignatureMethod::Typed,
                },
            }
        }

        /// Seed `qty` of `item` into `location` through a return slip.
        async fn seed_stock(&self, slip_no: &str, item: ItemId, location: LocationId, qty: i64) {
            let mut req = self.request(slip_no, SlipType::Return, vec![stock_line(item, qty)]);
            req.to_location = location;
            self.engine
                .create_slip(&self.storekeeper, req)
                .await
                .unwrap();
        }

        async fn balance(&self, item: ItemId, location: LocationId) -> Option<Decimal> {
            self.store
                .fetch_balance(item, location)
                .await
                .unwrap()
                .map(|b| b.qty_on_hand)
        }
    }

    fn stock_line(item: ItemId, qty: i64) -> SlipLineRequest {
        SlipLineRequest {
            item: Some(item),
            quantity: Some(Decimal::from(qty)),
            asset: None,
            new_condition: None,
        }
    }

    fn asset_line(asset: AssetId) -> SlipLineRequest {
        SlipLineRequest {
            item: None,
            quantity: None,
            asset: Some(asset),
            new_condition: None,
        }
    }

    #[tokio::test]
    async fn issue_reduces_balance_and_logs_movement() {
        let h = setup().await;
        let item = h.new_item("WIRE-01").await;
        h.seed_stock("RET-0001", item, h.location_a, 10).await;

        let slip = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0001", SlipType::Issue, vec![stock_line(item, 4)]),
            )
            .await
            .unwrap();

        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(6)));

        let movements = h.store.movements_for_slip(slip.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].delta, Some(Decimal::from(-4)));
        assert_eq!(movements[0].from_location, Some(h.location_a));
    }

    #[tokio::test]
    async fn overdraw_fails_and_leaves_balance_unchanged() {
        let h = setup().await;
        let item = h.new_item("GLOVE-01").await;
        h.seed_stock("RET-0002", item, h.location_a, 3).await;

        let err = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0002", SlipType::Issue, vec![stock_line(item, 5)]),
            )
            .await
            .unwrap_err();

        match err {
            EngineError::InsufficientStock(e) => {
                assert_eq!(e.item, item);
                assert_eq!(e.location, h.location_a);
                assert_eq!(e.on_hand, Decimal::from(3));
                assert_eq!(e.requested, Decimal::from(-5));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(3)));

        // The slip number was not consumed: the same number commits cleanly
        // once the quantity fits, proving nothing partial was persisted.
        h.engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0002", SlipType::Issue, vec![stock_line(item, 2)]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn scrapped_asset_cannot_be_issued() {
        let h = setup().await;
        let asset = h.new_asset("T-001", AssetCondition::Scrap).await;

        let err = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0003", SlipType::Issue, vec![asset_line(asset)]),
            )
            .await
            .unwrap_err();

        match err {
            EngineError::AssetNotMovable(e) => {
                assert_eq!(e.asset, asset);
                assert_eq!(e.condition, AssetCondition::Scrap);
            }
            other => panic!("expected AssetNotMovable, got {other:?}"),
        }

        // Location untouched.
        let stored = h.store.fetch_asset(asset).await.unwrap().unwrap();
        assert_eq!(stored.current_location, h.location_a);
    }

    #[tokio::test]
    async fn under_maintenance_asset_cannot_be_issued_but_transfers() {
        let h = setup().await;
        let asset = h.new_asset("T-002", AssetCondition::UnderMaintenance).await;

        let err = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0004", SlipType::Issue, vec![asset_line(asset)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetNotMovable(_)));

        // The guard gates only issue-type movement.
        h.engine
            .create_slip(
                &h.storekeeper,
                h.request("TRF-0001", SlipType::Transfer, vec![asset_line(asset)]),
            )
            .await
            .unwrap();
        let stored = h.store.fetch_asset(asset).await.unwrap().unwrap();
        assert_eq!(stored.current_location, h.location_b);
    }

    #[tokio::test]
    async fn transfer_moves_stock_between_locations() {
        let h = setup().await;
        let item = h.new_item("HOSE-01").await;
        h.seed_stock("RET-0003", item, h.location_a, 5).await;

        let slip = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("TRF-0002", SlipType::Transfer, vec![stock_line(item, 2)]),
            )
            .await
            .unwrap();

        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(3)));
        assert_eq!(h.balance(item, h.location_b).await, Some(Decimal::from(2)));

        // One movement row per location.
        let movements = h.store.movements_for_slip(slip.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        let out = movements
            .iter()
            .find(|m| m.delta == Some(Decimal::from(-2)))
            .unwrap();
        assert_eq!(out.from_location, Some(h.location_a));
        let inbound = movements
            .iter()
            .find(|m| m.delta == Some(Decimal::from(2)))
            .unwrap();
        assert_eq!(inbound.to_location, Some(h.location_b));
    }

    #[tokio::test]
    async fn return_creates_missing_balance_row() {
        let h = setup().await;
        let item = h.new_item("SOAP-01").await;
        assert_eq!(h.balance(item, h.location_a).await, None);

        h.seed_stock("RET-0004", item, h.location_a, 6).await;

        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(6)));
    }

    #[tokio::test]
    async fn failing_line_rolls_back_whole_slip() {
        let h = setup().await;
        let item = h.new_item("PAINT-01").await;
        h.seed_stock("RET-0005", item, h.location_a, 10).await;

        let err = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request(
                    "ISS-0005",
                    SlipType::Issue,
                    vec![stock_line(item, 4), stock_line(item, 99)],
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock(_)));

        // The first line's subtraction did not survive.
        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(10)));

        // And the slip number is still free.
        h.engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0005", SlipType::Issue, vec![stock_line(item, 1)]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn committed_slip_has_exactly_one_create_audit_event() {
        let h = setup().await;
        let item = h.new_item("TAPE-01").await;
        h.seed_stock("RET-0006", item, h.location_a, 8).await;

        let slip = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request(
                    "ISS-0006",
                    SlipType::Issue,
                    vec![stock_line(item, 2), stock_line(item, 3)],
                ),
            )
            .await
            .unwrap();

        let audits = h
            .store
            .audit_for_entity("slip", &slip.id.to_string())
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, wareflow_audit::AuditAction::Create);
        assert!(audits[0].old_value.is_none());
        assert!(audits[0].new_value.is_some());
        assert_eq!(audits[0].actor, h.storekeeper.principal_id);

        // Movement count covers every effectful line.
        let movements = h.store.movements_for_slip(slip.id).await.unwrap();
        assert!(movements.len() >= slip.lines.len());
    }

    #[tokio::test]
    async fn committed_slip_reads_back_identically() {
        let h = setup().await;
        let item = h.new_item("ROPE-01").await;
        let asset = h.new_asset("T-010", AssetCondition::Good).await;
        h.seed_stock("RET-0007", item, h.location_a, 5).await;

        let requester = h
            .masterdata
            .create_user(&h.admin, "jdoe", "J. Doe", vec![Role::new("clerk")])
            .await
            .unwrap()
            .id;

        let mut req = h.request(
            "ISS-0007",
            SlipType::Issue,
            vec![stock_line(item, 2), asset_line(asset)],
        );
        req.requested_by = Some(requester);
        req.signature.signed_by_user = Some(requester);

        let created = h.engine.create_slip(&h.storekeeper, req).await.unwrap();
        let fetched = h.store.fetch_slip(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.lines.len(), 2);
        assert_eq!(
            fetched.lines[1].condition_at_move,
            Some(AssetCondition::Good)
        );
    }

    #[tokio::test]
    async fn issued_asset_moves_and_snapshots_condition() {
        let h = setup().await;
        let asset = h.new_asset("T-020", AssetCondition::Fair).await;

        let mut line = asset_line(asset);
        line.new_condition = Some(AssetCondition::Poor);
        let slip = h
            .engine
            .create_slip(&h.storekeeper, h.request("ISS-0008", SlipType::Issue, vec![line]))
            .await
            .unwrap();

        // Snapshot holds the condition observed at guard time, not the new one.
        assert_eq!(slip.lines[0].condition_at_move, Some(AssetCondition::Fair));

        let stored = h.store.fetch_asset(asset).await.unwrap().unwrap();
        assert_eq!(stored.current_location, h.location_b);
        assert_eq!(stored.condition, AssetCondition::Poor);

        // The asset mutation itself is audited alongside the slip.
        let audits = h
            .store
            .audit_for_entity("asset", &asset.to_string())
            .await
            .unwrap();
        assert!(audits
            .iter()
            .any(|e| e.action == wareflow_audit::AuditAction::Update));
    }

    #[tokio::test]
    async fn clerk_cannot_create_slips() {
        let h = setup().await;
        let item = h.new_item("PEN-01").await;
        h.seed_stock("RET-0008", item, h.location_a, 5).await;

        let err = h
            .engine
            .create_slip(
                &h.clerk,
                h.request("ISS-0009", SlipType::Issue, vec![stock_line(item, 1)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Permission));

        assert_eq!(h.balance(item, h.location_a).await, Some(Decimal::from(5)));
    }

    #[tokio::test]
    async fn duplicate_slip_no_conflicts() {
        let h = setup().await;
        let item = h.new_item("CLIP-01").await;
        h.seed_stock("RET-0009", item, h.location_a, 10).await;

        let req = h.request("ISS-0010", SlipType::Issue, vec![stock_line(item, 1)]);
        h.engine
            .create_slip(&h.storekeeper, req.clone())
            .await
            .unwrap();

        let err = h.engine.create_slip(&h.storekeeper, req).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_references_fail_with_not_found() {
        let h = setup().await;
        let item = h.new_item("SAW-01").await;

        let mut req = h.request("ISS-0011", SlipType::Issue, vec![stock_line(item, 1)]);
        req.property = PropertyId::new();
        let err = h.engine.create_slip(&h.storekeeper, req).await.unwrap_err();
        match err {
            EngineError::NotFound { kind, .. } => assert_eq!(kind, "property"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        let req = h.request(
            "ISS-0012",
            SlipType::Issue,
            vec![stock_line(ItemId::new(), 1)],
        );
        let err = h.engine.create_slip(&h.storekeeper, req).await.unwrap_err();
        match err {
            EngineError::NotFound { kind, .. } => assert_eq!(kind, "item"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn structurally_invalid_request_is_rejected_before_any_effect() {
        let h = setup().await;
        let err = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0013", SlipType::Issue, vec![]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_issues_never_overdraw() {
        let h = setup().await;
        let item = h.new_item("BULB-01").await;
        h.seed_stock("RET-0010", item, h.location_a, 10).await;

        let first = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0014", SlipType::Issue, vec![stock_line(item, 6)]),
            );
        let second = h
            .engine
            .create_slip(
                &h.storekeeper,
                h.request("ISS-0015", SlipType::Issue, vec![stock_line(item, 7)]),
            );

        let (a, b) = tokio::join!(first, second);
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of the competing issues commits");

        let failed = if a.is_err() { a } else { b };
        assert!(matches!(
            failed.unwrap_err(),
            EngineError::InsufficientStock(_)
        ));

        let remaining = h.balance(item, h.location_a).await.unwrap();
        assert!(remaining >= Decimal::ZERO);
        assert!(remaining == Decimal::from(4) || remaining == Decimal::from(3));
    }

    #[tokio::test]
    async fn asset_search_matches_tag_and_name_ordered() {
        let h = setup().await;
        let item = h.new_item("Drill Press").await;
        for tag in ["DP-002", "DP-001", "DP-003"] {
            h.masterdata
                .register_asset(&h.admin, tag, item, AssetCondition::Good, h.location_a)
                .await
                .unwrap();
        }

        let by_tag = h.store.search_assets("dp-00", 50).await.unwrap();
        assert_eq!(by_tag.len(), 3);
        let tags: Vec<&str> = by_tag.iter().map(|a| a.tag.as_str()).collect();
        assert_eq!(tags, vec!["DP-001", "DP-002", "DP-003"]);

        let by_name = h.store.search_assets("drill", 2).await.unwrap();
        assert_eq!(by_name.len(), 2);
    }
}
