//! tests/stock_tests.rs

#[cfg(test)]
mod tests {
    use crate::errors::ApiError;
    use crate::models::common_model::PageRequest;
    use crate::models::product_model::DateRangeQuery;
    use crate::models::stock_model::{
        AdjustmentRequest, CreateMovementRequest, MovementFilters, MovementReason, MovementType,
        ReconcileResponse, StockRecordFilters,
    };
    use crate::models::warehouse_model::WarehouseRequest;
    use crate::services::stock_service::{format_quantity, MAX_RECENT_HOURS};
    use crate::tests::common::{company_fixture, fixture, fixture_with_pool, test_services, Fixture};

    const FIRST_PAGE: PageRequest = PageRequest {
        page: 1,
        page_size: 50,
    };

    async fn second_warehouse(fx: &Fixture, name: &str) -> i64 {
        fx.services
            .warehouse_service
            .create_warehouse(
                fx.company_id,
                WarehouseRequest {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn quantity_at(fx: &Fixture, product_id: i64, warehouse_id: i64) -> f64 {
        fx.services
            .stock_service
            .records_for_product(product_id)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.warehouse == warehouse_id)
            .map(|r| r.current_quantity)
            .unwrap_or(0.0)
    }

    fn field_message(err: ApiError, field: &str) -> String {
        match err {
            ApiError::Validation(errors) => errors
                .into_iter()
                .find(|e| e.field == field)
                .map(|e| e.message)
                .unwrap_or_else(|| panic!("sin error para {}", field)),
            other => panic!("se esperaba validación, llegó {:?}", other),
        }
    }

    #[test]
    fn quantities_print_with_one_decimal_when_integral() {
        assert_eq!(format_quantity(10.0), "10.0");
        assert_eq!(format_quantity(0.0), "0.0");
        assert_eq!(format_quantity(2.5), "2.5");
    }

    #[actix_rt::test]
    async fn in_and_out_update_balance() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;

        let entry = fx
            .move_stock(product.id, fx.warehouse_id, MovementType::In, 10.0, MovementReason::Purchase)
            .await;
        assert_eq!(entry.resulting_balance, 10.0);
        assert_eq!(entry.account, fx.admin.id);

        let exit = fx
            .move_stock(product.id, fx.warehouse_id, MovementType::Out, 3.5, MovementReason::Sale)
            .await;
        assert_eq!(exit.resulting_balance, 6.5);
        assert_eq!(quantity_at(&fx, product.id, fx.warehouse_id).await, 6.5);

        let row = fx
            .services
            .product_service
            .get_product_row(fx.company_id, product.id)
            .await
            .unwrap();
        assert_eq!(row.total_stock, 6.5);
    }

    #[actix_rt::test]
    async fn out_without_enough_stock_is_rejected_and_leaves_no_trace() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 5.0, MovementReason::Purchase)
            .await;

        let err = fx
            .services
            .stock_service
            .create_movement(
                &fx.seller,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(product.id),
                    warehouse: Some(fx.warehouse_id),
                    movement_type: Some(MovementType::Out),
                    quantity: Some(8.0),
                    reason: Some(MovementReason::Sale),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(field_message(err, "quantity"), "Insufficient stock. Available: 5.0");

        assert_eq!(quantity_at(&fx, product.id, fx.warehouse_id).await, 5.0);
        let movements = fx
            .services
            .stock_service
            .list_movements(fx.company_id, &MovementFilters::default(), FIRST_PAGE)
            .await
            .unwrap();
        assert_eq!(movements.total, 1);
    }

    #[actix_rt::test]
    async fn movement_validation_collects_field_errors() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;

        let err = fx
            .services
            .stock_service
            .create_movement(
                &fx.admin,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(product.id),
                    warehouse: Some(9_999),
                    movement_type: Some(MovementType::Transfer),
                    quantity: Some(0.001),
                    unit_cost: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(errors) => {
                let message = |field: &str| {
                    errors
                        .iter()
                        .find(|e| e.field == field)
                        .map(|e| e.message.clone())
                };
                assert_eq!(
                    message("warehouse").as_deref(),
                    Some("Invalid pk \"9999\" - object does not exist.")
                );
                assert_eq!(message("reason").as_deref(), Some("This field is required."));
                assert!(message("quantity").is_some());
                assert!(message("unit_cost").is_some());
                assert_eq!(
                    message("to_warehouse").as_deref(),
                    Some("Transfer movements require destination warehouse")
                );
                assert!(message("product").is_none());
            }
            other => panic!("se esperaba validación, llegó {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn foreign_company_resources_are_rejected() {
        let fx = fixture().await;
        let other = company_fixture(fx.services.clone(), "globex").await;
        let foreign_product = other.product("SKU-X", 500, 0.0).await;

        let err = fx
            .services
            .stock_service
            .create_movement(
                &fx.admin,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(foreign_product.id),
                    warehouse: Some(other.warehouse_id),
                    movement_type: Some(MovementType::In),
                    quantity: Some(1.0),
                    reason: Some(MovementReason::Purchase),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "product"
                    && e.message == "Product must belong to your company"));
                assert!(errors.iter().any(|e| e.field == "warehouse"
                    && e.message == "Warehouse must belong to your company"));
            }
            other => panic!("se esperaba validación, llegó {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn transfer_moves_quantity_between_warehouses() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        let branch = second_warehouse(&fx, "Sucursal Norte").await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 10.0, MovementReason::Purchase)
            .await;

        let transfer = fx
            .services
            .stock_service
            .create_movement(
                &fx.admin,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(product.id),
                    warehouse: Some(fx.warehouse_id),
                    movement_type: Some(MovementType::Transfer),
                    quantity: Some(4.0),
                    reason: Some(MovementReason::Transfer),
                    to_warehouse: Some(branch),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(transfer.movement_type, MovementType::Transfer);
        assert_eq!(transfer.resulting_balance, 6.0);
        assert_eq!(transfer.from_warehouse, Some(fx.warehouse_id));
        assert_eq!(transfer.to_warehouse, Some(branch));
        assert_eq!(transfer.to_warehouse_name.as_deref(), Some("Sucursal Norte"));

        // el total del producto se conserva
        assert_eq!(quantity_at(&fx, product.id, fx.warehouse_id).await, 6.0);
        assert_eq!(quantity_at(&fx, product.id, branch).await, 4.0);

        let incoming = fx
            .services
            .stock_service
            .list_movements(
                fx.company_id,
                &MovementFilters {
                    warehouse: Some(branch),
                    ..Default::default()
                },
                FIRST_PAGE,
            )
            .await
            .unwrap();
        assert_eq!(incoming.total, 1);
        let entry = &incoming.items[0];
        assert_eq!(entry.movement_type, MovementType::In);
        assert_eq!(entry.reason, MovementReason::Transfer);
        assert_eq!(entry.quantity, 4.0);
        assert!(entry.notes.starts_with("Transfer from "));

        // destino igual al origen
        let err = fx
            .services
            .stock_service
            .create_movement(
                &fx.admin,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(product.id),
                    warehouse: Some(branch),
                    movement_type: Some(MovementType::Transfer),
                    quantity: Some(1.0),
                    reason: Some(MovementReason::Transfer),
                    to_warehouse: Some(branch),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            field_message(err, "to_warehouse"),
            "Destination must be different from origin"
        );
    }

    #[actix_rt::test]
    async fn adjustment_sets_absolute_quantity() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 10.0, MovementReason::Purchase)
            .await;

        let adjust = |new_quantity: f64, notes: Option<&str>| AdjustmentRequest {
            product: Some(product.id),
            warehouse: Some(fx.warehouse_id),
            new_quantity: Some(new_quantity),
            notes: notes.map(str::to_string),
        };

        let movement = fx
            .services
            .stock_service
            .create_adjustment(&fx.admin, fx.company_id, adjust(4.0, Some("conteo anual")))
            .await
            .unwrap();
        assert_eq!(movement.movement_type, MovementType::Out);
        assert_eq!(movement.reason, MovementReason::Adjustment);
        assert_eq!(movement.quantity, 6.0);
        assert_eq!(movement.notes, "Adjustment: conteo anual (from 10.0 to 4.0)");
        assert_eq!(quantity_at(&fx, product.id, fx.warehouse_id).await, 4.0);

        let err = fx
            .services
            .stock_service
            .create_adjustment(&fx.admin, fx.company_id, adjust(4.0, Some("otra vez")))
            .await
            .unwrap_err();
        assert_eq!(
            field_message(err, "new_quantity"),
            "New quantity is the same as current quantity"
        );

        let err = fx
            .services
            .stock_service
            .create_adjustment(&fx.admin, fx.company_id, adjust(7.0, None))
            .await
            .unwrap_err();
        assert_eq!(field_message(err, "notes"), "This field is required.");

        let up = fx
            .services
            .stock_service
            .create_adjustment(&fx.admin, fx.company_id, adjust(7.5, Some("hallazgo")))
            .await
            .unwrap();
        assert_eq!(up.movement_type, MovementType::In);
        assert_eq!(up.quantity, 3.5);
    }

    #[actix_rt::test]
    async fn reconcile_rebuilds_quantity_from_history() {
        let db_pool = crate::database::setup_memory_database().await.unwrap();
        let services = crate::app::AppServices::new(db_pool.clone(), crate::tests::common::test_config());
        let fx = company_fixture(services, "acme").await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 10.0, MovementReason::Purchase)
            .await;
        let exit = fx
            .move_stock(product.id, fx.warehouse_id, MovementType::Out, 3.0, MovementReason::Sale)
            .await;

        let correct = fx
            .services
            .stock_service
            .reconcile(fx.company_id, exit.stock_record)
            .await
            .unwrap();
        assert!(matches!(correct, ReconcileResponse::AlreadyCorrect { reconciled: false, .. }));

        sqlx::query("UPDATE stock_records SET current_quantity = 2 WHERE id = ?")
            .bind(exit.stock_record)
            .execute(&db_pool)
            .await
            .unwrap();

        match fx
            .services
            .stock_service
            .reconcile(fx.company_id, exit.stock_record)
            .await
            .unwrap()
        {
            ReconcileResponse::Reconciled {
                reconciled,
                old_quantity,
                new_quantity,
                difference,
            } => {
                assert!(reconciled);
                assert_eq!(old_quantity, 2.0);
                assert_eq!(new_quantity, 7.0);
                assert_eq!(difference, 5.0);
            }
            other => panic!("se esperaba reconciliación: {:?}", other),
        }
        assert_eq!(quantity_at(&fx, product.id, fx.warehouse_id).await, 7.0);
    }

    #[actix_rt::test]
    async fn records_and_movements_are_scoped_by_company() {
        let fx = fixture().await;
        let other = company_fixture(fx.services.clone(), "globex").await;
        let product = other.product("SKU-X", 500, 0.0).await;
        let movement = other
            .move_stock(product.id, other.warehouse_id, MovementType::In, 2.0, MovementReason::Purchase)
            .await;

        let records = fx
            .services
            .stock_service
            .list_records(fx.company_id, &StockRecordFilters::default(), FIRST_PAGE)
            .await
            .unwrap();
        assert_eq!(records.total, 0);

        assert!(matches!(
            fx.services.stock_service.get_movement(fx.company_id, movement.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            fx.services.stock_service.get_record(fx.company_id, movement.stock_record).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(fx
            .services
            .stock_service
            .get_movement(other.company_id, movement.id)
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn summary_counts_by_type_and_reason() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        let branch = second_warehouse(&fx, "Sucursal Norte").await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 10.0, MovementReason::Purchase)
            .await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::Out, 2.0, MovementReason::Sale)
            .await;
        fx.services
            .stock_service
            .create_movement(
                &fx.admin,
                fx.company_id,
                CreateMovementRequest {
                    product: Some(product.id),
                    warehouse: Some(fx.warehouse_id),
                    movement_type: Some(MovementType::Transfer),
                    quantity: Some(3.0),
                    reason: Some(MovementReason::Transfer),
                    to_warehouse: Some(branch),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let summary = fx
            .services
            .stock_service
            .summary(fx.company_id, &DateRangeQuery::default())
            .await
            .unwrap();
        // la transferencia anota dos filas: salida en origen y entrada en destino
        assert_eq!(summary.total_movements, 4);
        assert_eq!(summary.by_type[&MovementType::In], 2);
        assert_eq!(summary.by_type[&MovementType::Out], 1);
        assert_eq!(summary.by_type[&MovementType::Transfer], 1);
        assert_eq!(summary.by_reason[&MovementReason::Transfer], 2);
        assert_eq!(summary.by_reason[&MovementReason::Loss], 0);
        assert_eq!(summary.total_in, 13.0);
        assert_eq!(summary.total_out, 2.0);
        assert_eq!(summary.total_transfers, 1);

        let future = fx
            .services
            .stock_service
            .summary(
                fx.company_id,
                &DateRangeQuery {
                    date_from: Some("2999-01-01".to_string()),
                    date_to: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(future.total_movements, 0);
    }

    #[actix_rt::test]
    async fn stock_details_show_latest_movements() {
        let fx = fixture().await;
        let product = fx.product("SKU-1", 1_000, 20.0).await;
        let mut ids = Vec::new();
        for _ in 0..12 {
            let movement = fx
                .move_stock(product.id, fx.warehouse_id, MovementType::In, 1.0, MovementReason::Purchase)
                .await;
            ids.push(movement.id);
        }

        let details = fx
            .services
            .product_service
            .stock_details(fx.company_id, product.id)
            .await
            .unwrap();
        assert_eq!(details.total_stock, 12.0);
        assert!(details.is_below_minimum);
        assert_eq!(details.stock_by_warehouse.len(), 1);
        assert_eq!(details.stock_by_warehouse[0].current_quantity, 12.0);

        let recent: Vec<i64> = details.recent_movements.iter().map(|m| m.id).collect();
        let expected: Vec<i64> = ids.iter().rev().take(10).copied().collect();
        assert_eq!(recent, expected);
    }

    #[actix_rt::test]
    async fn movement_history_filters_by_date() {
        let (fx, db_pool) = fixture_with_pool().await;
        let product = fx.product("SKU-1", 1_000, 0.0).await;
        let old = fx
            .move_stock(product.id, fx.warehouse_id, MovementType::In, 5.0, MovementReason::Purchase)
            .await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::Out, 1.0, MovementReason::Sale)
            .await;
        fx.move_stock(product.id, fx.warehouse_id, MovementType::Out, 2.0, MovementReason::Sale)
            .await;

        sqlx::query("UPDATE stock_movements SET created_at = ? WHERE id = ?")
            .bind("2020-01-15T10:00:00.000000Z")
            .bind(old.id)
            .execute(&db_pool)
            .await
            .unwrap();

        let history = |date_from: Option<&str>, date_to: Option<&str>| {
            let services = fx.services.clone();
            let range = DateRangeQuery {
                date_from: date_from.map(str::to_string),
                date_to: date_to.map(str::to_string),
            };
            let (company_id, product_id) = (fx.company_id, product.id);
            async move {
                services
                    .product_service
                    .movement_history(company_id, product_id, range, FIRST_PAGE)
                    .await
                    .unwrap()
            }
        };

        let all = history(None, None).await;
        assert_eq!(all.total, 3);
        // más recientes primero
        assert_eq!(all.items.last().map(|m| m.id), Some(old.id));
        assert!(all.items[0].id > all.items[1].id);

        let before = history(None, Some("2020-12-31")).await;
        assert_eq!(before.total, 1);
        assert_eq!(before.items[0].id, old.id);

        let after = history(Some("2021-01-01"), None).await;
        assert_eq!(after.total, 2);
        assert!(after.items.iter().all(|m| m.movement_type == MovementType::Out));

        let err = fx
            .services
            .product_service
            .movement_history(
                fx.company_id,
                product.id,
                DateRangeQuery {
                    date_from: Some("ayer".to_string()),
                    date_to: None,
                },
                FIRST_PAGE,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_rt::test]
    async fn export_lists_active_products_with_stock() {
        let fx = fixture().await;
        let a = fx.product("SKU-A", 1_000, 0.0).await;
        fx.product("SKU-B", 2_000, 0.0).await;
        let gone = fx.product("SKU-Z", 500, 0.0).await;
        fx.move_stock(a.id, fx.warehouse_id, MovementType::In, 3.0, MovementReason::Purchase)
            .await;
        fx.services
            .product_service
            .delete_product(fx.company_id, gone.id)
            .await
            .unwrap();

        let export = fx.services.product_service.export(fx.company_id).await.unwrap();
        assert_eq!(export.count, 2);
        let skus: Vec<&str> = export.products.iter().map(|p| p.product.sku.as_str()).collect();
        assert_eq!(skus, vec!["SKU-A", "SKU-B"]);
        assert_eq!(export.products[0].product.total_stock, 3.0);
        assert_eq!(export.products[0].stock_by_warehouse.len(), 1);
        assert!(!export.exported_at.is_empty());

        let other = company_fixture(fx.services.clone(), "otra").await;
        let empty = other.services.product_service.export(other.company_id).await.unwrap();
        assert_eq!(empty.count, 0);
    }

    #[actix_rt::test]
    async fn recent_requires_positive_window() {
        let services = test_services().await;
        let err = services
            .stock_service
            .recent(1, Some(0), FIRST_PAGE)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_rt::test]
    async fn recent_rejects_oversized_window() {
        let services = test_services().await;
        let err = services
            .stock_service
            .recent(1, Some(10_000_000_000), FIRST_PAGE)
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors[0].field, "hours"),
            other => panic!("unexpected error: {:?}", other),
        }

        let page = services
            .stock_service
            .recent(1, Some(MAX_RECENT_HOURS), FIRST_PAGE)
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
