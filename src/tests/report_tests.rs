//! tests/report_tests.rs

#[cfg(test)]
mod tests {
    use crate::errors::ApiError;
    use crate::models::category_model::CategoryRequest;
    use crate::models::product_model::DateRangeQuery;
    use crate::models::report_model::{TopProductMetric, TopProductsQuery};
    use crate::models::stock_model::{MovementReason, MovementType};
    use crate::models::warehouse_model::WarehouseRequest;
    use crate::tests::common::{company_fixture, fixture, Fixture};

    /// A: 5 u a 1.000 en principal; B: 1 u a 2.000 en sucursal (mínimo 10); C: sin stock.
    async fn stocked_fixture() -> (Fixture, i64) {
        let fx = fixture().await;
        let branch = fx
            .services
            .warehouse_service
            .create_warehouse(
                fx.company_id,
                WarehouseRequest {
                    name: Some("Sucursal".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id;

        let a = fx.product("SKU-A", 1_000, 2.0).await;
        let b = fx.product("SKU-B", 2_000, 10.0).await;
        fx.product("SKU-C", 500, 0.0).await;

        fx.move_stock(a.id, fx.warehouse_id, MovementType::In, 6.0, MovementReason::Purchase)
            .await;
        fx.move_stock(a.id, fx.warehouse_id, MovementType::Out, 1.0, MovementReason::Sale)
            .await;
        fx.move_stock(b.id, branch, MovementType::In, 1.0, MovementReason::Purchase)
            .await;
        (fx, branch)
    }

    #[actix_rt::test]
    async fn valuation_groups_by_warehouse() {
        let (fx, branch) = stocked_fixture().await;
        let valuation = fx
            .services
            .report_service
            .inventory_valuation(fx.company_id)
            .await
            .unwrap();

        assert_eq!(valuation.total_value, 7_000.0);
        assert_eq!(valuation.total_items, 6.0);
        assert_eq!(valuation.by_warehouse.len(), 2);

        let sucursal = &valuation.by_warehouse["Sucursal"];
        assert_eq!(sucursal.warehouse_id, branch);
        assert_eq!(sucursal.total_value, 2_000.0);
        assert!(valuation
            .by_warehouse
            .values()
            .any(|w| w.warehouse_id == fx.warehouse_id && w.total_items == 5.0));
    }

    #[actix_rt::test]
    async fn alerts_split_low_and_out_of_stock() {
        let (fx, _) = stocked_fixture().await;
        let alerts = fx.services.report_service.stock_alerts(fx.company_id).await.unwrap();

        let skus = |products: &[crate::models::product_model::ProductListItem]| {
            products.iter().map(|p| p.sku.clone()).collect::<Vec<_>>()
        };
        assert_eq!(alerts.low_stock.count, 1);
        assert_eq!(skus(&alerts.low_stock.products), vec!["SKU-B"]);
        assert_eq!(alerts.out_of_stock.count, 1);
        assert_eq!(skus(&alerts.out_of_stock.products), vec!["SKU-C"]);
    }

    #[actix_rt::test]
    async fn movement_report_aggregates_history() {
        let (fx, _) = stocked_fixture().await;
        let report = fx
            .services
            .report_service
            .movement_report(fx.company_id, &DateRangeQuery::default())
            .await
            .unwrap();

        assert_eq!(report.total_movements, 3);
        let entries = report
            .by_type
            .iter()
            .find(|t| t.movement_type == MovementType::In)
            .unwrap();
        assert_eq!(entries.count, 2);
        assert_eq!(entries.total_quantity, 7.0);
        assert!(report.by_reason.iter().any(|r| r.reason == MovementReason::Sale && r.count == 1));
        assert_eq!(report.top_products[0].product_sku, "SKU-A");
        assert_eq!(report.top_products[0].total_movements, 2);

        let empty = fx
            .services
            .report_service
            .movement_report(
                fx.company_id,
                &DateRangeQuery {
                    date_from: None,
                    date_to: Some("2000-01-01".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(empty.total_movements, 0);
        assert!(empty.by_type.is_empty());

        assert!(matches!(
            fx.services
                .report_service
                .movement_report(
                    fx.company_id,
                    &DateRangeQuery {
                        date_from: Some("ayer".to_string()),
                        date_to: None,
                    },
                )
                .await,
            Err(ApiError::Validation(_))
        ));
    }

    #[actix_rt::test]
    async fn top_products_by_metric() {
        let (fx, _) = stocked_fixture().await;
        let top = |metric: &str, limit: Option<i64>| TopProductsQuery {
            metric: Some(metric.to_string()),
            limit,
        };

        let by_value = fx
            .services
            .report_service
            .top_products(fx.company_id, &top("stock_value", None))
            .await
            .unwrap();
        assert_eq!(by_value.metric, TopProductMetric::StockValue);
        assert_eq!(by_value.limit, 10);
        let skus: Vec<_> = by_value.products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["SKU-A", "SKU-B", "SKU-C"]);

        let by_price = fx
            .services
            .report_service
            .top_products(fx.company_id, &top("price", Some(0)))
            .await
            .unwrap();
        assert_eq!(by_price.limit, 1);
        assert_eq!(by_price.products[0].sku, "SKU-B");

        match fx
            .services
            .report_service
            .top_products(fx.company_id, &top("popularity", None))
            .await
        {
            Err(ApiError::BadRequest(msg)) => assert!(msg.starts_with("Invalid metric")),
            other => panic!("métrica inválida aceptada: {:?}", other.map(|t| t.limit)),
        }
    }

    #[actix_rt::test]
    async fn category_analysis_orders_by_value() {
        let (fx, _) = stocked_fixture().await;
        fx.services
            .category_service
            .create_category(
                fx.company_id,
                CategoryRequest {
                    name: Some("Vacía".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();

        let analysis = fx
            .services
            .report_service
            .category_analysis(fx.company_id)
            .await
            .unwrap();
        assert_eq!(analysis.categories.len(), 2);
        let first = &analysis.categories[0];
        assert_eq!(first.id, fx.category_id);
        assert_eq!(first.total_products, 3);
        assert_eq!(first.total_stock, 6.0);
        assert_eq!(first.total_value, 7_000.0);
        assert_eq!(analysis.categories[1].total_products, 0);
    }

    #[actix_rt::test]
    async fn reports_ignore_other_companies() {
        let (fx, _) = stocked_fixture().await;
        let other = company_fixture(fx.services.clone(), "globex").await;

        let valuation = other
            .services
            .report_service
            .inventory_valuation(other.company_id)
            .await
            .unwrap();
        assert_eq!(valuation.total_value, 0.0);
        assert!(valuation.by_warehouse.is_empty());

        let alerts = other.services.report_service.stock_alerts(other.company_id).await.unwrap();
        assert_eq!(alerts.out_of_stock.count, 0);
    }
}
