//! tests/company_tests.rs
//! Progreso del onboarding y estadísticas de la empresa.

#[cfg(test)]
mod tests {
    use crate::errors::ApiError;
    use crate::models::company_model::OnboardingProgress;
    use crate::models::stock_model::{MovementReason, MovementType};
    use crate::models::warehouse_model::WarehouseRequest;
    use crate::tests::common::{fixture, register, test_services};

    #[actix_rt::test]
    async fn progress_without_company() {
        let services = test_services().await;
        let account = register(&services, "solo@example.com").await;

        match services.company_service.onboarding_progress(&account).await.unwrap() {
            OnboardingProgress::NoCompany {
                completed,
                has_company,
                message,
            } => {
                assert_eq!(completed, 0.0);
                assert!(!has_company);
                assert_eq!(message, "Please complete company setup first");
            }
            other => panic!("progreso inesperado: {:?}", other),
        }

        match services.company_service.complete_onboarding(&account).await {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Cannot complete onboarding without a company")
            }
            other => panic!("completar sin empresa: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn progress_counts_the_five_steps() {
        let fx = fixture().await;
        let companies = &fx.services.company_service;

        // el setup deja categoría y plantilla; el fixture suma vendedor y lector
        match companies.onboarding_progress(&fx.admin).await.unwrap() {
            OnboardingProgress::InProgress {
                completed,
                has_company,
                company_id,
                steps,
                onboarding_completed,
            } => {
                assert_eq!(completed, 60.0);
                assert!(has_company);
                assert_eq!(company_id, fx.company_id);
                assert!(steps.create_category && steps.create_template && steps.invite_team);
                assert!(!steps.create_product && !steps.add_stock);
                assert!(!onboarding_completed);
            }
            other => panic!("progreso inesperado: {:?}", other),
        }

        let product = fx.product("SKU-1", 1_000, 0.0).await;
        match companies.onboarding_progress(&fx.admin).await.unwrap() {
            OnboardingProgress::InProgress { completed, .. } => assert_eq!(completed, 80.0),
            other => panic!("progreso inesperado: {:?}", other),
        }

        fx.move_stock(product.id, fx.warehouse_id, MovementType::In, 1.0, MovementReason::Purchase)
            .await;
        let resp = companies.complete_onboarding(&fx.admin).await.unwrap();
        assert!(resp.onboarding_completed);
        assert_eq!(resp.message, "Onboarding completed successfully");

        let admin = fx
            .services
            .account_service
            .find_by_id(fx.admin.id)
            .await
            .unwrap()
            .unwrap();
        match companies.onboarding_progress(&admin).await.unwrap() {
            OnboardingProgress::InProgress {
                completed,
                steps,
                onboarding_completed,
                ..
            } => {
                assert_eq!(completed, 100.0);
                assert_eq!(steps.completed_count(), 5);
                assert!(onboarding_completed);
            }
            other => panic!("progreso inesperado: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn stats_value_stock_at_cost() {
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
            .unwrap();

        let a = fx.product("SKU-A", 1_000, 2.0).await;
        let b = fx.product("SKU-B", 2_000, 10.0).await;
        fx.move_stock(a.id, fx.warehouse_id, MovementType::In, 5.0, MovementReason::Purchase)
            .await;
        fx.move_stock(b.id, branch.id, MovementType::In, 1.5, MovementReason::Purchase)
            .await;

        let stats = fx.services.company_service.stats(fx.company_id).await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_warehouses, 2);
        assert_eq!(stats.total_categories, 1);
        assert_eq!(stats.total_templates, 1);
        assert_eq!(stats.low_stock_products, 1);
        // 5 * 1000 + 1.5 * 2000
        assert_eq!(stats.total_stock_value, 8_000.0);
    }
}
