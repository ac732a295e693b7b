//! app.rs
//! Servicios compartidos y tabla de rutas de la API.

use actix_web::web;
use sqlx::{Pool, Sqlite};

use crate::config::AppConfig;
use crate::errors::{json_error_handler, path_error_handler, query_error_handler};
use crate::handlers::{
    account_handler, attribute_handler, auth_handler, category_handler, company_handler,
    onboarding_handler, product_handler, report_handler, stock_handler, template_handler,
    warehouse_handler,
};
use crate::services::account_service::AccountService;
use crate::services::attribute_service::AttributeService;
use crate::services::auth_service::AuthService;
use crate::services::category_service::CategoryService;
use crate::services::company_service::CompanyService;
use crate::services::product_service::ProductService;
use crate::services::report_service::ReportService;
use crate::services::stock_service::StockService;
use crate::services::template_service::TemplateService;
use crate::services::warehouse_service::WarehouseService;

/// Todos los servicios de la app, construidos sobre un mismo pool.
#[derive(Clone)]
pub struct AppServices {
    pub config: AppConfig,
    pub account_service: AccountService,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub category_service: CategoryService,
    pub attribute_service: AttributeService,
    pub template_service: TemplateService,
    pub product_service: ProductService,
    pub warehouse_service: WarehouseService,
    pub stock_service: StockService,
    pub report_service: ReportService,
}

impl AppServices {
    pub fn new(db_pool: Pool<Sqlite>, config: AppConfig) -> Self {
        let account_service = AccountService::new(db_pool.clone(), &config);
        let auth_service = AuthService::new(db_pool.clone(), account_service.clone(), &config);
        let template_service = TemplateService::new(db_pool.clone());
        let stock_service = StockService::new(db_pool.clone());
        let product_service = ProductService::new(
            db_pool.clone(),
            template_service.clone(),
            stock_service.clone(),
        );
        let warehouse_service = WarehouseService::new(db_pool.clone(), stock_service.clone());

        AppServices {
            account_service,
            auth_service,
            company_service: CompanyService::new(db_pool.clone()),
            category_service: CategoryService::new(db_pool.clone()),
            attribute_service: AttributeService::new(db_pool.clone()),
            template_service,
            product_service,
            warehouse_service,
            stock_service,
            report_service: ReportService::new(db_pool),
            config,
        }
    }

    /// Registra cada servicio como `web::Data` y los extractores con errores problem+json.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.account_service.clone()))
            .app_data(web::Data::new(self.auth_service.clone()))
            .app_data(web::Data::new(self.company_service.clone()))
            .app_data(web::Data::new(self.category_service.clone()))
            .app_data(web::Data::new(self.attribute_service.clone()))
            .app_data(web::Data::new(self.template_service.clone()))
            .app_data(web::Data::new(self.product_service.clone()))
            .app_data(web::Data::new(self.warehouse_service.clone()))
            .app_data(web::Data::new(self.stock_service.clone()))
            .app_data(web::Data::new(self.report_service.clone()))
            // Aumentar límite para cargas masivas de productos
            .app_data(
                web::JsonConfig::default()
                    .limit(2 * 1024 * 1024)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler));
    }
}

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/login/", web::post().to(auth_handler::login_endpoint))
                    .route("/refresh/", web::post().to(auth_handler::refresh_endpoint))
                    .route("/logout/", web::post().to(auth_handler::logout_endpoint))
                    .route("/verify/", web::get().to(auth_handler::verify_endpoint)),
            )
            .service(
                web::scope("/accounts")
                    .route("/", web::post().to(account_handler::register_endpoint))
                    .service(
                        web::resource("/me/")
                            .route(web::get().to(account_handler::me_endpoint))
                            .route(web::patch().to(account_handler::update_me_endpoint)),
                    )
                    .route(
                        "/set_password/",
                        web::post().to(account_handler::set_password_endpoint),
                    )
                    .service(
                        web::resource("/team/")
                            .route(web::get().to(account_handler::list_team_endpoint))
                            .route(web::post().to(account_handler::create_team_member_endpoint)),
                    ),
            )
            .service(
                web::scope("/onboarding")
                    .route(
                        "/setup-company/",
                        web::post().to(onboarding_handler::setup_company_endpoint),
                    )
                    .route("/progress/", web::get().to(onboarding_handler::progress_endpoint))
                    .route("/complete/", web::post().to(onboarding_handler::complete_endpoint)),
            )
            .service(
                web::scope("/companies")
                    .route("/", web::get().to(company_handler::list_companies_endpoint))
                    .route("/stats/", web::get().to(company_handler::company_stats_endpoint))
                    .route("/{id}/", web::get().to(company_handler::get_company_endpoint)),
            )
            .service(
                web::scope("/categories")
                    .service(
                        web::resource("/")
                            .route(web::get().to(category_handler::list_categories_endpoint))
                            .route(web::post().to(category_handler::create_category_endpoint)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(category_handler::get_category_endpoint))
                            .route(web::put().to(category_handler::replace_category_endpoint))
                            .route(web::patch().to(category_handler::patch_category_endpoint))
                            .route(web::delete().to(category_handler::delete_category_endpoint)),
                    )
                    .route(
                        "/{id}/products/",
                        web::get().to(category_handler::category_products_endpoint),
                    ),
            )
            .service(
                web::scope("/global-attributes")
                    .service(
                        web::resource("/")
                            .route(web::get().to(attribute_handler::list_global_endpoint))
                            .route(web::post().to(attribute_handler::create_global_endpoint)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(attribute_handler::get_global_endpoint))
                            .route(web::put().to(attribute_handler::replace_global_endpoint))
                            .route(web::patch().to(attribute_handler::patch_global_endpoint))
                            .route(web::delete().to(attribute_handler::delete_global_endpoint)),
                    ),
            )
            .service(
                web::scope("/custom-attributes")
                    .service(
                        web::resource("/")
                            .route(web::get().to(attribute_handler::list_custom_endpoint))
                            .route(web::post().to(attribute_handler::create_custom_endpoint)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(attribute_handler::get_custom_endpoint))
                            .route(web::put().to(attribute_handler::replace_custom_endpoint))
                            .route(web::patch().to(attribute_handler::patch_custom_endpoint))
                            .route(web::delete().to(attribute_handler::delete_custom_endpoint)),
                    ),
            )
            .service(
                web::scope("/templates")
                    .service(
                        web::resource("/")
                            .route(web::get().to(template_handler::list_templates_endpoint))
                            .route(web::post().to(template_handler::create_template_endpoint)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(template_handler::get_template_endpoint))
                            .route(web::put().to(template_handler::replace_template_endpoint))
                            .route(web::patch().to(template_handler::patch_template_endpoint))
                            .route(web::delete().to(template_handler::delete_template_endpoint)),
                    )
                    .route(
                        "/{id}/structure/",
                        web::get().to(template_handler::structure_endpoint),
                    )
                    .route(
                        "/{id}/add_attribute/",
                        web::post().to(template_handler::add_attribute_endpoint),
                    )
                    .route(
                        "/{id}/remove_attribute/",
                        web::delete().to(template_handler::remove_attribute_endpoint),
                    )
                    .route(
                        "/{id}/reorder_attributes/",
                        web::patch().to(template_handler::reorder_attributes_endpoint),
                    )
                    .route(
                        "/{id}/products/",
                        web::get().to(template_handler::template_products_endpoint),
                    ),
            )
            .service(
                web::scope("/products")
                    .service(
                        web::resource("/")
                            .route(web::get().to(product_handler::list_products_endpoint))
                            .route(web::post().to(product_handler::create_product_endpoint)),
                    )
                    // Rutas fijas antes de "/{id}/"
                    .route(
                        "/validate-specifications/",
                        web::post().to(product_handler::validate_specifications_endpoint),
                    )
                    .route("/low-stock/", web::get().to(product_handler::low_stock_endpoint))
                    .route(
                        "/out-of-stock/",
                        web::get().to(product_handler::out_of_stock_endpoint),
                    )
                    .route(
                        "/bulk-create/",
                        web::post().to(product_handler::bulk_create_endpoint),
                    )
                    .route("/export/", web::get().to(product_handler::export_endpoint))
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(product_handler::get_product_endpoint))
                            .route(web::put().to(product_handler::replace_product_endpoint))
                            .route(web::patch().to(product_handler::patch_product_endpoint))
                            .route(web::delete().to(product_handler::delete_product_endpoint)),
                    )
                    .route(
                        "/{id}/stock-details/",
                        web::get().to(product_handler::stock_details_endpoint),
                    )
                    .route(
                        "/{id}/movement-history/",
                        web::get().to(product_handler::movement_history_endpoint),
                    ),
            )
            .service(
                web::scope("/warehouses")
                    .service(
                        web::resource("/")
                            .route(web::get().to(warehouse_handler::list_warehouses_endpoint))
                            .route(web::post().to(warehouse_handler::create_warehouse_endpoint)),
                    )
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(warehouse_handler::get_warehouse_endpoint))
                            .route(web::put().to(warehouse_handler::replace_warehouse_endpoint))
                            .route(web::patch().to(warehouse_handler::patch_warehouse_endpoint))
                            .route(web::delete().to(warehouse_handler::delete_warehouse_endpoint)),
                    )
                    .route(
                        "/{id}/inventory/",
                        web::get().to(warehouse_handler::inventory_endpoint),
                    )
                    .route(
                        "/{id}/stats/",
                        web::get().to(warehouse_handler::warehouse_stats_endpoint),
                    )
                    .route(
                        "/{id}/movements/",
                        web::get().to(warehouse_handler::warehouse_movements_endpoint),
                    ),
            )
            .service(
                web::scope("/stock-records")
                    .route("/", web::get().to(stock_handler::list_records_endpoint))
                    .route("/{id}/", web::get().to(stock_handler::get_record_endpoint))
                    .route(
                        "/{id}/reconcile/",
                        web::post().to(stock_handler::reconcile_endpoint),
                    ),
            )
            .service(
                web::scope("/stock-movements")
                    .service(
                        web::resource("/")
                            .route(web::get().to(stock_handler::list_movements_endpoint))
                            .route(web::post().to(stock_handler::create_movement_endpoint)),
                    )
                    .route(
                        "/adjustment/",
                        web::post().to(stock_handler::adjustment_endpoint),
                    )
                    .route("/summary/", web::get().to(stock_handler::summary_endpoint))
                    .route("/recent/", web::get().to(stock_handler::recent_endpoint))
                    .service(
                        web::resource("/{id}/")
                            .route(web::get().to(stock_handler::get_movement_endpoint))
                            .route(web::delete().to(stock_handler::delete_movement_endpoint)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .route(
                        "/inventory_valuation/",
                        web::get().to(report_handler::inventory_valuation_endpoint),
                    )
                    .route(
                        "/stock_alerts/",
                        web::get().to(report_handler::stock_alerts_endpoint),
                    )
                    .route(
                        "/movement_report/",
                        web::get().to(report_handler::movement_report_endpoint),
                    )
                    .route(
                        "/category_analysis/",
                        web::get().to(report_handler::category_analysis_endpoint),
                    )
                    .route(
                        "/top_products/",
                        web::get().to(report_handler::top_products_endpoint),
                    ),
            ),
    );
}
