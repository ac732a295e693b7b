//! tests/common.rs
//! Fixtures compartidos: servicios sobre SQLite en memoria y una empresa ya creada.

use sqlx::{Pool, Sqlite};

use crate::app::AppServices;
use crate::config::AppConfig;
use crate::database::setup_memory_database;
use crate::models::account_model::{Account, CreateTeamMemberRequest, RegisterRequest, Role};
use crate::models::company_model::SetupCompanyRequest;
use crate::models::product_model::{Product, ProductRequest};
use crate::models::stock_model::{CreateMovementRequest, MovementReason, MovementType, StockMovement};

pub const PASSWORD: &str = "s3cret-password";

/// Configuración de pruebas: hash barato y secreto fijo.
pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "test-secret".to_string(),
        password_hash_iterations: 1_000,
        ..AppConfig::default()
    }
}

pub async fn test_services() -> AppServices {
    let db_pool = setup_memory_database()
        .await
        .expect("No se pudo crear la base en memoria");
    AppServices::new(db_pool, test_config())
}

pub struct Fixture {
    pub services: AppServices,
    pub company_id: i64,
    pub admin: Account,
    pub seller: Account,
    pub viewer: Account,
    pub warehouse_id: i64,
    pub category_id: i64,
    pub template_id: i64,
}

pub async fn register(services: &AppServices, email: &str) -> Account {
    services
        .account_service
        .register(RegisterRequest {
            email: Some(email.to_string()),
            password: Some(PASSWORD.to_string()),
            re_password: Some(PASSWORD.to_string()),
        })
        .await
        .expect("register")
}

/// Empresa con admin, vendedor y lector, más los datos por defecto del onboarding.
pub async fn company_fixture(services: AppServices, prefix: &str) -> Fixture {
    let owner = register(&services, &format!("{}-admin@example.com", prefix)).await;
    let setup = services
        .company_service
        .setup_company(
            &owner,
            SetupCompanyRequest {
                company_name: Some(format!("{} SpA", prefix)),
                company_rut: Some(format!("{}-76.123.456-7", prefix)),
            },
        )
        .await
        .expect("setup company");
    let company_id = setup.company.id;

    let admin = services
        .account_service
        .find_by_id(owner.id)
        .await
        .expect("find admin")
        .expect("admin exists");

    let mut members = Vec::new();
    for role in [Role::Seller, Role::Viewer] {
        let member = services
            .account_service
            .create_team_member(
                company_id,
                CreateTeamMemberRequest {
                    email: Some(format!("{}-{}@example.com", prefix, role)),
                    password: Some(PASSWORD.to_string()),
                    role: Some(role),
                },
            )
            .await
            .expect("team member");
        members.push(member);
    }
    let viewer = members.pop().expect("viewer");
    let seller = members.pop().expect("seller");

    Fixture {
        services,
        company_id,
        admin,
        seller,
        viewer,
        warehouse_id: setup.warehouse.id,
        category_id: setup.defaults.category,
        template_id: setup.defaults.template,
    }
}

pub async fn fixture() -> Fixture {
    company_fixture(test_services().await, "acme").await
}

/// Como `fixture`, con acceso directo a la base para preparar datos a mano.
pub async fn fixture_with_pool() -> (Fixture, Pool<Sqlite>) {
    let db_pool = setup_memory_database()
        .await
        .expect("No se pudo crear la base en memoria");
    let services = AppServices::new(db_pool.clone(), test_config());
    (company_fixture(services, "acme").await, db_pool)
}

impl Fixture {
    pub async fn product(&self, sku: &str, cost: i64, minimum_stock: f64) -> Product {
        self.services
            .product_service
            .create_product(
                self.company_id,
                ProductRequest {
                    name: Some(format!("Producto {}", sku)),
                    sku: Some(sku.to_string()),
                    price: Some(cost * 2),
                    cost: Some(cost),
                    category: Some(self.category_id),
                    template: Some(self.template_id),
                    minimum_stock: Some(minimum_stock),
                    ..Default::default()
                },
            )
            .await
            .expect("create product")
    }

    pub async fn move_stock(
        &self,
        product_id: i64,
        warehouse_id: i64,
        movement_type: MovementType,
        quantity: f64,
        reason: MovementReason,
    ) -> StockMovement {
        self.services
            .stock_service
            .create_movement(
                &self.admin,
                self.company_id,
                CreateMovementRequest {
                    product: Some(product_id),
                    warehouse: Some(warehouse_id),
                    movement_type: Some(movement_type),
                    quantity: Some(quantity),
                    reason: Some(reason),
                    ..Default::default()
                },
            )
            .await
            .expect("stock movement")
    }
}
