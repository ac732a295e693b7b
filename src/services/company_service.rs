//! services/company_service.rs
//! Empresas (tenants), alta inicial y progreso del onboarding.

use sqlx::{Pool, Sqlite};

use crate::errors::{ApiError, ApiResult};
use crate::models::account_model::{Account, Role};
use crate::models::common_model::{Page, PageRequest};
use crate::models::company_model::{
    Company, CompanyStats, CompanySummary, CompleteOnboardingResponse, NamedRef,
    OnboardingProgress, OnboardingSteps, SetupCompanyRequest, SetupCompanyResponse,
    SetupDefaults, SetupUserSummary,
};
use crate::services::product_service::TOTAL_STOCK_SQL;
use crate::utils::now_timestamp;

const MAIN_WAREHOUSE_NAME: &str = "Bodega Principal";
const DEFAULT_CATEGORY_NAME: &str = "General";
const DEFAULT_TEMPLATE_NAME: &str = "Plantilla Básica";
const DEFAULT_TEMPLATE_DESCRIPTION: &str = "Plantilla inicial para productos";

#[derive(Clone, Debug)]
pub struct CompanyService {
    db_pool: Pool<Sqlite>,
}

impl CompanyService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CompanyService { db_pool }
    }

    /// Crea la empresa y deja al usuario como su administrador.
    /// Empresa, bodega principal, categoría y plantilla por defecto se crean en una
    /// sola transacción.
    pub async fn setup_company(
        &self,
        account: &Account,
        req: SetupCompanyRequest,
    ) -> ApiResult<SetupCompanyResponse> {
        if account.company_id.is_some() {
            return Err(ApiError::bad_request("User already belongs to a company"));
        }

        let name = req.company_name.as_deref().map(str::trim).unwrap_or("");
        let rut = req.company_rut.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() || rut.is_empty() {
            return Err(ApiError::bad_request(
                "company_name and company_rut are required",
            ));
        }

        let rut_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE rut = ?)")
            .bind(rut)
            .fetch_one(&self.db_pool)
            .await?;
        if rut_taken {
            return Err(ApiError::field(
                "company_rut",
                "A company with this RUT already exists.",
            ));
        }

        let now = now_timestamp();
        let mut tx = self.db_pool.begin().await?;

        // 1) Empresa
        let company_id = sqlx::query("INSERT INTO companies (name, rut, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(rut)
            .bind(&now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        // 2) El usuario pasa a ser admin de la empresa
        sqlx::query("UPDATE accounts SET company_id = ?, role = ? WHERE id = ?")
            .bind(company_id)
            .bind(Role::Admin.as_str())
            .bind(account.id)
            .execute(&mut *tx)
            .await?;

        // 3) Bodega principal
        let warehouse_id = sqlx::query(
            r#"
            INSERT INTO warehouses (name, is_main, company_id, created_at, updated_at)
            VALUES (?, 1, ?, ?, ?)
            "#,
        )
        .bind(MAIN_WAREHOUSE_NAME)
        .bind(company_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        // 4) Categoría y plantilla por defecto
        let category_id = sqlx::query(
            "INSERT INTO categories (name, company_id, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(DEFAULT_CATEGORY_NAME)
        .bind(company_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let template_id = sqlx::query(
            r#"
            INSERT INTO templates (name, description, company_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(DEFAULT_TEMPLATE_NAME)
        .bind(DEFAULT_TEMPLATE_DESCRIPTION)
        .bind(company_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        log::info!(
            "Empresa {} ({}) creada por la cuenta {}",
            company_id,
            rut,
            account.id
        );

        Ok(SetupCompanyResponse {
            company: CompanySummary {
                id: company_id,
                name: name.to_string(),
                rut: rut.to_string(),
            },
            user: SetupUserSummary {
                id: account.id,
                email: account.email.clone(),
                company: company_id,
                role: Role::Admin,
            },
            warehouse: NamedRef {
                id: warehouse_id,
                name: MAIN_WAREHOUSE_NAME.to_string(),
            },
            defaults: SetupDefaults {
                category: category_id,
                template: template_id,
            },
        })
    }

    pub async fn onboarding_progress(&self, account: &Account) -> ApiResult<OnboardingProgress> {
        let Some(company_id) = account.company_id else {
            return Ok(OnboardingProgress::NoCompany {
                completed: 0.0,
                has_company: false,
                message: "Please complete company setup first".to_string(),
            });
        };

        let steps = OnboardingSteps {
            create_category: self
                .exists("SELECT 1 FROM categories WHERE company_id = ? AND is_active = 1", company_id)
                .await?,
            create_template: self
                .exists("SELECT 1 FROM templates WHERE company_id = ? AND is_active = 1", company_id)
                .await?,
            create_product: self
                .exists("SELECT 1 FROM products WHERE company_id = ? AND is_active = 1", company_id)
                .await?,
            add_stock: self
                .exists(
                    r#"
                    SELECT 1 FROM stock_records sr
                    JOIN products p ON p.id = sr.product_id
                    WHERE p.company_id = ? AND sr.current_quantity > 0
                    "#,
                    company_id,
                )
                .await?,
            invite_team: self.count_active_accounts(company_id).await? > 1,
        };

        Ok(OnboardingProgress::InProgress {
            completed: steps.progress(),
            has_company: true,
            company_id,
            steps,
            onboarding_completed: account.onboarding_completed,
        })
    }

    async fn exists(&self, subquery: &str, company_id: i64) -> ApiResult<bool> {
        let found: bool = sqlx::query_scalar(&format!("SELECT EXISTS({})", subquery))
            .bind(company_id)
            .fetch_one(&self.db_pool)
            .await?;
        Ok(found)
    }

    async fn count_active_accounts(&self, company_id: i64) -> ApiResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE company_id = ? AND is_active = 1")
                .bind(company_id)
                .fetch_one(&self.db_pool)
                .await?;
        Ok(count)
    }

    pub async fn complete_onboarding(&self, account: &Account) -> ApiResult<CompleteOnboardingResponse> {
        if account.company_id.is_none() {
            return Err(ApiError::bad_request(
                "Cannot complete onboarding without a company",
            ));
        }

        sqlx::query("UPDATE accounts SET onboarding_completed = 1 WHERE id = ?")
            .bind(account.id)
            .execute(&self.db_pool)
            .await?;

        Ok(CompleteOnboardingResponse {
            message: "Onboarding completed successfully".to_string(),
            onboarding_completed: true,
        })
    }

    /// El listado sólo contiene la empresa del usuario.
    pub async fn list_companies(&self, company_id: i64, page: PageRequest) -> ApiResult<Page<Company>> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(company_id)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(page.slice(companies))
    }

    pub async fn get_company(&self, company_id: i64, id: i64) -> ApiResult<Company> {
        if id != company_id {
            return Err(ApiError::not_found("Company not found."));
        }
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Company not found."))
    }

    async fn count_active(&self, table: &str, company_id: i64) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE company_id = ? AND is_active = 1",
            table
        ))
        .bind(company_id)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(count)
    }

    pub async fn stats(&self, company_id: i64) -> ApiResult<CompanyStats> {
        let total_products = self.count_active("products", company_id).await?;
        let total_categories = self.count_active("categories", company_id).await?;
        let total_warehouses = self.count_active("warehouses", company_id).await?;
        let total_templates = self.count_active("templates", company_id).await?;

        let low_stock_products: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM products p
            WHERE p.company_id = ? AND p.is_active = 1
              AND {} < p.minimum_stock
            "#,
            TOTAL_STOCK_SQL
        ))
        .bind(company_id)
        .fetch_one(&self.db_pool)
        .await?;

        let total_stock_value: f64 = sqlx::query_scalar(
            r#"
            SELECT TOTAL(sr.current_quantity * p.cost)
            FROM stock_records sr
            JOIN products p ON p.id = sr.product_id
            WHERE p.company_id = ? AND p.is_active = 1 AND sr.is_active = 1
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(CompanyStats {
            total_products,
            total_categories,
            total_warehouses,
            total_templates,
            low_stock_products,
            total_stock_value,
        })
    }
}
