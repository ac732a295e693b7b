//! models/company_model.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::account_model::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub rut: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupCompanyRequest {
    pub company_name: Option<String>,
    pub company_rut: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanySummary {
    pub id: i64,
    pub name: String,
    pub rut: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupUserSummary {
    pub id: i64,
    pub email: String,
    pub company: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupDefaults {
    pub category: i64,
    pub template: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupCompanyResponse {
    pub company: CompanySummary,
    pub user: SetupUserSummary,
    pub warehouse: NamedRef,
    pub defaults: SetupDefaults,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingSteps {
    pub create_category: bool,
    pub create_template: bool,
    pub create_product: bool,
    pub add_stock: bool,
    pub invite_team: bool,
}

impl OnboardingSteps {
    pub fn completed_count(&self) -> usize {
        [
            self.create_category,
            self.create_template,
            self.create_product,
            self.add_stock,
            self.invite_team,
        ]
        .iter()
        .filter(|done| **done)
        .count()
    }

    /// Porcentaje de avance (0..=100).
    pub fn progress(&self) -> f64 {
        self.completed_count() as f64 / 5.0 * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OnboardingProgress {
    NoCompany {
        completed: f64,
        has_company: bool,
        message: String,
    },
    InProgress {
        completed: f64,
        has_company: bool,
        company_id: i64,
        steps: OnboardingSteps,
        onboarding_completed: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteOnboardingResponse {
    pub message: String,
    pub onboarding_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyStats {
    pub total_products: i64,
    pub total_categories: i64,
    pub total_warehouses: i64,
    pub total_templates: i64,
    pub low_stock_products: i64,
    pub total_stock_value: f64,
}
