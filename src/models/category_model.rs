//! models/category_model.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Body de POST/PUT/PATCH. En PATCH los campos ausentes conservan su valor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}
