//! models/warehouse_model.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub is_main: bool,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub is_active: bool,
    pub product_count: i64,
    pub total_stock_value: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_main: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseStats {
    pub total_products: i64,
    pub total_items: f64,
    pub total_value: f64,
    pub low_stock_products: i64,
    pub out_of_stock_products: i64,
}
