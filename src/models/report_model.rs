//! models/report_model.rs
//! Reportes de inventario: valorización, alertas, entradas/salidas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::product_model::ProductListItem;
use crate::models::stock_model::{MovementReason, MovementType};

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseValuation {
    pub warehouse_id: i64,
    pub products: i64,
    pub total_items: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryValuation {
    pub total_value: f64,
    pub total_items: f64,
    pub by_warehouse: BTreeMap<String, WarehouseValuation>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertGroup {
    pub count: usize,
    pub products: Vec<ProductListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockAlerts {
    pub low_stock: AlertGroup,
    pub out_of_stock: AlertGroup,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TypeAggregate {
    #[sqlx(try_from = "String")]
    pub movement_type: MovementType,
    pub count: i64,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReasonAggregate {
    #[sqlx(try_from = "String")]
    pub reason: MovementReason,
    pub count: i64,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopMovedProduct {
    pub product_id: i64,
    pub product_name: String,
    pub product_sku: String,
    pub total_movements: i64,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementReport {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub total_movements: i64,
    pub by_type: Vec<TypeAggregate>,
    pub by_reason: Vec<ReasonAggregate>,
    pub top_products: Vec<TopMovedProduct>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryAnalysisRow {
    pub id: i64,
    pub name: String,
    pub total_products: i64,
    pub total_stock: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAnalysis {
    pub categories: Vec<CategoryAnalysisRow>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopProductMetric {
    StockValue,
    StockQuantity,
    Price,
}

impl TopProductMetric {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.unwrap_or("stock_value") {
            "stock_value" => Some(TopProductMetric::StockValue),
            "stock_quantity" => Some(TopProductMetric::StockQuantity),
            "price" => Some(TopProductMetric::Price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopProductsQuery {
    pub metric: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProducts {
    pub metric: TopProductMetric,
    pub limit: i64,
    pub products: Vec<ProductListItem>,
    pub generated_at: String,
}
