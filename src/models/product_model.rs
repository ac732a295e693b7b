//! models/product_model.rs
//! Productos con especificaciones dinámicas definidas por su plantilla.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::models::attribute_model::DataType;
use crate::models::stock_model::{StockMovement, StockRecord};

/// Fila de `products` unida a categoría, plantilla y stock total.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub price: i64,
    pub cost: i64,
    pub price_includes_tax: bool,
    pub category_id: i64,
    pub category_name: String,
    pub template_id: i64,
    pub template_name: String,
    pub specifications: String,
    pub company_id: i64,
    pub minimum_stock: f64,
    pub unit_of_measure: String,
    pub is_active: bool,
    pub total_stock: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductRow {
    pub fn specifications_map(&self) -> Map<String, Value> {
        match serde_json::from_str::<Value>(&self.specifications) {
            Ok(Value::Object(map)) => map,
            _ => {
                log::warn!(
                    "Especificaciones ilegibles en producto {}, se devuelven vacías",
                    self.id
                );
                Map::new()
            }
        }
    }

    pub fn is_below_minimum(&self) -> bool {
        self.total_stock < self.minimum_stock
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub price: i64,
    pub cost: i64,
    pub price_includes_tax: bool,
    pub category: i64,
    pub category_name: String,
    pub template: i64,
    pub template_name: String,
    pub specifications: Map<String, Value>,
    pub company: i64,
    pub minimum_stock: f64,
    pub unit_of_measure: String,
    pub total_stock: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let specifications = row.specifications_map();
        Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            barcode: row.barcode,
            price: row.price,
            cost: row.cost,
            price_includes_tax: row.price_includes_tax,
            category: row.category_id,
            category_name: row.category_name,
            template: row.template_id,
            template_name: row.template_name,
            specifications,
            company: row.company_id,
            minimum_stock: row.minimum_stock,
            unit_of_measure: row.unit_of_measure,
            total_stock: row.total_stock,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Versión liviana para listados.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListItem {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub price: i64,
    pub cost: i64,
    pub category_name: String,
    pub template_name: String,
    pub total_stock: f64,
    pub below_minimum: bool,
    pub is_active: bool,
    pub unit_of_measure: String,
}

impl From<ProductRow> for ProductListItem {
    fn from(row: ProductRow) -> Self {
        let below_minimum = row.is_below_minimum();
        ProductListItem {
            id: row.id,
            name: row.name,
            sku: row.sku,
            barcode: row.barcode,
            price: row.price,
            cost: row.cost,
            category_name: row.category_name,
            template_name: row.template_name,
            total_stock: row.total_stock,
            below_minimum,
            is_active: row.is_active,
            unit_of_measure: row.unit_of_measure,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateStructureValue {
    pub slug: String,
    pub name: String,
    pub data_type: DataType,
    pub unit_of_measure: String,
    pub description: String,
    pub is_required: bool,
    pub order: i64,
    pub value: Option<Value>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseStock {
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub quantity: f64,
    pub is_main: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedSpecification {
    pub label: String,
    pub value: Value,
    pub unit: String,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub template_structure: Vec<TemplateStructureValue>,
    pub stock_by_warehouse: Vec<WarehouseStock>,
    pub formatted_specifications: Vec<FormattedSpecification>,
}

/// Body de producto. Todos los campos son opcionales para soportar PATCH;
/// en POST/PUT la validación exige los obligatorios.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<i64>,
    pub cost: Option<i64>,
    pub price_includes_tax: Option<bool>,
    pub category: Option<i64>,
    pub template: Option<i64>,
    pub specifications: Option<Map<String, Value>>,
    pub minimum_stock: Option<f64>,
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateSpecificationsRequest {
    pub template: Option<i64>,
    pub specifications: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category: Option<i64>,
    pub category_name: Option<String>,
    pub template: Option<i64>,
    pub template_name: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub cost_min: Option<i64>,
    pub cost_max: Option<i64>,
    pub has_stock: Option<bool>,
    pub below_minimum: Option<bool>,
    pub warehouse: Option<i64>,
    pub price_includes_tax: Option<bool>,
    pub unit_of_measure: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockDetailsResponse {
    pub stock_by_warehouse: Vec<StockRecord>,
    pub recent_movements: Vec<StockMovement>,
    pub total_stock: f64,
    pub is_below_minimum: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateResponse {
    pub created: usize,
    pub products: Vec<ProductListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductExport {
    pub count: usize,
    pub exported_at: String,
    pub products: Vec<ProductDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}
