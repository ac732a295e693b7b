//! services/product_service.rs
//! Productos: filtros, CRUD, validación de especificaciones, carga masiva y exportación.

use std::collections::HashSet;

use serde_json::{Map, Value};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::common_model::{Ordering, Page, PageRequest};
use crate::models::product_model::{
    BulkCreateResponse, DateRangeQuery, FormattedSpecification, Product, ProductDetail,
    ProductExport, ProductFilters, ProductListItem, ProductRequest, ProductRow,
    StockDetailsResponse, TemplateStructureValue, ValidateSpecificationsRequest, WarehouseStock,
};
use crate::models::stock_model::{MovementFilters, StockMovement};
use crate::models::template_model::TemplateAttributeDetail;
use crate::services::specification::validate_specifications;
use crate::services::stock_service::StockService;
use crate::services::template_service::TemplateService;
use crate::utils::{like_pattern, now_timestamp, parse_date_bound, required_text};

macro_rules! total_stock_sql {
    () => {
        "(SELECT TOTAL(sr.current_quantity) FROM stock_records sr \
          WHERE sr.product_id = p.id AND sr.is_active = 1)"
    };
}

/// Stock total de `p` sumando todas sus bodegas.
pub const TOTAL_STOCK_SQL: &str = total_stock_sql!();

pub const PRODUCT_SELECT: &str = concat!(
    "SELECT p.id, p.name, p.sku, p.barcode, p.price, p.cost, p.price_includes_tax, ",
    "p.category_id, c.name AS category_name, p.template_id, t.name AS template_name, ",
    "p.specifications, p.company_id, p.minimum_stock, p.unit_of_measure, p.is_active, ",
    total_stock_sql!(),
    " AS total_stock, p.created_at, p.updated_at ",
    "FROM products p ",
    "JOIN categories c ON c.id = p.category_id ",
    "JOIN templates t ON t.id = p.template_id"
);

const RECENT_MOVEMENTS_LIMIT: i64 = 10;
const MUST_BE_POSITIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Producto validado, listo para insertar/actualizar.
#[derive(Debug, Clone)]
struct ValidatedProduct {
    name: String,
    sku: String,
    barcode: String,
    price: i64,
    cost: i64,
    price_includes_tax: bool,
    category_id: i64,
    template_id: i64,
    specifications: Map<String, Value>,
    minimum_stock: f64,
    unit_of_measure: String,
}

#[derive(Clone, Debug)]
pub struct ProductService {
    db_pool: Pool<Sqlite>,
    template_service: TemplateService,
    stock_service: StockService,
}

impl ProductService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        template_service: TemplateService,
        stock_service: StockService,
    ) -> Self {
        ProductService {
            db_pool,
            template_service,
            stock_service,
        }
    }

    /// GET /api/v1/products/ (y los listados derivados: por categoría, plantilla, bajo stock...)
    pub async fn list_products(
        &self,
        company_id: i64,
        filters: &ProductFilters,
        page: PageRequest,
    ) -> ApiResult<Page<ProductListItem>> {
        let created_after = filters
            .created_after
            .as_deref()
            .map(|raw| parse_date_bound("created_after", raw, false))
            .transpose()?;
        let created_before = filters
            .created_before
            .as_deref()
            .map(|raw| parse_date_bound("created_before", raw, true))
            .transpose()?;

        let mut count_qb = QueryBuilder::<Sqlite>::new(concat!(
            "SELECT COUNT(*) FROM products p ",
            "JOIN categories c ON c.id = p.category_id ",
            "JOIN templates t ON t.id = p.template_id"
        ));
        push_filters(&mut count_qb, company_id, filters, &created_after, &created_before);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            filters.ordering.as_deref(),
            &["name", "sku", "price", "created_at"],
            Ordering {
                field: "name",
                descending: false,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        push_filters(&mut qb, company_id, filters, &created_after, &created_before);
        qb.push(format!(
            " ORDER BY p.{} {}, p.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb.build_query_as::<ProductRow>().fetch_all(&self.db_pool).await?;
        Ok(Page::new(
            page,
            total,
            rows.into_iter().map(ProductListItem::from).collect(),
        ))
    }

    pub async fn get_product_row(&self, company_id: i64, id: i64) -> ApiResult<ProductRow> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.id = ? AND p.company_id = ? AND p.is_active = 1",
            PRODUCT_SELECT
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found."))
    }

    /// GET /api/v1/products/{id}/
    pub async fn retrieve_product(&self, company_id: i64, id: i64) -> ApiResult<ProductDetail> {
        let row = self.get_product_row(company_id, id).await?;
        self.product_detail(row).await
    }

    async fn product_detail(&self, row: ProductRow) -> ApiResult<ProductDetail> {
        let attributes = self.template_service.active_attributes(row.template_id).await?;
        let stock_by_warehouse = sqlx::query_as::<_, WarehouseStock>(
            r#"
            SELECT w.id AS warehouse_id, w.name AS warehouse_name,
                   sr.current_quantity AS quantity, w.is_main
            FROM stock_records sr
            JOIN warehouses w ON w.id = sr.warehouse_id
            WHERE sr.product_id = ? AND sr.is_active = 1 AND w.is_active = 1
            ORDER BY w.is_main DESC, w.name
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.db_pool)
        .await?;

        let product = Product::from(row);
        let template_structure = template_structure(&attributes, &product.specifications);
        let formatted_specifications = format_specifications(&attributes, &product.specifications);

        Ok(ProductDetail {
            product,
            template_structure,
            stock_by_warehouse,
            formatted_specifications,
        })
    }

    /// POST /api/v1/products/
    pub async fn create_product(&self, company_id: i64, req: ProductRequest) -> ApiResult<Product> {
        let product = self
            .validate_request(company_id, req, None, false)
            .await?
            .map_err(ApiError::Validation)?;

        let mut conn = self.db_pool.acquire().await?;
        let id = insert_product(&mut *conn, company_id, &product).await?;
        drop(conn);

        log::info!(
            "Producto {} ({}) creado en empresa {}",
            id,
            product.sku,
            company_id
        );
        Ok(Product::from(self.get_product_row(company_id, id).await?))
    }

    /// PUT (`partial = false`) / PATCH (`partial = true`).
    pub async fn update_product(
        &self,
        company_id: i64,
        id: i64,
        req: ProductRequest,
        partial: bool,
    ) -> ApiResult<Product> {
        let current = self.get_product_row(company_id, id).await?;
        let product = self
            .validate_request(company_id, req, Some(&current), partial)
            .await?
            .map_err(ApiError::Validation)?;

        let specifications = Value::Object(product.specifications.clone()).to_string();
        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, sku = ?, barcode = ?, price = ?, cost = ?, price_includes_tax = ?,
                category_id = ?, template_id = ?, specifications = ?, minimum_stock = ?,
                unit_of_measure = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.price_includes_tax)
        .bind(product.category_id)
        .bind(product.template_id)
        .bind(specifications)
        .bind(product.minimum_stock)
        .bind(&product.unit_of_measure)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        Ok(Product::from(self.get_product_row(company_id, id).await?))
    }

    /// Borrado lógico, sólo sin stock.
    pub async fn delete_product(&self, company_id: i64, id: i64) -> ApiResult<()> {
        let row = self.get_product_row(company_id, id).await?;
        if row.total_stock > 0.0 {
            return Err(ApiError::bad_request(
                "Cannot delete product with stock. Please adjust stock to zero first.",
            ));
        }

        sqlx::query("UPDATE products SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        log::info!("Producto {} desactivado", id);
        Ok(())
    }

    /// POST /api/v1/products/validate-specifications/
    /// El `Result` interno trae los errores de especificación; el externo, fallos reales.
    pub async fn validate_specifications_for(
        &self,
        company_id: i64,
        req: ValidateSpecificationsRequest,
    ) -> ApiResult<Result<Map<String, Value>, Vec<FieldError>>> {
        let template_id = req
            .template
            .ok_or_else(|| ApiError::field("template", "Template is required"))?;
        let template = self
            .template_service
            .get_template(company_id, template_id)
            .await?;
        let attributes = self.template_service.active_attributes(template.id).await?;

        Ok(validate_specifications(
            &attributes,
            &req.specifications.unwrap_or_default(),
        ))
    }

    /// GET /{id}/stock-details/
    pub async fn stock_details(&self, company_id: i64, id: i64) -> ApiResult<StockDetailsResponse> {
        let row = self.get_product_row(company_id, id).await?;
        let stock_by_warehouse = self.stock_service.records_for_product(row.id).await?;
        let recent_movements = self
            .stock_service
            .recent_for_product(row.id, RECENT_MOVEMENTS_LIMIT)
            .await?;

        Ok(StockDetailsResponse {
            stock_by_warehouse,
            recent_movements,
            total_stock: row.total_stock,
            is_below_minimum: row.is_below_minimum(),
        })
    }

    /// GET /{id}/movement-history/ (más recientes primero)
    pub async fn movement_history(
        &self,
        company_id: i64,
        id: i64,
        range: DateRangeQuery,
        page: PageRequest,
    ) -> ApiResult<Page<StockMovement>> {
        let row = self.get_product_row(company_id, id).await?;
        let filters = MovementFilters {
            product: Some(row.id),
            date_from: range.date_from,
            date_to: range.date_to,
            ..Default::default()
        };
        self.stock_service
            .list_movements(company_id, &filters, page)
            .await
    }

    /// POST /bulk-create/ : todo o nada.
    pub async fn bulk_create(
        &self,
        company_id: i64,
        requests: Vec<ProductRequest>,
    ) -> ApiResult<BulkCreateResponse> {
        if requests.is_empty() {
            return Err(ApiError::bad_request(
                "No products could be created with the provided data.",
            ));
        }

        // Validar todo antes de abrir la transacción
        let mut errors = Vec::new();
        let mut validated = Vec::with_capacity(requests.len());
        let mut seen_skus = HashSet::new();
        for (index, req) in requests.into_iter().enumerate() {
            match self.validate_request(company_id, req, None, false).await? {
                Ok(product) => {
                    if !seen_skus.insert(product.sku.clone()) {
                        errors.push(FieldError::new(
                            format!("[{}].sku", index),
                            "Duplicate SKU in request",
                        ));
                    }
                    validated.push(product);
                }
                Err(item_errors) => errors.extend(item_errors.into_iter().map(|e| {
                    FieldError::new(format!("[{}].{}", index, e.field), e.message)
                })),
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let mut tx = self.db_pool.begin().await?;
        let mut ids = Vec::with_capacity(validated.len());
        for product in &validated {
            ids.push(insert_product(&mut *tx, company_id, product).await?);
        }
        tx.commit().await?;

        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            products.push(ProductListItem::from(self.get_product_row(company_id, id).await?));
        }

        log::info!(
            "Carga masiva: {} productos creados en empresa {}",
            products.len(),
            company_id
        );
        Ok(BulkCreateResponse {
            created: products.len(),
            products,
        })
    }

    /// GET /export/ : todos los productos activos con su detalle.
    pub async fn export(&self, company_id: i64) -> ApiResult<ProductExport> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.company_id = ? AND p.is_active = 1 ORDER BY p.name, p.id",
            PRODUCT_SELECT
        ))
        .bind(company_id)
        .fetch_all(&self.db_pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(self.product_detail(row).await?);
        }

        Ok(ProductExport {
            count: products.len(),
            exported_at: now_timestamp(),
            products,
        })
    }

    /// Valida un body de producto. Los errores de campo van en el `Result` interno
    /// para que la carga masiva pueda prefijarlos con el índice.
    async fn validate_request(
        &self,
        company_id: i64,
        req: ProductRequest,
        current: Option<&ProductRow>,
        partial: bool,
    ) -> ApiResult<Result<ValidatedProduct, Vec<FieldError>>> {
        let mut errors = Vec::new();
        // PATCH rellena lo ausente con lo guardado
        let stored = current.filter(|_| partial);

        let name = match (req.name.as_deref(), stored) {
            (None, Some(cur)) => Some(cur.name.clone()),
            (raw, _) => required_text("name", raw).map_err(|e| errors.push(e)).ok(),
        };

        let sku = match (req.sku.as_deref(), stored) {
            (None, Some(cur)) => Some(cur.sku.clone()),
            (raw, _) => required_text("sku", raw)
                .map(|s| s.to_uppercase())
                .map_err(|e| errors.push(e))
                .ok(),
        };
        if let Some(sku) = sku.as_deref() {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE company_id = ? AND sku = ? AND id != ?)",
            )
            .bind(company_id)
            .bind(sku)
            .bind(current.map(|c| c.id).unwrap_or(0))
            .fetch_one(&self.db_pool)
            .await?;
            if taken {
                errors.push(FieldError::new(
                    "sku",
                    "A product with this SKU already exists in your company",
                ));
            }
        }

        let barcode = match (req.barcode, stored) {
            (Some(b), _) => b.trim().to_string(),
            (None, Some(cur)) => cur.barcode.clone(),
            (None, None) => String::new(),
        };

        let price = match (req.price, stored) {
            (Some(p), _) => Some(p),
            (None, Some(cur)) => Some(cur.price),
            (None, None) => {
                errors.push(FieldError::new("price", "This field is required."));
                None
            }
        };
        if price.is_some_and(|p| p < 0) {
            errors.push(FieldError::new("price", MUST_BE_POSITIVE));
        }

        let cost = req.cost.or(stored.map(|c| c.cost)).unwrap_or(0);
        if cost < 0 {
            errors.push(FieldError::new("cost", MUST_BE_POSITIVE));
        }

        let minimum_stock = req
            .minimum_stock
            .or(stored.map(|c| c.minimum_stock))
            .unwrap_or(0.0);
        if minimum_stock < 0.0 || !minimum_stock.is_finite() {
            errors.push(FieldError::new("minimum_stock", MUST_BE_POSITIVE));
        }

        let price_includes_tax = req
            .price_includes_tax
            .or(stored.map(|c| c.price_includes_tax))
            .unwrap_or(true);

        let unit_of_measure = match (req.unit_of_measure, stored) {
            (Some(u), _) if !u.trim().is_empty() => u.trim().to_string(),
            (_, Some(cur)) => cur.unit_of_measure.clone(),
            _ => "unit".to_string(),
        };

        let category_id = match req.category.or(stored.map(|c| c.category_id)) {
            Some(id) => {
                self.check_owned(
                    "categories",
                    "category",
                    "Category must belong to your company",
                    id,
                    company_id,
                    &mut errors,
                )
                .await?
            }
            None => {
                errors.push(FieldError::new("category", "This field is required."));
                None
            }
        };

        let template_id = match req.template.or(stored.map(|c| c.template_id)) {
            Some(id) => {
                self.check_owned(
                    "templates",
                    "template",
                    "Template must belong to your company",
                    id,
                    company_id,
                    &mut errors,
                )
                .await?
            }
            None => {
                errors.push(FieldError::new("template", "Template is required"));
                None
            }
        };

        // Especificaciones: contra la plantilla efectiva
        let specifications = match template_id {
            Some(template_id) => {
                let raw = match (req.specifications, stored) {
                    (Some(specs), _) => specs,
                    (None, Some(cur)) => cur.specifications_map(),
                    (None, None) => Map::new(),
                };
                let attributes = self.template_service.active_attributes(template_id).await?;
                match validate_specifications(&attributes, &raw) {
                    Ok(specs) => Some(specs),
                    Err(spec_errors) => {
                        errors.extend(spec_errors);
                        None
                    }
                }
            }
            None => None,
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        match (name, sku, price, category_id, template_id, specifications) {
            (Some(name), Some(sku), Some(price), Some(category_id), Some(template_id), Some(specifications)) => {
                Ok(Ok(ValidatedProduct {
                    name,
                    sku,
                    barcode,
                    price,
                    cost,
                    price_includes_tax,
                    category_id,
                    template_id,
                    specifications,
                    minimum_stock,
                    unit_of_measure,
                }))
            }
            _ => Ok(Err(vec![FieldError::new(
                "non_field_errors",
                "Invalid product data.",
            )])),
        }
    }

    /// Verifica que `id` exista activo en `table` y pertenezca a la empresa.
    async fn check_owned(
        &self,
        table: &str,
        field: &str,
        foreign_message: &str,
        id: i64,
        company_id: i64,
        errors: &mut Vec<FieldError>,
    ) -> ApiResult<Option<i64>> {
        let owner: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT company_id FROM {} WHERE id = ? AND is_active = 1",
            table
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        match owner {
            Some(owner) if owner == company_id => Ok(Some(id)),
            Some(_) => {
                errors.push(FieldError::new(field, foreign_message));
                Ok(None)
            }
            None => {
                errors.push(FieldError::new(
                    field,
                    format!("Invalid pk \"{}\" - object does not exist.", id),
                ));
                Ok(None)
            }
        }
    }
}

async fn insert_product(
    conn: &mut SqliteConnection,
    company_id: i64,
    product: &ValidatedProduct,
) -> ApiResult<i64> {
    let now = now_timestamp();
    let id = sqlx::query(
        r#"
        INSERT INTO products (
            name, sku, barcode, price, cost, price_includes_tax, category_id, template_id,
            specifications, company_id, minimum_stock, unit_of_measure, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.name)
    .bind(&product.sku)
    .bind(&product.barcode)
    .bind(product.price)
    .bind(product.cost)
    .bind(product.price_includes_tax)
    .bind(product.category_id)
    .bind(product.template_id)
    .bind(Value::Object(product.specifications.clone()).to_string())
    .bind(company_id)
    .bind(product.minimum_stock)
    .bind(&product.unit_of_measure)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

fn push_filters<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    company_id: i64,
    filters: &ProductFilters,
    created_after: &Option<String>,
    created_before: &Option<String>,
) {
    qb.push(" WHERE p.is_active = 1 AND p.company_id = ");
    qb.push_bind(company_id);

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (p.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.sku LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.barcode LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }
    if let Some(category) = filters.category {
        qb.push(" AND p.category_id = ");
        qb.push_bind(category);
    }
    if let Some(name) = filters.category_name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND c.name LIKE ");
        qb.push_bind(like_pattern(name.trim()));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(template) = filters.template {
        qb.push(" AND p.template_id = ");
        qb.push_bind(template);
    }
    if let Some(name) = filters.template_name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND t.name LIKE ");
        qb.push_bind(like_pattern(name.trim()));
        qb.push(" ESCAPE '\\'");
    }
    if let Some(min) = filters.price_min {
        qb.push(" AND p.price >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filters.price_max {
        qb.push(" AND p.price <= ");
        qb.push_bind(max);
    }
    if let Some(min) = filters.cost_min {
        qb.push(" AND p.cost >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filters.cost_max {
        qb.push(" AND p.cost <= ");
        qb.push_bind(max);
    }
    match filters.has_stock {
        Some(true) => {
            qb.push(concat!(" AND ", total_stock_sql!(), " > 0"));
        }
        Some(false) => {
            qb.push(concat!(" AND ", total_stock_sql!(), " <= 0"));
        }
        None => {}
    }
    match filters.below_minimum {
        Some(true) => {
            qb.push(concat!(" AND ", total_stock_sql!(), " < p.minimum_stock"));
        }
        Some(false) => {
            qb.push(concat!(" AND ", total_stock_sql!(), " >= p.minimum_stock"));
        }
        None => {}
    }
    if let Some(warehouse) = filters.warehouse {
        qb.push(
            " AND EXISTS (SELECT 1 FROM stock_records sw WHERE sw.product_id = p.id \
             AND sw.is_active = 1 AND sw.current_quantity > 0 AND sw.warehouse_id = ",
        );
        qb.push_bind(warehouse);
        qb.push(")");
    }
    if let Some(includes_tax) = filters.price_includes_tax {
        qb.push(" AND p.price_includes_tax = ");
        qb.push_bind(includes_tax);
    }
    if let Some(unit) = filters.unit_of_measure.as_deref().filter(|u| !u.trim().is_empty()) {
        qb.push(" AND LOWER(p.unit_of_measure) = ");
        qb.push_bind(unit.trim().to_lowercase());
    }
    if let Some(after) = created_after {
        qb.push(" AND p.created_at >= ");
        qb.push_bind(after.clone());
    }
    if let Some(before) = created_before {
        qb.push(" AND p.created_at <= ");
        qb.push_bind(before.clone());
    }
}

fn template_structure(
    attributes: &[TemplateAttributeDetail],
    specifications: &Map<String, Value>,
) -> Vec<TemplateStructureValue> {
    attributes
        .iter()
        .map(|attr| TemplateStructureValue {
            slug: attr.attribute_slug.clone(),
            name: attr.attribute_name.clone(),
            data_type: attr.attribute_type,
            unit_of_measure: attr.attribute_unit.clone(),
            description: attr.attribute_description.clone(),
            is_required: attr.is_required,
            order: attr.order,
            value: specifications.get(&attr.attribute_slug).cloned(),
            default_value: attr.default_value.clone(),
        })
        .collect()
}

/// Etiqueta + valor + unidad, p. ej. "1.5 kg".
pub fn format_specifications(
    attributes: &[TemplateAttributeDetail],
    specifications: &Map<String, Value>,
) -> Vec<FormattedSpecification> {
    attributes
        .iter()
        .filter_map(|attr| {
            let value = specifications.get(&attr.attribute_slug).filter(|v| !v.is_null())?;
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(FormattedSpecification {
                label: attr.attribute_name.clone(),
                value: value.clone(),
                unit: attr.attribute_unit.clone(),
                formatted: format!("{} {}", shown, attr.attribute_unit).trim().to_string(),
            })
        })
        .collect()
}
