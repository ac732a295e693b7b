//! services/warehouse_service.rs

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::errors::{ApiError, ApiResult};
use crate::models::common_model::{Ordering, Page, PageRequest};
use crate::models::stock_model::{StockMovement, StockRecord, StockRecordFilters};
use crate::models::warehouse_model::{Warehouse, WarehouseListQuery, WarehouseRequest, WarehouseStats};
use crate::services::stock_service::StockService;
use crate::utils::{like_pattern, now_timestamp, required_text};

const WAREHOUSE_SELECT: &str = r#"
    SELECT w.id, w.name, w.address, w.is_main, w.company_id, w.is_active,
           (SELECT COUNT(*) FROM stock_records sr
             WHERE sr.warehouse_id = w.id AND sr.is_active = 1 AND sr.current_quantity > 0) AS product_count,
           (SELECT TOTAL(sr.current_quantity * p.cost) FROM stock_records sr
             JOIN products p ON p.id = sr.product_id
             WHERE sr.warehouse_id = w.id AND sr.is_active = 1) AS total_stock_value,
           w.created_at, w.updated_at
    FROM warehouses w
"#;

#[derive(Clone, Debug)]
pub struct WarehouseService {
    db_pool: Pool<Sqlite>,
    stock_service: StockService,
}

impl WarehouseService {
    pub fn new(db_pool: Pool<Sqlite>, stock_service: StockService) -> Self {
        WarehouseService {
            db_pool,
            stock_service,
        }
    }

    pub async fn list_warehouses(
        &self,
        company_id: i64,
        query: &WarehouseListQuery,
        page: PageRequest,
    ) -> ApiResult<Page<Warehouse>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM warehouses w");
        push_filters(&mut count_qb, company_id, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            query.ordering.as_deref(),
            &["name", "is_main", "created_at"],
            Ordering {
                field: "name",
                descending: false,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new(WAREHOUSE_SELECT);
        push_filters(&mut qb, company_id, query);
        qb.push(format!(
            " ORDER BY w.{} {}, w.id LIMIT ",
            ordering.field,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Warehouse>().fetch_all(&self.db_pool).await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_warehouse(&self, company_id: i64, id: i64) -> ApiResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(&format!(
            "{} WHERE w.id = ? AND w.company_id = ? AND w.is_active = 1",
            WAREHOUSE_SELECT
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Warehouse not found."))
    }

    pub async fn create_warehouse(&self, company_id: i64, req: WarehouseRequest) -> ApiResult<Warehouse> {
        let name = required_text("name", req.name.as_deref()).map_err(|e| ApiError::Validation(vec![e]))?;
        self.ensure_unique_name(company_id, &name, None).await?;
        let is_main = req.is_main.unwrap_or(false);

        let now = now_timestamp();
        let mut tx = self.db_pool.begin().await?;
        if is_main {
            clear_main_flag(&mut tx, company_id, None).await?;
        }
        let id = sqlx::query(
            r#"
            INSERT INTO warehouses (name, address, is_main, company_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&name)
        .bind(req.address.as_deref().map(str::trim).unwrap_or(""))
        .bind(is_main)
        .bind(company_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;

        log::info!("Bodega {} creada en empresa {}", id, company_id);
        self.get_warehouse(company_id, id).await
    }

    pub async fn update_warehouse(
        &self,
        company_id: i64,
        id: i64,
        req: WarehouseRequest,
        partial: bool,
    ) -> ApiResult<Warehouse> {
        let current = self.get_warehouse(company_id, id).await?;

        let name = match (req.name.as_deref(), partial) {
            (None, true) => current.name.clone(),
            (raw, _) => required_text("name", raw).map_err(|e| ApiError::Validation(vec![e]))?,
        };
        let address = match (req.address, partial) {
            (Some(a), _) => a.trim().to_string(),
            (None, true) => current.address.clone(),
            (None, false) => String::new(),
        };
        let is_main = match (req.is_main, partial) {
            (Some(flag), _) => flag,
            (None, true) => current.is_main,
            (None, false) => false,
        };

        if name != current.name {
            self.ensure_unique_name(company_id, &name, Some(id)).await?;
        }

        let mut tx = self.db_pool.begin().await?;
        if is_main && !current.is_main {
            clear_main_flag(&mut tx, company_id, Some(id)).await?;
        }
        sqlx::query(
            "UPDATE warehouses SET name = ?, address = ?, is_main = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(&address)
        .bind(is_main)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.get_warehouse(company_id, id).await
    }

    /// Borrado lógico; rechazado mientras quede stock en la bodega.
    pub async fn delete_warehouse(&self, company_id: i64, id: i64) -> ApiResult<()> {
        let warehouse = self.get_warehouse(company_id, id).await?;
        if warehouse.product_count > 0 {
            return Err(ApiError::bad_request("Cannot delete warehouse with stock"));
        }

        sqlx::query("UPDATE warehouses SET is_active = 0, is_main = 0, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        log::info!("Bodega {} desactivada", id);
        Ok(())
    }

    /// GET /warehouses/{id}/inventory/
    pub async fn inventory(&self, company_id: i64, id: i64, page: PageRequest) -> ApiResult<Page<StockRecord>> {
        self.get_warehouse(company_id, id).await?;
        let filters = StockRecordFilters {
            warehouse: Some(id),
            has_stock: Some(true),
            ..Default::default()
        };
        self.stock_service.list_records(company_id, &filters, page).await
    }

    /// GET /warehouses/{id}/stats/
    pub async fn stats(&self, company_id: i64, id: i64) -> ApiResult<WarehouseStats> {
        self.get_warehouse(company_id, id).await?;

        let stats = sqlx::query_as::<_, WarehouseStats>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN sr.current_quantity > 0 THEN 1 ELSE 0 END), 0) AS total_products,
                TOTAL(sr.current_quantity) AS total_items,
                TOTAL(sr.current_quantity * p.cost) AS total_value,
                COALESCE(SUM(CASE WHEN sr.current_quantity < p.minimum_stock THEN 1 ELSE 0 END), 0) AS low_stock_products,
                COALESCE(SUM(CASE WHEN sr.current_quantity = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock_products
            FROM stock_records sr
            JOIN products p ON p.id = sr.product_id
            WHERE sr.warehouse_id = ? AND sr.is_active = 1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(stats)
    }

    /// GET /warehouses/{id}/movements/
    pub async fn movements(&self, company_id: i64, id: i64, page: PageRequest) -> ApiResult<Page<StockMovement>> {
        self.get_warehouse(company_id, id).await?;
        self.stock_service.recent_for_warehouse(company_id, id, page).await
    }

    async fn ensure_unique_name(&self, company_id: i64, name: &str, exclude: Option<i64>) -> ApiResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE company_id = ? AND name = ? AND id != ?)",
        )
        .bind(company_id)
        .bind(name)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.db_pool)
        .await?;

        if taken {
            return Err(ApiError::field(
                "name",
                "A warehouse with this name already exists in your company.",
            ));
        }
        Ok(())
    }
}

/// Sólo una bodega principal por empresa.
async fn clear_main_flag(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    company_id: i64,
    except: Option<i64>,
) -> ApiResult<()> {
    sqlx::query("UPDATE warehouses SET is_main = 0 WHERE company_id = ? AND is_main = 1 AND id != ?")
        .bind(company_id)
        .bind(except.unwrap_or(0))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, company_id: i64, query: &WarehouseListQuery) {
    qb.push(" WHERE w.is_active = 1 AND w.company_id = ");
    qb.push_bind(company_id);

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (w.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR w.address LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }
}
