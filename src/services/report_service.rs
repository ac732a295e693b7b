//! services/report_service.rs
//! Reportes de sólo lectura sobre el inventario de una empresa.

use std::collections::BTreeMap;

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::errors::{ApiError, ApiResult};
use crate::models::product_model::{DateRangeQuery, ProductListItem, ProductRow};
use crate::models::report_model::{
    AlertGroup, CategoryAnalysis, CategoryAnalysisRow, InventoryValuation, MovementReport,
    ReasonAggregate, StockAlerts, TopMovedProduct, TopProductMetric, TopProducts,
    TopProductsQuery, TypeAggregate, WarehouseValuation,
};
use crate::services::product_service::{PRODUCT_SELECT, TOTAL_STOCK_SQL};
use crate::utils::{now_timestamp, parse_date_bound};

const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 100;

#[derive(Clone, Debug)]
pub struct ReportService {
    db_pool: Pool<Sqlite>,
}

impl ReportService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ReportService { db_pool }
    }

    /// Valor del stock a costo, total y por bodega.
    pub async fn inventory_valuation(&self, company_id: i64) -> ApiResult<InventoryValuation> {
        let rows: Vec<(i64, String, i64, f64, f64)> = sqlx::query_as(
            r#"
            SELECT w.id, w.name, COUNT(*), TOTAL(sr.current_quantity), TOTAL(sr.current_quantity * p.cost)
            FROM stock_records sr
            JOIN products p ON p.id = sr.product_id
            JOIN warehouses w ON w.id = sr.warehouse_id
            WHERE p.company_id = ? AND sr.is_active = 1
            GROUP BY w.id, w.name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db_pool)
        .await?;

        let mut valuation = InventoryValuation {
            total_value: 0.0,
            total_items: 0.0,
            by_warehouse: BTreeMap::new(),
            generated_at: now_timestamp(),
        };
        for (warehouse_id, name, products, items, value) in rows {
            valuation.total_items += items;
            valuation.total_value += value;
            valuation.by_warehouse.insert(
                name,
                WarehouseValuation {
                    warehouse_id,
                    products,
                    total_items: items,
                    total_value: value,
                },
            );
        }
        Ok(valuation)
    }

    /// Bajo stock: 0 < total < mínimo. Sin stock: total 0 o sin registros.
    pub async fn stock_alerts(&self, company_id: i64) -> ApiResult<StockAlerts> {
        let low_stock = self
            .product_rows(
                company_id,
                &format!(
                    "{total} > 0 AND {total} < p.minimum_stock",
                    total = TOTAL_STOCK_SQL
                ),
            )
            .await?;
        let out_of_stock = self
            .product_rows(company_id, &format!("{} = 0", TOTAL_STOCK_SQL))
            .await?;

        Ok(StockAlerts {
            low_stock: AlertGroup {
                count: low_stock.len(),
                products: low_stock,
            },
            out_of_stock: AlertGroup {
                count: out_of_stock.len(),
                products: out_of_stock,
            },
            generated_at: now_timestamp(),
        })
    }

    /// Entradas y salidas agrupadas por tipo, motivo y producto.
    pub async fn movement_report(&self, company_id: i64, range: &DateRangeQuery) -> ApiResult<MovementReport> {
        let date_from = range
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound("date_from", raw, false))
            .transpose()?;
        let date_to = range
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound("date_to", raw, true))
            .transpose()?;

        let scoped = |select: &str| {
            let mut qb = QueryBuilder::<Sqlite>::new(select);
            qb.push(
                " FROM stock_movements m \
                 JOIN stock_records sr ON sr.id = m.stock_record_id \
                 JOIN products p ON p.id = sr.product_id \
                 WHERE p.company_id = ",
            );
            qb.push_bind(company_id);
            if let Some(from) = &date_from {
                qb.push(" AND m.created_at >= ");
                qb.push_bind(from.clone());
            }
            if let Some(to) = &date_to {
                qb.push(" AND m.created_at <= ");
                qb.push_bind(to.clone());
            }
            qb
        };

        let total_movements: i64 = scoped("SELECT COUNT(*)")
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await?;

        let mut qb = scoped("SELECT m.movement_type, COUNT(*) AS count, TOTAL(m.quantity) AS total_quantity");
        qb.push(" GROUP BY m.movement_type ORDER BY m.movement_type");
        let by_type = qb.build_query_as::<TypeAggregate>().fetch_all(&self.db_pool).await?;

        let mut qb = scoped("SELECT m.reason, COUNT(*) AS count, TOTAL(m.quantity) AS total_quantity");
        qb.push(" GROUP BY m.reason ORDER BY m.reason");
        let by_reason = qb.build_query_as::<ReasonAggregate>().fetch_all(&self.db_pool).await?;

        let mut qb = scoped(
            "SELECT p.id AS product_id, p.name AS product_name, p.sku AS product_sku, \
             COUNT(*) AS total_movements, TOTAL(m.quantity) AS total_quantity",
        );
        qb.push(" GROUP BY p.id, p.name, p.sku ORDER BY total_movements DESC, p.id LIMIT 10");
        let top_products = qb.build_query_as::<TopMovedProduct>().fetch_all(&self.db_pool).await?;

        Ok(MovementReport {
            date_from: range.date_from.clone(),
            date_to: range.date_to.clone(),
            total_movements,
            by_type,
            by_reason,
            top_products,
            generated_at: now_timestamp(),
        })
    }

    pub async fn category_analysis(&self, company_id: i64) -> ApiResult<CategoryAnalysis> {
        let categories = sqlx::query_as::<_, CategoryAnalysisRow>(
            r#"
            SELECT c.id, c.name,
                   (SELECT COUNT(*) FROM products p
                     WHERE p.category_id = c.id AND p.is_active = 1) AS total_products,
                   (SELECT TOTAL(sr.current_quantity) FROM stock_records sr
                     JOIN products p ON p.id = sr.product_id
                     WHERE p.category_id = c.id AND p.is_active = 1 AND sr.is_active = 1) AS total_stock,
                   (SELECT TOTAL(sr.current_quantity * p.cost) FROM stock_records sr
                     JOIN products p ON p.id = sr.product_id
                     WHERE p.category_id = c.id AND p.is_active = 1 AND sr.is_active = 1) AS total_value
            FROM categories c
            WHERE c.company_id = ? AND c.is_active = 1
            ORDER BY total_value DESC, c.name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(CategoryAnalysis {
            categories,
            generated_at: now_timestamp(),
        })
    }

    pub async fn top_products(&self, company_id: i64, query: &TopProductsQuery) -> ApiResult<TopProducts> {
        let metric = TopProductMetric::parse(query.metric.as_deref()).ok_or_else(|| {
            ApiError::bad_request("Invalid metric. Use one of: stock_value, stock_quantity, price.")
        })?;
        let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);

        let order_by = match metric {
            TopProductMetric::StockValue => format!("{} * p.cost DESC", TOTAL_STOCK_SQL),
            TopProductMetric::StockQuantity => format!("{} DESC", TOTAL_STOCK_SQL),
            TopProductMetric::Price => "p.price DESC".to_string(),
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.company_id = ? AND p.is_active = 1 ORDER BY {}, p.id LIMIT ?",
            PRODUCT_SELECT, order_by
        ))
        .bind(company_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(TopProducts {
            metric,
            limit,
            products: rows.into_iter().map(ProductListItem::from).collect(),
            generated_at: now_timestamp(),
        })
    }

    /// Productos activos de la empresa que cumplen `condition` (SQL sobre `p`).
    async fn product_rows(&self, company_id: i64, condition: &str) -> ApiResult<Vec<ProductListItem>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.company_id = ? AND p.is_active = 1 AND {} ORDER BY p.name, p.id",
            PRODUCT_SELECT, condition
        ))
        .bind(company_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows.into_iter().map(ProductListItem::from).collect())
    }
}
