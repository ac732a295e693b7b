//! services/stock_service.rs
//! Registros de stock por bodega y movimientos (entradas, salidas, transferencias, ajustes).
//!
//! Toda modificación de `current_quantity` ocurre dentro de una transacción junto con el
//! movimiento que la explica. Las salidas usan un UPDATE condicional
//! (`WHERE current_quantity >= ?`) para que dos salidas concurrentes no dejen stock negativo.

use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::{Duration, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::account_model::Account;
use crate::models::common_model::{Ordering, Page, PageRequest};
use crate::models::product_model::DateRangeQuery;
use crate::models::stock_model::{
    AdjustmentRequest, CreateMovementRequest, MovementFilters, MovementReason, MovementSummary,
    MovementType, ReconcileResponse, StockMovement, StockRecord, StockRecordFilters,
};
use crate::utils::{format_timestamp, like_pattern, now_timestamp, parse_date_bound};

const STOCK_RECORD_SELECT: &str = r#"
    SELECT sr.id, sr.product_id AS product, p.name AS product_name, p.sku AS product_sku,
           sr.warehouse_id AS warehouse, w.name AS warehouse_name,
           sr.current_quantity, sr.is_active, sr.created_at, sr.updated_at
    FROM stock_records sr
    JOIN products p ON p.id = sr.product_id
    JOIN warehouses w ON w.id = sr.warehouse_id
"#;

const MOVEMENT_SELECT: &str = r#"
    SELECT m.id, m.stock_record_id AS stock_record, sr.product_id, p.name AS product_name,
           w.name AS warehouse_name, m.movement_type, m.quantity, m.resulting_balance,
           m.reason, m.account_id AS account, a.email AS account_email, m.notes,
           m.reference_document, m.unit_cost,
           m.from_warehouse_id AS from_warehouse, fw.name AS from_warehouse_name,
           m.to_warehouse_id AS to_warehouse, tw.name AS to_warehouse_name,
           m.created_at
    FROM stock_movements m
    JOIN stock_records sr ON sr.id = m.stock_record_id
    JOIN products p ON p.id = sr.product_id
    JOIN warehouses w ON w.id = sr.warehouse_id
    JOIN accounts a ON a.id = m.account_id
    LEFT JOIN warehouses fw ON fw.id = m.from_warehouse_id
    LEFT JOIN warehouses tw ON tw.id = m.to_warehouse_id
"#;

const MOVEMENT_COUNT_FROM: &str = r#"
    SELECT COUNT(*)
    FROM stock_movements m
    JOIN stock_records sr ON sr.id = m.stock_record_id
    JOIN products p ON p.id = sr.product_id
"#;

const RECENT_WINDOW_LIMIT: i64 = 50;
/// Ventana máxima de `recent` (100 años).
pub const MAX_RECENT_HOURS: i64 = 24 * 365 * 100;
const MIN_MOVEMENT_QUANTITY: f64 = 0.01;

/// Cantidades como las muestra el resto de la API: "10.0", "2.5".
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.1}", quantity)
    } else {
        quantity.to_string()
    }
}

/// Movimiento listo para insertar.
struct NewMovement<'a> {
    stock_record_id: i64,
    movement_type: MovementType,
    quantity: f64,
    resulting_balance: f64,
    reason: MovementReason,
    account_id: i64,
    notes: &'a str,
    reference_document: &'a str,
    unit_cost: Option<i64>,
    from_warehouse_id: Option<i64>,
    to_warehouse_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct StockService {
    db_pool: Pool<Sqlite>,
}

impl StockService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        StockService { db_pool }
    }

    // ---------------- Registros de stock ----------------

    pub async fn list_records(
        &self,
        company_id: i64,
        filters: &StockRecordFilters,
        page: PageRequest,
    ) -> ApiResult<Page<StockRecord>> {
        let mut count_qb = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM stock_records sr \
             JOIN products p ON p.id = sr.product_id \
             JOIN warehouses w ON w.id = sr.warehouse_id",
        );
        push_record_filters(&mut count_qb, company_id, filters);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            filters.ordering.as_deref(),
            &["current_quantity", "product__name", "warehouse__name"],
            Ordering {
                field: "product__name",
                descending: false,
            },
        );
        let column = match ordering.field {
            "current_quantity" => "sr.current_quantity",
            "warehouse__name" => "w.name",
            _ => "p.name",
        };

        let mut qb = QueryBuilder::<Sqlite>::new(STOCK_RECORD_SELECT);
        push_record_filters(&mut qb, company_id, filters);
        qb.push(format!(
            " ORDER BY {} {}, sr.id LIMIT ",
            column,
            ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<StockRecord>().fetch_all(&self.db_pool).await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_record(&self, company_id: i64, id: i64) -> ApiResult<StockRecord> {
        sqlx::query_as::<_, StockRecord>(&format!(
            "{} WHERE sr.id = ? AND p.company_id = ? AND sr.is_active = 1",
            STOCK_RECORD_SELECT
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Stock record not found."))
    }

    pub async fn records_for_product(&self, product_id: i64) -> ApiResult<Vec<StockRecord>> {
        let records = sqlx::query_as::<_, StockRecord>(&format!(
            "{} WHERE sr.product_id = ? AND sr.is_active = 1 AND w.is_active = 1 ORDER BY w.is_main DESC, w.name",
            STOCK_RECORD_SELECT
        ))
        .bind(product_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(records)
    }

    /// Recalcula la cantidad desde el historial: IN suma, OUT y TRANSFER restan (mínimo 0).
    pub async fn reconcile(&self, company_id: i64, id: i64) -> ApiResult<ReconcileResponse> {
        let record = self.get_record(company_id, id).await?;

        let computed: f64 = sqlx::query_scalar(
            r#"
            SELECT TOTAL(CASE WHEN movement_type = 'IN' THEN quantity ELSE -quantity END)
            FROM stock_movements
            WHERE stock_record_id = ?
            "#,
        )
        .bind(record.id)
        .fetch_one(&self.db_pool)
        .await?;
        let computed = computed.max(0.0);

        if (computed - record.current_quantity).abs() < f64::EPSILON {
            return Ok(ReconcileResponse::AlreadyCorrect {
                reconciled: false,
                message: "Stock record was already correct".to_string(),
            });
        }

        sqlx::query("UPDATE stock_records SET current_quantity = ?, updated_at = ? WHERE id = ?")
            .bind(computed)
            .bind(now_timestamp())
            .bind(record.id)
            .execute(&self.db_pool)
            .await?;

        log::warn!(
            "Stock record {} reconciliado: {} -> {}",
            record.id,
            record.current_quantity,
            computed
        );
        Ok(ReconcileResponse::Reconciled {
            reconciled: true,
            old_quantity: record.current_quantity,
            new_quantity: computed,
            difference: computed - record.current_quantity,
        })
    }

    // ---------------- Movimientos ----------------

    pub async fn list_movements(
        &self,
        company_id: i64,
        filters: &MovementFilters,
        page: PageRequest,
    ) -> ApiResult<Page<StockMovement>> {
        let date_from = filters
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound("date_from", raw, false))
            .transpose()?;
        let date_to = filters
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound("date_to", raw, true))
            .transpose()?;

        let mut count_qb = QueryBuilder::<Sqlite>::new(MOVEMENT_COUNT_FROM);
        push_movement_filters(&mut count_qb, company_id, filters, &date_from, &date_to);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db_pool).await?;

        let ordering = Ordering::parse(
            filters.ordering.as_deref(),
            &["created_at", "movement_type", "quantity"],
            Ordering {
                field: "created_at",
                descending: true,
            },
        );

        let mut qb = QueryBuilder::<Sqlite>::new(MOVEMENT_SELECT);
        push_movement_filters(&mut qb, company_id, filters, &date_from, &date_to);
        qb.push(format!(
            " ORDER BY m.{} {dir}, m.id {dir} LIMIT ",
            ordering.field,
            dir = ordering.direction()
        ));
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<StockMovement>().fetch_all(&self.db_pool).await?;
        Ok(Page::new(page, total, items))
    }

    pub async fn get_movement(&self, company_id: i64, id: i64) -> ApiResult<StockMovement> {
        sqlx::query_as::<_, StockMovement>(&format!(
            "{} WHERE m.id = ? AND p.company_id = ?",
            MOVEMENT_SELECT
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Stock movement not found."))
    }

    pub async fn recent_for_product(&self, product_id: i64, limit: i64) -> ApiResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "{} WHERE sr.product_id = ? ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
            MOVEMENT_SELECT
        ))
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(movements)
    }

    /// Los 50 movimientos más recientes de una bodega, paginados en memoria.
    pub async fn recent_for_warehouse(
        &self,
        company_id: i64,
        warehouse_id: i64,
        page: PageRequest,
    ) -> ApiResult<Page<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "{} WHERE sr.warehouse_id = ? AND p.company_id = ? \
             ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
            MOVEMENT_SELECT
        ))
        .bind(warehouse_id)
        .bind(company_id)
        .bind(RECENT_WINDOW_LIMIT)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(page.slice(movements))
    }

    /// GET /stock-movements/recent/?hours=24
    pub async fn recent(&self, company_id: i64, hours: Option<i64>, page: PageRequest) -> ApiResult<Page<StockMovement>> {
        let hours = hours.unwrap_or(24);
        if hours <= 0 {
            return Err(ApiError::field("hours", "Ensure this value is greater than 0."));
        }
        if hours > MAX_RECENT_HOURS {
            return Err(ApiError::field(
                "hours",
                format!("Ensure this value is less than or equal to {}.", MAX_RECENT_HOURS),
            ));
        }
        let cutoff = Duration::try_hours(hours)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .map(format_timestamp)
            .ok_or_else(|| ApiError::field("hours", "Time window is out of range."))?;

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "{} WHERE p.company_id = ? AND m.created_at >= ? \
             ORDER BY m.created_at DESC, m.id DESC LIMIT ?",
            MOVEMENT_SELECT
        ))
        .bind(company_id)
        .bind(cutoff)
        .bind(RECENT_WINDOW_LIMIT)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(page.slice(movements))
    }

    /// POST /stock-movements/
    pub async fn create_movement(
        &self,
        account: &Account,
        company_id: i64,
        req: CreateMovementRequest,
    ) -> ApiResult<StockMovement> {
        let mut errors = Vec::new();

        let product_id = self
            .check_owned("products", "product", "Product must belong to your company", req.product, company_id, &mut errors)
            .await?;
        let warehouse_id = self
            .check_owned("warehouses", "warehouse", "Warehouse must belong to your company", req.warehouse, company_id, &mut errors)
            .await?;

        if req.movement_type.is_none() {
            errors.push(FieldError::new("movement_type", "This field is required."));
        }
        if req.reason.is_none() {
            errors.push(FieldError::new("reason", "This field is required."));
        }
        match req.quantity {
            None => errors.push(FieldError::new("quantity", "This field is required.")),
            Some(q) if !q.is_finite() || q < MIN_MOVEMENT_QUANTITY => errors.push(FieldError::new(
                "quantity",
                "Ensure this value is greater than or equal to 0.01.",
            )),
            Some(_) => {}
        }
        if req.unit_cost.is_some_and(|c| c < 0) {
            errors.push(FieldError::new(
                "unit_cost",
                "Ensure this value is greater than or equal to 0.",
            ));
        }

        let mut to_warehouse_id = None;
        if req.movement_type == Some(MovementType::Transfer) {
            match req.to_warehouse {
                None => errors.push(FieldError::new(
                    "to_warehouse",
                    "Transfer movements require destination warehouse",
                )),
                Some(dest) if Some(dest) == req.warehouse => errors.push(FieldError::new(
                    "to_warehouse",
                    "Destination must be different from origin",
                )),
                Some(_) => {
                    to_warehouse_id = self
                        .check_owned(
                            "warehouses",
                            "to_warehouse",
                            "Destination warehouse must belong to your company",
                            req.to_warehouse,
                            company_id,
                            &mut errors,
                        )
                        .await?;
                }
            }
        }

        let (Some(product_id), Some(warehouse_id), Some(movement_type), Some(reason), Some(quantity), true) = (
            product_id,
            warehouse_id,
            req.movement_type,
            req.reason,
            req.quantity,
            errors.is_empty(),
        ) else {
            return Err(ApiError::Validation(errors));
        };

        let notes = req.notes.unwrap_or_default();
        let reference_document = req.reference_document.unwrap_or_default();

        let mut tx = self.db_pool.begin().await?;
        let (record_id, _) = ensure_record(&mut *tx, product_id, warehouse_id).await?;
        let balance = apply_delta(&mut *tx, record_id, movement_type.sign() * quantity).await?;

        let movement_id = insert_movement(
            &mut *tx,
            NewMovement {
                stock_record_id: record_id,
                movement_type,
                quantity,
                resulting_balance: balance,
                reason,
                account_id: account.id,
                notes: &notes,
                reference_document: &reference_document,
                unit_cost: req.unit_cost,
                from_warehouse_id: (movement_type == MovementType::Transfer).then_some(warehouse_id),
                to_warehouse_id,
            },
        )
        .await?;

        // La transferencia genera la entrada correspondiente en destino
        if let (MovementType::Transfer, Some(dest_id)) = (movement_type, to_warehouse_id) {
            let origin_name: String = sqlx::query_scalar("SELECT name FROM warehouses WHERE id = ?")
                .bind(warehouse_id)
                .fetch_one(&mut *tx)
                .await?;
            let (dest_record_id, _) = ensure_record(&mut *tx, product_id, dest_id).await?;
            let dest_balance = apply_delta(&mut *tx, dest_record_id, quantity).await?;
            let transfer_notes = format!("Transfer from {}", origin_name);

            insert_movement(
                &mut *tx,
                NewMovement {
                    stock_record_id: dest_record_id,
                    movement_type: MovementType::In,
                    quantity,
                    resulting_balance: dest_balance,
                    reason: MovementReason::Transfer,
                    account_id: account.id,
                    notes: &transfer_notes,
                    reference_document: &reference_document,
                    unit_cost: req.unit_cost,
                    from_warehouse_id: Some(warehouse_id),
                    to_warehouse_id: Some(dest_id),
                },
            )
            .await?;
        }

        tx.commit().await?;
        log::info!(
            "Movimiento {} {} x{} (producto {}, bodega {}) por cuenta {}",
            movement_id,
            movement_type,
            format_quantity(quantity),
            product_id,
            warehouse_id,
            account.id
        );

        self.get_movement(company_id, movement_id).await
    }

    /// POST /stock-movements/adjustment/ : fija el stock a `new_quantity`.
    pub async fn create_adjustment(
        &self,
        account: &Account,
        company_id: i64,
        req: AdjustmentRequest,
    ) -> ApiResult<StockMovement> {
        let mut errors = Vec::new();
        let product_id = self
            .check_owned("products", "product", "Product must belong to your company", req.product, company_id, &mut errors)
            .await?;
        let warehouse_id = self
            .check_owned("warehouses", "warehouse", "Warehouse must belong to your company", req.warehouse, company_id, &mut errors)
            .await?;

        match req.new_quantity {
            None => errors.push(FieldError::new("new_quantity", "This field is required.")),
            Some(q) if !q.is_finite() || q < 0.0 => errors.push(FieldError::new(
                "new_quantity",
                "Ensure this value is greater than or equal to 0.",
            )),
            Some(_) => {}
        }
        let notes = req.notes.as_deref().map(str::trim).unwrap_or("");
        if notes.is_empty() {
            errors.push(FieldError::new(
                "notes",
                if req.notes.is_none() {
                    "This field is required."
                } else {
                    "This field may not be blank."
                },
            ));
        }

        let (Some(product_id), Some(warehouse_id), Some(new_quantity), true) =
            (product_id, warehouse_id, req.new_quantity, errors.is_empty())
        else {
            return Err(ApiError::Validation(errors));
        };

        let mut tx = self.db_pool.begin().await?;
        let (record_id, current) = ensure_record(&mut *tx, product_id, warehouse_id).await?;
        let difference = new_quantity - current;
        if difference == 0.0 {
            return Err(ApiError::field(
                "new_quantity",
                "New quantity is the same as current quantity",
            ));
        }

        sqlx::query("UPDATE stock_records SET current_quantity = ?, updated_at = ? WHERE id = ?")
            .bind(new_quantity)
            .bind(now_timestamp())
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        let movement_type = if difference > 0.0 {
            MovementType::In
        } else {
            MovementType::Out
        };
        let adjustment_notes = format!(
            "Adjustment: {} (from {} to {})",
            notes,
            format_quantity(current),
            format_quantity(new_quantity)
        );
        let movement_id = insert_movement(
            &mut *tx,
            NewMovement {
                stock_record_id: record_id,
                movement_type,
                quantity: difference.abs(),
                resulting_balance: new_quantity,
                reason: MovementReason::Adjustment,
                account_id: account.id,
                notes: &adjustment_notes,
                reference_document: "",
                unit_cost: None,
                from_warehouse_id: None,
                to_warehouse_id: None,
            },
        )
        .await?;
        tx.commit().await?;

        log::info!(
            "Ajuste de stock {} (registro {}): {} -> {}",
            movement_id,
            record_id,
            current,
            new_quantity
        );
        self.get_movement(company_id, movement_id).await
    }

    /// GET /stock-movements/summary/
    pub async fn summary(&self, company_id: i64, range: &DateRangeQuery) -> ApiResult<MovementSummary> {
        let filters = MovementFilters {
            date_from: range.date_from.clone(),
            date_to: range.date_to.clone(),
            ..Default::default()
        };
        let date_from = filters
            .date_from
            .as_deref()
            .map(|raw| parse_date_bound("date_from", raw, false))
            .transpose()?;
        let date_to = filters
            .date_to
            .as_deref()
            .map(|raw| parse_date_bound("date_to", raw, true))
            .transpose()?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT m.movement_type, m.reason, COUNT(*), TOTAL(m.quantity) \
             FROM stock_movements m \
             JOIN stock_records sr ON sr.id = m.stock_record_id \
             JOIN products p ON p.id = sr.product_id",
        );
        push_movement_filters(&mut qb, company_id, &filters, &date_from, &date_to);
        qb.push(" GROUP BY m.movement_type, m.reason");
        let groups: Vec<(String, String, i64, f64)> =
            qb.build_query_as().fetch_all(&self.db_pool).await?;

        let mut summary = MovementSummary {
            total_movements: 0,
            by_type: MovementType::ALL.iter().map(|t| (*t, 0)).collect(),
            by_reason: MovementReason::ALL.iter().map(|r| (*r, 0)).collect::<BTreeMap<_, _>>(),
            total_in: 0.0,
            total_out: 0.0,
            total_transfers: 0,
        };

        for (movement_type, reason, count, quantity) in groups {
            let movement_type: MovementType = movement_type.parse().map_err(|e: String| anyhow!(e))?;
            let reason: MovementReason = reason.parse().map_err(|e: String| anyhow!(e))?;

            summary.total_movements += count;
            *summary.by_type.entry(movement_type).or_insert(0) += count;
            *summary.by_reason.entry(reason).or_insert(0) += count;
            match movement_type {
                MovementType::In => summary.total_in += quantity,
                MovementType::Out => summary.total_out += quantity,
                MovementType::Transfer => summary.total_transfers += count,
            }
        }

        Ok(summary)
    }

    /// Devuelve `Some(id)` si el recurso existe activo y es de la empresa; si no, anota el error.
    async fn check_owned(
        &self,
        table: &str,
        field: &str,
        foreign_message: &str,
        id: Option<i64>,
        company_id: i64,
        errors: &mut Vec<FieldError>,
    ) -> ApiResult<Option<i64>> {
        let Some(id) = id else {
            errors.push(FieldError::new(field, "This field is required."));
            return Ok(None);
        };

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

/// Obtiene (o crea en 0) el registro de stock de un producto en una bodega.
async fn ensure_record(
    conn: &mut SqliteConnection,
    product_id: i64,
    warehouse_id: i64,
) -> ApiResult<(i64, f64)> {
    let now = now_timestamp();
    sqlx::query(
        r#"
        INSERT INTO stock_records (product_id, warehouse_id, current_quantity, created_at, updated_at)
        VALUES (?, ?, 0, ?, ?)
        ON CONFLICT(product_id, warehouse_id) DO UPDATE SET is_active = 1
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    let record: (i64, f64) = sqlx::query_as(
        "SELECT id, current_quantity FROM stock_records WHERE product_id = ? AND warehouse_id = ?",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(record)
}

/// Suma `delta` al registro y devuelve el saldo resultante. Un delta negativo sólo se
/// aplica si hay stock suficiente.
async fn apply_delta(conn: &mut SqliteConnection, record_id: i64, delta: f64) -> ApiResult<f64> {
    let now = now_timestamp();
    let balance: Option<f64> = if delta >= 0.0 {
        sqlx::query_scalar(
            "UPDATE stock_records SET current_quantity = current_quantity + ?, updated_at = ? \
             WHERE id = ? RETURNING current_quantity",
        )
        .bind(delta)
        .bind(&now)
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await?
    } else {
        let amount = -delta;
        sqlx::query_scalar(
            "UPDATE stock_records SET current_quantity = current_quantity - ?, updated_at = ? \
             WHERE id = ? AND current_quantity >= ? RETURNING current_quantity",
        )
        .bind(amount)
        .bind(&now)
        .bind(record_id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await?
    };

    match balance {
        Some(balance) => Ok(balance),
        None => {
            let available: f64 =
                sqlx::query_scalar("SELECT current_quantity FROM stock_records WHERE id = ?")
                    .bind(record_id)
                    .fetch_one(&mut *conn)
                    .await?;
            Err(ApiError::field(
                "quantity",
                format!("Insufficient stock. Available: {}", format_quantity(available)),
            ))
        }
    }
}

async fn insert_movement(conn: &mut SqliteConnection, movement: NewMovement<'_>) -> ApiResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO stock_movements (
            stock_record_id, movement_type, quantity, resulting_balance, reason, account_id,
            notes, reference_document, unit_cost, from_warehouse_id, to_warehouse_id, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(movement.stock_record_id)
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.resulting_balance)
    .bind(movement.reason.as_str())
    .bind(movement.account_id)
    .bind(movement.notes)
    .bind(movement.reference_document)
    .bind(movement.unit_cost)
    .bind(movement.from_warehouse_id)
    .bind(movement.to_warehouse_id)
    .bind(now_timestamp())
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();
    Ok(id)
}

fn push_record_filters(qb: &mut QueryBuilder<'_, Sqlite>, company_id: i64, filters: &StockRecordFilters) {
    qb.push(" WHERE sr.is_active = 1 AND p.company_id = ");
    qb.push_bind(company_id);

    if let Some(product) = filters.product {
        qb.push(" AND sr.product_id = ");
        qb.push_bind(product);
    }
    if let Some(warehouse) = filters.warehouse {
        qb.push(" AND sr.warehouse_id = ");
        qb.push_bind(warehouse);
    }
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (p.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.sku LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR w.name LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }
    match filters.has_stock {
        Some(true) => {
            qb.push(" AND sr.current_quantity > 0");
        }
        Some(false) => {
            qb.push(" AND sr.current_quantity <= 0");
        }
        None => {}
    }
}

fn push_movement_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    company_id: i64,
    filters: &MovementFilters,
    date_from: &Option<String>,
    date_to: &Option<String>,
) {
    qb.push(" WHERE p.company_id = ");
    qb.push_bind(company_id);

    if let Some(movement_type) = filters.movement_type {
        qb.push(" AND m.movement_type = ");
        qb.push_bind(movement_type.as_str());
    }
    if let Some(reason) = filters.reason {
        qb.push(" AND m.reason = ");
        qb.push_bind(reason.as_str());
    }
    if let Some(product) = filters.product {
        qb.push(" AND sr.product_id = ");
        qb.push_bind(product);
    }
    if let Some(warehouse) = filters.warehouse {
        qb.push(" AND sr.warehouse_id = ");
        qb.push_bind(warehouse);
    }
    if let Some(from) = date_from {
        qb.push(" AND m.created_at >= ");
        qb.push_bind(from.clone());
    }
    if let Some(to) = date_to {
        qb.push(" AND m.created_at <= ");
        qb.push_bind(to.clone());
    }
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (p.name LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR p.sku LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR m.reference_document LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }
}
