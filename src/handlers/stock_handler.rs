//! handlers/stock_handler.rs
//! Registros de stock (sólo lectura + conciliación) y movimientos.

use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::{ApiError, ApiResult};
use crate::extractors::AuthenticatedAccount;
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::models::product_model::DateRangeQuery;
use crate::models::stock_model::{
    AdjustmentRequest, CreateMovementRequest, MovementFilters, RecentQuery, StockRecordFilters,
};
use crate::services::stock_service::StockService;

/// GET /api/v1/stock-records/
pub async fn list_records_endpoint(
    stock_service: web::Data<StockService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    filters: web::Query<StockRecordFilters>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = stock_service
        .list_records(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/stock-records/{id}/
pub async fn get_record_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let record = stock_service
        .get_record(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// POST /api/v1/stock-records/{id}/reconcile/
pub async fn reconcile_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let resp = stock_service
        .reconcile(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// GET /api/v1/stock-movements/
pub async fn list_movements_endpoint(
    stock_service: web::Data<StockService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    filters: web::Query<MovementFilters>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = stock_service
        .list_movements(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/stock-movements/{id}/
pub async fn get_movement_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let movement = stock_service
        .get_movement(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(movement))
}

/// POST /api/v1/stock-movements/
pub async fn create_movement_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    body: web::Json<CreateMovementRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_stock_writer()?;
    let movement = stock_service
        .create_movement(&account, company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(movement))
}

/// POST /api/v1/stock-movements/adjustment/
pub async fn adjustment_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    body: web::Json<AdjustmentRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_stock_writer()?;
    let movement = stock_service
        .create_adjustment(&account, company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(movement))
}

/// GET /api/v1/stock-movements/summary/
pub async fn summary_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    range: web::Query<DateRangeQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let summary = stock_service.summary(company_id, &range).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// GET /api/v1/stock-movements/recent/
pub async fn recent_endpoint(
    stock_service: web::Data<StockService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    query: web::Query<RecentQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = stock_service.recent(company_id, query.hours, page).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// DELETE /api/v1/stock-movements/{id}/ : el historial es inmutable.
pub async fn delete_movement_endpoint(
    stock_service: web::Data<StockService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    stock_service
        .get_movement(company_id, path.into_inner())
        .await?;
    Err(ApiError::bad_request(
        "Stock movements cannot be deleted. Please create an adjustment if needed.",
    ))
}
