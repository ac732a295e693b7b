//! handlers/warehouse_handler.rs
use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::models::warehouse_model::{WarehouseListQuery, WarehouseRequest};
use crate::services::warehouse_service::WarehouseService;

/// GET /api/v1/warehouses/
pub async fn list_warehouses_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    query: web::Query<WarehouseListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = warehouse_service
        .list_warehouses(company_id, &query, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/warehouses/{id}/
pub async fn get_warehouse_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let warehouse = warehouse_service
        .get_warehouse(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(warehouse))
}

/// POST /api/v1/warehouses/
pub async fn create_warehouse_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    body: web::Json<WarehouseRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let warehouse = warehouse_service
        .create_warehouse(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(warehouse))
}

/// PUT /api/v1/warehouses/{id}/
pub async fn replace_warehouse_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<WarehouseRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let warehouse = warehouse_service
        .update_warehouse(company_id, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(warehouse))
}

/// PATCH /api/v1/warehouses/{id}/
pub async fn patch_warehouse_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<WarehouseRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let warehouse = warehouse_service
        .update_warehouse(company_id, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(warehouse))
}

/// DELETE /api/v1/warehouses/{id}/
pub async fn delete_warehouse_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    warehouse_service
        .delete_warehouse(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/warehouses/{id}/inventory/
pub async fn inventory_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = warehouse_service
        .inventory(company_id, path.into_inner(), page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/warehouses/{id}/stats/
pub async fn warehouse_stats_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let stats = warehouse_service
        .stats(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/v1/warehouses/{id}/movements/
pub async fn warehouse_movements_endpoint(
    warehouse_service: web::Data<WarehouseService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = warehouse_service
        .movements(company_id, path.into_inner(), page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}
