//! handlers/report_handler.rs
//! Reportes de entrada/salida; lectura para cualquier miembro de la empresa.

use actix_web::{web, HttpResponse};

use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::product_model::DateRangeQuery;
use crate::models::report_model::TopProductsQuery;
use crate::services::report_service::ReportService;

/// GET /api/v1/reports/inventory_valuation/
pub async fn inventory_valuation_endpoint(
    report_service: web::Data<ReportService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let report = report_service.inventory_valuation(company_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/v1/reports/stock_alerts/
pub async fn stock_alerts_endpoint(
    report_service: web::Data<ReportService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let report = report_service.stock_alerts(company_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/v1/reports/movement_report/
pub async fn movement_report_endpoint(
    report_service: web::Data<ReportService>,
    account: AuthenticatedAccount,
    range: web::Query<DateRangeQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let report = report_service.movement_report(company_id, &range).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/v1/reports/category_analysis/
pub async fn category_analysis_endpoint(
    report_service: web::Data<ReportService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let report = report_service.category_analysis(company_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/v1/reports/top_products/
pub async fn top_products_endpoint(
    report_service: web::Data<ReportService>,
    account: AuthenticatedAccount,
    query: web::Query<TopProductsQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let report = report_service.top_products(company_id, &query).await?;
    Ok(HttpResponse::Ok().json(report))
}
