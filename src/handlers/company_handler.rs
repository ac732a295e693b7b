//! handlers/company_handler.rs
use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::services::company_service::CompanyService;

/// GET /api/v1/companies/
pub async fn list_companies_endpoint(
    company_service: web::Data<CompanyService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = company_service.list_companies(company_id, page).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/companies/{id}/
pub async fn get_company_endpoint(
    company_service: web::Data<CompanyService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let company = company_service
        .get_company(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(company))
}

/// GET /api/v1/companies/stats/
pub async fn company_stats_endpoint(
    company_service: web::Data<CompanyService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let stats = company_service.stats(company_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
