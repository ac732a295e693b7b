//! handlers/onboarding_handler.rs
//! Alta de empresa y seguimiento del onboarding.

use actix_web::{web, HttpResponse};

use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::company_model::SetupCompanyRequest;
use crate::services::company_service::CompanyService;

/// POST /api/v1/onboarding/setup-company/
pub async fn setup_company_endpoint(
    company_service: web::Data<CompanyService>,
    account: AuthenticatedAccount,
    body: web::Json<SetupCompanyRequest>,
) -> ApiResult<HttpResponse> {
    let resp = company_service
        .setup_company(&account, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(resp))
}

/// GET /api/v1/onboarding/progress/
pub async fn progress_endpoint(
    company_service: web::Data<CompanyService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let progress = company_service.onboarding_progress(&account).await?;
    Ok(HttpResponse::Ok().json(progress))
}

/// POST /api/v1/onboarding/complete/
pub async fn complete_endpoint(
    company_service: web::Data<CompanyService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let resp = company_service.complete_onboarding(&account).await?;
    Ok(HttpResponse::Ok().json(resp))
}
