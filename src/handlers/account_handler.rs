//! handlers/account_handler.rs
use actix_web::{web, HttpResponse};

use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::account_model::{
    CreateTeamMemberRequest, RegisterRequest, SetPasswordRequest, UpdateAccountRequest,
};
use crate::services::account_service::AccountService;

/// POST /api/v1/accounts/
pub async fn register_endpoint(
    account_service: web::Data<AccountService>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let account = account_service.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(account))
}

/// GET /api/v1/accounts/me/
pub async fn me_endpoint(account: AuthenticatedAccount) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(account.into_inner()))
}

/// PATCH /api/v1/accounts/me/
pub async fn update_me_endpoint(
    account_service: web::Data<AccountService>,
    account: AuthenticatedAccount,
    body: web::Json<UpdateAccountRequest>,
) -> ApiResult<HttpResponse> {
    let updated = account_service.update_me(&account, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// POST /api/v1/accounts/set_password/
pub async fn set_password_endpoint(
    account_service: web::Data<AccountService>,
    account: AuthenticatedAccount,
    body: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    account_service.set_password(&account, body.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/accounts/team/
pub async fn list_team_endpoint(
    account_service: web::Data<AccountService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let members = account_service.list_team(company_id).await?;
    Ok(HttpResponse::Ok().json(members))
}

/// POST /api/v1/accounts/team/
pub async fn create_team_member_endpoint(
    account_service: web::Data<AccountService>,
    account: AuthenticatedAccount,
    body: web::Json<CreateTeamMemberRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let member = account_service
        .create_team_member(company_id, body.into_inner())
        .await?;
    log::info!(
        "Cuenta {} agregada a empresa {} por {}",
        member.id,
        company_id,
        account.id
    );
    Ok(HttpResponse::Created().json(member))
}
