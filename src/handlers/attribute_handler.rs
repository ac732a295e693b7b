//! handlers/attribute_handler.rs
//! Atributos globales (catálogo del sistema) y personalizados por empresa.

use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::attribute_model::{AttributeListQuery, AttributeRequest};
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::services::attribute_service::AttributeService;

// ---------------- Globales ----------------

/// GET /api/v1/global-attributes/
pub async fn list_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    config: web::Data<AppConfig>,
    _account: AuthenticatedAccount,
    query: web::Query<AttributeListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = PageRequest::new(&pagination, &config);
    let list = attribute_service.list_global(&query, page).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/global-attributes/{id}/
pub async fn get_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    _account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let attribute = attribute_service.get_global(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// POST /api/v1/global-attributes/
pub async fn create_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    account.require_staff()?;
    let attribute = attribute_service.create_global(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(attribute))
}

/// PUT /api/v1/global-attributes/{id}/
pub async fn replace_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    account.require_staff()?;
    let attribute = attribute_service
        .update_global(path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// PATCH /api/v1/global-attributes/{id}/
pub async fn patch_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    account.require_staff()?;
    let attribute = attribute_service
        .update_global(path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// DELETE /api/v1/global-attributes/{id}/
pub async fn delete_global_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    account.require_staff()?;
    attribute_service.delete_global(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ---------------- Personalizados ----------------

/// GET /api/v1/custom-attributes/
pub async fn list_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    query: web::Query<AttributeListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = attribute_service
        .list_custom(company_id, &query, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/custom-attributes/{id}/
pub async fn get_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let attribute = attribute_service
        .get_custom(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// POST /api/v1/custom-attributes/
pub async fn create_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let attribute = attribute_service
        .create_custom(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(attribute))
}

/// PUT /api/v1/custom-attributes/{id}/
pub async fn replace_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let attribute = attribute_service
        .update_custom(company_id, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// PATCH /api/v1/custom-attributes/{id}/
pub async fn patch_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<AttributeRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let attribute = attribute_service
        .update_custom(company_id, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(attribute))
}

/// DELETE /api/v1/custom-attributes/{id}/
pub async fn delete_custom_endpoint(
    attribute_service: web::Data<AttributeService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    attribute_service
        .delete_custom(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
