//! handlers/template_handler.rs
use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::models::product_model::ProductFilters;
use crate::models::template_model::{
    AddAttributeRequest, RemoveAttributeRequest, ReorderAttributesRequest, TemplateListQuery,
    TemplateRequest,
};
use crate::services::product_service::ProductService;
use crate::services::template_service::TemplateService;

/// GET /api/v1/templates/
pub async fn list_templates_endpoint(
    template_service: web::Data<TemplateService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    query: web::Query<TemplateListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = template_service
        .list_templates(company_id, &query, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/templates/{id}/
pub async fn get_template_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let template = template_service
        .retrieve_template(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(template))
}

/// POST /api/v1/templates/
pub async fn create_template_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    body: web::Json<TemplateRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let template = template_service
        .create_template(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(template))
}

/// PUT /api/v1/templates/{id}/
pub async fn replace_template_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<TemplateRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let template = template_service
        .update_template(company_id, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(template))
}

/// PATCH /api/v1/templates/{id}/
pub async fn patch_template_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<TemplateRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let template = template_service
        .update_template(company_id, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(template))
}

/// DELETE /api/v1/templates/{id}/
pub async fn delete_template_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    template_service
        .delete_template(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/templates/{id}/structure/
pub async fn structure_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let structure = template_service
        .structure(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(structure))
}

/// POST /api/v1/templates/{id}/add_attribute/
pub async fn add_attribute_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<AddAttributeRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let attribute = template_service
        .add_attribute(company_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(attribute))
}

/// DELETE /api/v1/templates/{id}/remove_attribute/
pub async fn remove_attribute_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<RemoveAttributeRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    template_service
        .remove_attribute(company_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /api/v1/templates/{id}/reorder_attributes/
pub async fn reorder_attributes_endpoint(
    template_service: web::Data<TemplateService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<ReorderAttributesRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let resp = template_service
        .reorder_attributes(company_id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// GET /api/v1/templates/{id}/products/
pub async fn template_products_endpoint(
    template_service: web::Data<TemplateService>,
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let template = template_service
        .get_template(company_id, path.into_inner())
        .await?;

    let filters = ProductFilters {
        template: Some(template.id),
        ..Default::default()
    };
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .list_products(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}
