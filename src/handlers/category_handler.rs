//! handlers/category_handler.rs
use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::category_model::{CategoryListQuery, CategoryRequest};
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::models::product_model::ProductFilters;
use crate::services::category_service::CategoryService;
use crate::services::product_service::ProductService;

/// GET /api/v1/categories/
pub async fn list_categories_endpoint(
    category_service: web::Data<CategoryService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    query: web::Query<CategoryListQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = category_service
        .list_categories(company_id, &query, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/categories/{id}/
pub async fn get_category_endpoint(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let category = category_service
        .get_category(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

/// POST /api/v1/categories/
pub async fn create_category_endpoint(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    body: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let category = category_service
        .create_category(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(category))
}

/// PUT /api/v1/categories/{id}/
pub async fn replace_category_endpoint(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    update_category(category_service, account, path, body, false).await
}

/// PATCH /api/v1/categories/{id}/
pub async fn patch_category_endpoint(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    update_category(category_service, account, path, body, true).await
}

async fn update_category(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<CategoryRequest>,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let category = category_service
        .update_category(company_id, path.into_inner(), body.into_inner(), partial)
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

/// DELETE /api/v1/categories/{id}/
pub async fn delete_category_endpoint(
    category_service: web::Data<CategoryService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    category_service
        .delete_category(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/categories/{id}/products/
pub async fn category_products_endpoint(
    category_service: web::Data<CategoryService>,
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let category = category_service
        .get_category(company_id, path.into_inner())
        .await?;

    let filters = ProductFilters {
        category: Some(category.id),
        ..Default::default()
    };
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .list_products(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}
