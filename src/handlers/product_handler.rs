//! handlers/product_handler.rs
//! Endpoints de productos: CRUD, validación de especificaciones, stock, carga masiva.

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::ApiResult;
use crate::extractors::AuthenticatedAccount;
use crate::models::common_model::{PageRequest, PaginationQuery};
use crate::models::product_model::{
    DateRangeQuery, ProductFilters, ProductRequest, ValidateSpecificationsRequest,
};
use crate::services::product_service::ProductService;

/// GET /api/v1/products/
pub async fn list_products_endpoint(
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    filters: web::Query<ProductFilters>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .list_products(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/products/{id}/
pub async fn get_product_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let detail = product_service
        .retrieve_product(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/v1/products/
pub async fn create_product_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    body: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let product = product_service
        .create_product(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(product))
}

/// PUT /api/v1/products/{id}/
pub async fn replace_product_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let product = product_service
        .update_product(company_id, path.into_inner(), body.into_inner(), false)
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

/// PATCH /api/v1/products/{id}/
pub async fn patch_product_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    body: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let product = product_service
        .update_product(company_id, path.into_inner(), body.into_inner(), true)
        .await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /api/v1/products/{id}/
pub async fn delete_product_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    product_service
        .delete_product(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/products/validate-specifications/
/// Responde con su propio formato `{valid, errors}` en vez de problem+json.
pub async fn validate_specifications_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    body: web::Json<ValidateSpecificationsRequest>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    match product_service
        .validate_specifications_for(company_id, body.into_inner())
        .await?
    {
        Ok(validated) => Ok(HttpResponse::Ok().json(json!({
            "valid": true,
            "message": "Specifications are valid",
            "validated_specifications": validated,
        }))),
        Err(errors) => {
            let errors: BTreeMap<String, String> = errors
                .into_iter()
                .map(|e| (e.field, e.message))
                .collect();
            Ok(HttpResponse::BadRequest().json(json!({
                "valid": false,
                "errors": errors,
            })))
        }
    }
}

/// GET /api/v1/products/low-stock/
pub async fn low_stock_endpoint(
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let filters = ProductFilters {
        below_minimum: Some(true),
        ..Default::default()
    };
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .list_products(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/products/out-of-stock/
pub async fn out_of_stock_endpoint(
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let filters = ProductFilters {
        has_stock: Some(false),
        ..Default::default()
    };
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .list_products(company_id, &filters, page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/v1/products/{id}/stock-details/
pub async fn stock_details_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let details = product_service
        .stock_details(company_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(details))
}

/// GET /api/v1/products/{id}/movement-history/
pub async fn movement_history_endpoint(
    product_service: web::Data<ProductService>,
    config: web::Data<AppConfig>,
    account: AuthenticatedAccount,
    path: web::Path<i64>,
    range: web::Query<DateRangeQuery>,
    pagination: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let page = PageRequest::new(&pagination, &config);
    let list = product_service
        .movement_history(company_id, path.into_inner(), range.into_inner(), page)
        .await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/v1/products/bulk-create/
pub async fn bulk_create_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
    body: web::Json<Vec<ProductRequest>>,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_admin()?;
    let resp = product_service
        .bulk_create(company_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(resp))
}

/// GET /api/v1/products/export/
pub async fn export_endpoint(
    product_service: web::Data<ProductService>,
    account: AuthenticatedAccount,
) -> ApiResult<HttpResponse> {
    let company_id = account.require_company()?;
    let export = product_service.export(company_id).await?;
    Ok(HttpResponse::Ok().json(export))
}
